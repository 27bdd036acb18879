//! Idle-timeout FIFO.
//!
//! Read deadlines live in an intrusive doubly-linked list threaded through
//! the slot table: each client slot embeds a [`TimerLink`] node and the
//! queue stores only slot indices, so list surgery is O(1) and no ownership
//! cycle exists between the list and the clients. Every read that makes
//! progress re-arms the deadline and moves the client to the tail, which
//! keeps the list ordered: `head.deadline <= tail.deadline` always holds
//! because all deadlines use the same timeout added to a monotonic now.

use std::time::Instant;

/// Intrusive list node embedded in every client slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimerLink {
    pub(crate) deadline: Instant,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl TimerLink {
    pub(crate) fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            prev: None,
            next: None,
            linked: false,
        }
    }
}

/// Access seam between the queue and whatever owns the nodes: the reactor's
/// slot table in production, a plain vector in tests.
pub(crate) trait TimerSlots {
    fn link(&self, index: usize) -> &TimerLink;
    fn link_mut(&mut self, index: usize) -> &mut TimerLink;
}

impl TimerSlots for Vec<TimerLink> {
    fn link(&self, index: usize) -> &TimerLink {
        &self[index]
    }

    fn link_mut(&mut self, index: usize) -> &mut TimerLink {
        &mut self[index]
    }
}

/// FIFO of read deadlines in insertion/refresh order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    head: Option<usize>,
    tail: Option<usize>,
}

impl TimerQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends `index` with the given deadline. The node must be unlinked.
    pub(crate) fn push_tail(
        &mut self,
        slots: &mut impl TimerSlots,
        index: usize,
        deadline: Instant,
    ) {
        let tail = self.tail;
        {
            let link = slots.link_mut(index);
            debug_assert!(!link.linked);
            link.deadline = deadline;
            link.prev = tail;
            link.next = None;
            link.linked = true;
        }
        match tail {
            Some(prev) => slots.link_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    /// Removes `index` from the list; a no-op when it is not linked.
    pub(crate) fn unlink(&mut self, slots: &mut impl TimerSlots, index: usize) {
        let (prev, next, linked) = {
            let link = slots.link_mut(index);
            let state = (link.prev, link.next, link.linked);
            link.prev = None;
            link.next = None;
            link.linked = false;
            state
        };
        if !linked {
            return;
        }
        match prev {
            Some(prev) => slots.link_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => slots.link_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Re-arms `index` and moves it to the tail.
    pub(crate) fn refresh(
        &mut self,
        slots: &mut impl TimerSlots,
        index: usize,
        deadline: Instant,
    ) {
        self.unlink(slots, index);
        self.push_tail(slots, index, deadline);
    }

    /// Deadline of the oldest entry, bounding the poll timeout.
    pub(crate) fn head_deadline(&self, slots: &impl TimerSlots) -> Option<Instant> {
        self.head.map(|index| slots.link(index).deadline)
    }

    /// Unlinks and returns every entry whose deadline has passed, oldest
    /// first.
    pub(crate) fn pop_expired(
        &mut self,
        slots: &mut impl TimerSlots,
        now: Instant,
    ) -> Vec<usize> {
        let mut expired = Vec::new();
        while let Some(head) = self.head {
            if slots.link(head).deadline > now {
                break;
            }
            self.unlink(slots, head);
            expired.push(head);
        }
        expired
    }
}
