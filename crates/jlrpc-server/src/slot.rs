//! Pre-allocated client slots.

use std::net::{SocketAddr, TcpStream};

use jlrpc_common::{LineReader, WriteQueue};

use crate::timer::{TimerLink, TimerSlots};

/// Readiness events the reactor currently wants for a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interest {
    Read,
    Write,
}

/// Per-connection state: the socket, its framing buffers, the interest
/// mask, and the embedded timeout-list node.
pub(crate) struct ClientSlot {
    pub(crate) stream: TcpStream,
    pub(crate) reader: LineReader,
    pub(crate) writer: WriteQueue,
    pub(crate) interest: Interest,
    pub(crate) timer: TimerLink,
    pub(crate) peer: SocketAddr,
}

/// Fixed-capacity table of client slots with O(1) claim and release.
///
/// The table is sized once from `max_clients` and never grows; releasing a
/// slot pushes its index on a free list for reuse, so steady-state accepts
/// do not allocate table storage.
pub(crate) struct SlotTable {
    slots: Vec<Option<ClientSlot>>,
    free: Vec<usize>,
}

impl SlotTable {
    pub(crate) fn with_capacity(max_clients: usize) -> Self {
        assert!(max_clients > 0, "server needs at least one client slot");
        Self {
            slots: (0..max_clients).map(|_| None).collect(),
            free: (0..max_clients).rev().collect(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Claims a free slot for `client`, returning its index.
    pub(crate) fn claim(&mut self, client: ClientSlot) -> Option<usize> {
        let index = self.free.pop()?;
        debug_assert!(self.slots[index].is_none());
        self.slots[index] = Some(client);
        Some(index)
    }

    /// Releases `index`, handing back whatever occupied it.
    pub(crate) fn release(&mut self, index: usize) -> Option<ClientSlot> {
        let client = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(client)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ClientSlot> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Iterates live slots in index order.
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (usize, &ClientSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|client| (index, client)))
    }
}

impl TimerSlots for SlotTable {
    fn link(&self, index: usize) -> &TimerLink {
        &self.slots[index].as_ref().expect("linked slot is live").timer
    }

    fn link_mut(&mut self, index: usize) -> &mut TimerLink {
        &mut self.slots[index].as_mut().expect("linked slot is live").timer
    }
}
