//! Resumable vectored writes of pre-serialized frames.

use std::collections::VecDeque;
use std::io::{ErrorKind, IoSlice, Write};

use crate::protocol::error::{JlrpcError, Result};

/// A queue of outgoing frames flushed with vectored writes.
///
/// Frames are pushed fully serialized (LF terminator included). Each
/// [`flush`](WriteQueue::flush) attempt hands the kernel everything pending
/// in one `writev`; partial writes advance an offset into the front frame so
/// the next attempt resumes exactly where the kernel stopped. Would-block
/// leaves the queue intact and reports "pending" so the caller can request
/// write-readiness and retry later.
#[derive(Debug, Default)]
pub struct WriteQueue {
    frames: VecDeque<Vec<u8>>,
    offset: usize,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues one serialized frame.
    pub fn push(&mut self, frame: Vec<u8>) {
        if !frame.is_empty() {
            self.frames.push_back(frame);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bytes still owed to the stream.
    pub fn pending_bytes(&self) -> usize {
        self.frames.iter().map(Vec::len).sum::<usize>() - self.offset
    }

    /// Attempts to drain the queue.
    ///
    /// Returns `Ok(true)` when every pending byte reached the stream and
    /// `Ok(false)` when the stream would block with bytes still owed.
    /// `EINTR` is retried internally.
    pub fn flush<W: Write>(&mut self, io: &mut W) -> Result<bool> {
        while !self.frames.is_empty() {
            let written = {
                let mut slices: Vec<IoSlice<'_>> = Vec::with_capacity(self.frames.len());
                let mut frames = self.frames.iter();
                let front = frames.next().expect("queue is non-empty");
                slices.push(IoSlice::new(&front[self.offset..]));
                slices.extend(frames.map(|frame| IoSlice::new(frame)));
                match io.write_vectored(&slices) {
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(false),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            if written == 0 {
                return Err(JlrpcError::Connection(
                    "stream accepted zero bytes".to_string(),
                ));
            }
            self.advance(written);
        }
        Ok(true)
    }

    /// Consumes `n` written bytes: whole frames are retired from the front,
    /// a partially written frame keeps its resume offset.
    fn advance(&mut self, mut n: usize) {
        while n > 0 {
            let remaining = self
                .frames
                .front()
                .map(|frame| frame.len() - self.offset)
                .expect("advanced past the queued bytes");
            if n >= remaining {
                self.frames.pop_front();
                self.offset = 0;
                n -= remaining;
            } else {
                self.offset += n;
                return;
            }
        }
    }
}
