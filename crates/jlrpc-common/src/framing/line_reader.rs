//! Buffered extraction of LF-delimited frames from a byte stream.

use std::io::{ErrorKind, Read};

use crate::protocol::error::{JlrpcError, Result};

/// Default capacity of the read buffer, in bytes.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// The frames carved out of the buffer by one drain pass.
///
/// Holds `(start, end)` byte ranges into the reader's buffer; resolve them
/// with [`LineReader::frame`] or [`LineReader::frames`]. Ranges stay valid
/// until the next mutating call on the reader.
#[derive(Debug)]
pub struct Drained {
    ranges: Vec<(usize, usize)>,
    received: usize,
    closed: bool,
}

impl Drained {
    /// Number of complete frames carved.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// True when the peer closed the stream during this pass. Frames carved
    /// before the close are still delivered.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Bytes received from the stream during this pass. Non-zero means the
    /// peer made progress even if no line completed yet.
    pub fn received(&self) -> usize {
        self.received
    }

    /// The carved ranges, in arrival order.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }
}

/// A fixed-capacity line buffer over a byte stream.
///
/// Two cursors track state: `start` is the beginning of the next unparsed
/// line, `pos` the end of valid bytes, with `0 <= start <= pos <= capacity`
/// at all times. Bytes are never dropped across calls: a partial line left
/// by one pass is completed by the next.
///
/// The reader is transport-agnostic; it only needs `Read`. On a
/// non-blocking socket, would-block is reported as "no frame yet" (single
/// mode) or ends the pass (drain mode). `EINTR` is retried internally.
#[derive(Debug)]
pub struct LineReader {
    buf: Box<[u8]>,
    start: usize,
    pos: usize,
}

impl LineReader {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_READ_BUFFER_SIZE)
    }

    /// A reader with the given buffer capacity. The capacity bounds the
    /// longest acceptable line: a frame that cannot fit fails with
    /// [`JlrpcError::LineTooLong`].
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "line buffer capacity must be non-zero");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes buffered but not yet carved into frames.
    pub fn pending(&self) -> usize {
        self.pos - self.start
    }

    /// Single mode: deliver exactly one complete frame.
    ///
    /// Returns `Ok(Some(frame))` (without the LF) when a complete line is
    /// available, `Ok(None)` when the underlying read would block before one
    /// arrived, and `Err(Closed)` on end of stream.
    pub fn read_frame<'a, R: Read>(&'a mut self, io: &mut R) -> Result<Option<&'a [u8]>> {
        let carved = loop {
            if let Some(newline) = self.find_newline() {
                let start = self.start;
                self.start = newline + 1;
                break Some((start, newline));
            }
            self.make_room()?;
            match io.read(&mut self.buf[self.pos..]) {
                Ok(0) => return Err(JlrpcError::Closed),
                Ok(n) => self.pos += n,
                Err(e) if would_block(&e) => break None,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
            debug_assert!(self.start <= self.pos && self.pos <= self.buf.len());
        };
        Ok(carved.map(|(start, end)| &self.buf[start..end]))
    }

    /// Drain mode: carve every complete frame available before the next
    /// read would block or the stream ends.
    ///
    /// Frames already carved pin the front of the buffer, so once the
    /// buffer fills mid-pass the accumulated frames are delivered and the
    /// rest of the stream waits for the next readiness event (the socket
    /// stays readable, so nothing is lost). Only a line longer than the
    /// whole buffer is an error.
    pub fn drain_frames<R: Read>(&mut self, io: &mut R) -> Result<Drained> {
        if self.start == self.pos {
            // Nothing pending from the previous pass: reclaim everything.
            self.start = 0;
            self.pos = 0;
        }
        let mut ranges = Vec::new();
        let mut received = 0;
        let mut closed = false;
        loop {
            while let Some(newline) = self.find_newline() {
                ranges.push((self.start, newline));
                self.start = newline + 1;
            }
            if self.pos == self.buf.len() && !ranges.is_empty() {
                break;
            }
            if ranges.is_empty() {
                self.make_room()?;
            }
            match io.read(&mut self.buf[self.pos..]) {
                Ok(0) => {
                    closed = true;
                    break;
                }
                Ok(n) => {
                    self.pos += n;
                    received += n;
                }
                Err(e) if would_block(&e) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
            debug_assert!(self.start <= self.pos && self.pos <= self.buf.len());
        }
        Ok(Drained {
            ranges,
            received,
            closed,
        })
    }

    /// Resolves one carved range to its bytes.
    pub fn frame(&self, range: (usize, usize)) -> &[u8] {
        &self.buf[range.0..range.1]
    }

    /// Iterates the frames of a drain pass, in arrival order.
    pub fn frames<'a>(&'a self, drained: &'a Drained) -> impl Iterator<Item = &'a [u8]> {
        drained.ranges.iter().map(move |&(s, e)| &self.buf[s..e])
    }

    fn find_newline(&self) -> Option<usize> {
        self.buf[self.start..self.pos]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| self.start + i)
    }

    /// Makes space for the next receive: compacts the partial line to the
    /// buffer front once the dead prefix crosses half the capacity (or the
    /// buffer is full), and fails when a line cannot fit at all.
    fn make_room(&mut self) -> Result<()> {
        if self.pos == self.buf.len() {
            if self.start == 0 {
                return Err(JlrpcError::LineTooLong(self.buf.len()));
            }
            self.compact();
        } else if self.start > self.buf.len() / 2 {
            self.compact();
        }
        Ok(())
    }

    fn compact(&mut self) {
        self.buf.copy_within(self.start..self.pos, 0);
        self.pos -= self.start;
        self.start = 0;
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Sockets report "try again later" as `WouldBlock`, or as `TimedOut` when
/// a receive timeout is configured; both mean no frame yet, not an error.
fn would_block(error: &std::io::Error) -> bool {
    matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
