//! The readiness-driven event loop.

use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use jlrpc_common::{
    BatchOrSingle, ErrorPayload, JlrpcError, LineReader, Request, RequestId, Response, Result,
    WriteQueue,
};

use crate::config::ServerConfig;
use crate::handler::{ClientId, Handler};
use crate::slot::{ClientSlot, Interest, SlotTable};
use crate::timer::{TimerLink, TimerQueue};

/// A single-threaded JSON Lines RPC server.
///
/// One `poll(2)` array carries the listening socket plus every live client,
/// each with exactly one descriptor and one interest mask. The loop never
/// blocks on any socket: all of them are non-blocking and the poll timeout
/// is bounded by the oldest read deadline.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    slots: SlotTable,
    timers: TimerQueue,
}

impl Server {
    /// Binds the listening socket and pre-allocates the client slot pool.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).map_err(|e| {
            JlrpcError::Connection(format!("failed to bind {}: {e}", config.bind_addr))
        })?;
        listener.set_nonblocking(true)?;
        let slots = SlotTable::with_capacity(config.max_clients);
        info!(
            addr = %listener.local_addr()?,
            max_clients = config.max_clients,
            "server listening"
        );
        Ok(Self {
            listener,
            config,
            slots,
            timers: TimerQueue::default(),
        })
    }

    /// The actual bound address; useful after binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of currently connected clients.
    pub fn client_count(&self) -> usize {
        self.slots.live()
    }

    /// Runs the event loop.
    ///
    /// Per-connection protocol and I/O failures are logged and tear down
    /// only the affected connection; the loop itself only ends on a
    /// listener-level error.
    pub fn run<H: Handler>(&mut self, mut handler: H) -> Result<()> {
        loop {
            self.turn(&mut handler)?;
        }
    }

    /// One iteration: readiness wait, event dispatch, idle-timeout sweep.
    fn turn<H: Handler>(&mut self, handler: &mut H) -> Result<()> {
        let mut fds: Vec<libc::pollfd> = Vec::with_capacity(self.slots.live() + 1);
        let mut owners: Vec<Option<usize>> = Vec::with_capacity(self.slots.live() + 1);

        // The listener is deselected while the slot table is full and comes
        // back automatically once a slot frees.
        if !self.slots.is_full() {
            fds.push(libc::pollfd {
                fd: self.listener.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            });
            owners.push(None);
        }
        for (index, slot) in self.slots.iter_live() {
            let events = match slot.interest {
                Interest::Read => libc::POLLIN,
                Interest::Write => libc::POLLOUT,
            };
            fds.push(libc::pollfd {
                fd: slot.stream.as_raw_fd(),
                events,
                revents: 0,
            });
            owners.push(Some(index));
        }

        let timeout = self.poll_timeout();
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err.into());
        }

        if ready > 0 {
            for (fd, owner) in fds.iter().zip(&owners) {
                if fd.revents == 0 {
                    continue;
                }
                match owner {
                    None => self.accept_ready(),
                    Some(index) => self.client_ready(*index, fd.revents, handler),
                }
            }
        }

        self.expire_idle(Instant::now());
        Ok(())
    }

    /// Milliseconds until the oldest read deadline, rounded up so a wakeup
    /// never lands just before it; -1 (wait forever) with no clients.
    fn poll_timeout(&self) -> libc::c_int {
        match self.timers.head_deadline(&self.slots) {
            None => -1,
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let mut millis = remaining.as_millis();
                if remaining > Duration::from_millis(millis as u64) {
                    millis += 1;
                }
                millis.min(libc::c_int::MAX as u128) as libc::c_int
            }
        }
    }

    /// Drains the accept queue while slot space remains.
    fn accept_ready(&mut self) {
        while !self.slots.is_full() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.register(stream, peer) {
                        warn!(%peer, error = %e, "failed to register client");
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    fn register(&mut self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        stream.set_nonblocking(true)?;
        let deadline = Instant::now() + self.config.read_timeout;
        let client = ClientSlot {
            stream,
            reader: LineReader::with_capacity(self.config.read_buffer_size),
            writer: WriteQueue::new(),
            interest: Interest::Read,
            timer: TimerLink::new(deadline),
            peer,
        };
        let index = self
            .slots
            .claim(client)
            .ok_or(JlrpcError::SlotTableFull(self.slots.capacity()))?;
        self.timers.push_tail(&mut self.slots, index, deadline);
        debug!(client = index, %peer, "client connected");
        Ok(())
    }

    fn client_ready<H: Handler>(&mut self, index: usize, revents: libc::c_short, handler: &mut H) {
        if revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            self.close_client(index, "socket error");
            return;
        }
        // POLLHUP may accompany POLLIN with data still queued; the read
        // path observes the EOF itself.
        let interest = match self.slots.get_mut(index) {
            Some(slot) => slot.interest,
            None => return,
        };
        let result = match interest {
            Interest::Read => self.read_ready(index, handler),
            Interest::Write => self.write_ready(index),
        };
        match result {
            Ok(()) => {}
            Err(JlrpcError::Closed) => self.close_client(index, "peer closed"),
            Err(e) => {
                warn!(client = index, error = %e, "connection failed");
                self.close_client(index, "error");
            }
        }
    }

    /// Handles read readiness: drain frames, parse, invoke the handler,
    /// queue and flush the responses.
    fn read_ready<H: Handler>(&mut self, index: usize, handler: &mut H) -> Result<()> {
        let (parsed, received, closed) = {
            let slot = self.slots.get_mut(index).ok_or(JlrpcError::Closed)?;
            let drained = {
                let ClientSlot { reader, stream, .. } = &mut *slot;
                reader.drain_frames(stream)?
            };
            let mut parsed: Vec<std::result::Result<Request, Response>> =
                Vec::with_capacity(drained.len());
            for frame in slot.reader.frames(&drained) {
                match Request::from_line(frame) {
                    Ok(request) => parsed.push(Ok(request)),
                    Err(e) => {
                        debug!(client = index, error = %e, "rejected inbound frame");
                        parsed.push(Err(reject_frame(&e, frame)));
                    }
                }
            }
            (parsed, drained.received(), drained.closed())
        };

        // Rejections for unparseable frames go out first (in arrival
        // order), then whatever the handler returns, all in one flush.
        let mut outgoing: Vec<Response> = Vec::new();
        let mut requests: Vec<Request> = Vec::new();
        for entry in parsed {
            match entry {
                Ok(request) => requests.push(request),
                Err(rejection) => outgoing.push(rejection),
            }
        }

        if !requests.is_empty() {
            let batch = BatchOrSingle::from_vec(requests)?;
            match handler.handle(ClientId(index), batch) {
                Ok(Some(responses)) => outgoing.extend(responses),
                Ok(None) => {}
                Err(e) => {
                    warn!(client = index, error = %e, "handler failed");
                    return Err(e);
                }
            }
        }

        if !outgoing.is_empty() {
            let slot = self.slots.get_mut(index).ok_or(JlrpcError::Closed)?;
            for response in &outgoing {
                slot.writer.push(response.to_line()?);
            }
        }

        if closed {
            // EOF removes the client; flush whatever the kernel will take.
            let _ = self.flush_client(index);
            return Err(JlrpcError::Closed);
        }

        self.flush_client(index)?;
        if received > 0 {
            let deadline = Instant::now() + self.config.read_timeout;
            self.timers.refresh(&mut self.slots, index, deadline);
        }
        Ok(())
    }

    fn write_ready(&mut self, index: usize) -> Result<()> {
        self.flush_client(index)?;
        Ok(())
    }

    /// Flushes the client's write queue and flips the interest mask:
    /// READ when drained, WRITE while bytes remain.
    fn flush_client(&mut self, index: usize) -> Result<bool> {
        let slot = self.slots.get_mut(index).ok_or(JlrpcError::Closed)?;
        let drained = {
            let ClientSlot { writer, stream, .. } = &mut *slot;
            writer.flush(stream)?
        };
        slot.interest = if drained {
            Interest::Read
        } else {
            Interest::Write
        };
        Ok(drained)
    }

    /// Half-closes every client whose read deadline has passed. The
    /// subsequent read observes end-of-stream, which reclaims the slot,
    /// while pending writes may still drain.
    fn expire_idle(&mut self, now: Instant) {
        for index in self.timers.pop_expired(&mut self.slots, now) {
            if let Some(slot) = self.slots.get_mut(index) {
                debug!(client = index, peer = %slot.peer, "idle timeout");
                let _ = slot.stream.shutdown(Shutdown::Read);
            }
        }
    }

    fn close_client(&mut self, index: usize, reason: &str) {
        self.timers.unlink(&mut self.slots, index);
        if let Some(slot) = self.slots.release(index) {
            debug!(client = index, peer = %slot.peer, reason, "client disconnected");
        }
    }
}

/// Builds the error response owed for a frame that failed to parse,
/// salvaging the request id when the broken document still carries a
/// well-typed one.
fn reject_frame(error: &JlrpcError, frame: &[u8]) -> Response {
    let payload = match error {
        JlrpcError::Syntax(_) => ErrorPayload::parse_error(),
        JlrpcError::InvalidParams(_) => ErrorPayload::invalid_params("Invalid params"),
        _ => ErrorPayload::invalid_request(),
    };
    Response::failure(payload, salvage_id(frame))
}

fn salvage_id(frame: &[u8]) -> RequestId {
    serde_json::from_slice::<serde_json::Value>(frame)
        .ok()
        .and_then(|root| {
            root.get("id")
                .and_then(|id| RequestId::from_value(id).ok())
        })
        .unwrap_or(RequestId::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salvage_id_recovers_typed_ids() {
        assert_eq!(
            salvage_id(br#"{"jsonrpc":"1.0","method":"x","id":1}"#),
            RequestId::Number(1)
        );
        assert_eq!(
            salvage_id(br#"{"jsonrpc":"1.0","method":"x","id":"a"}"#),
            RequestId::String("a".into())
        );
    }

    #[test]
    fn test_salvage_id_falls_back_to_null() {
        assert_eq!(salvage_id(b"not json"), RequestId::Null);
        assert_eq!(salvage_id(br#"{"method":"x"}"#), RequestId::Null);
        assert_eq!(
            salvage_id(br#"{"method":"x","id":1.5}"#),
            RequestId::Null
        );
        assert_eq!(salvage_id(b"[1,2]"), RequestId::Null);
    }

    #[test]
    fn test_reject_frame_maps_error_kinds() {
        let syntax = Request::from_line(b"{oops").unwrap_err();
        let response = reject_frame(&syntax, b"{oops");
        assert_eq!(response.error().unwrap().code.value(), -32700);
        assert_eq!(response.id(), &RequestId::Null);

        let bad_version =
            Request::from_line(br#"{"jsonrpc":"1.0","method":"x","id":1}"#).unwrap_err();
        let response = reject_frame(&bad_version, br#"{"jsonrpc":"1.0","method":"x","id":1}"#);
        assert_eq!(response.error().unwrap().code.value(), -32600);
        assert_eq!(response.id(), &RequestId::Number(1));

        let bad_params =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","params":1,"id":2}"#)
                .unwrap_err();
        let response =
            reject_frame(&bad_params, br#"{"jsonrpc":"2.0","method":"x","params":1,"id":2}"#);
        assert_eq!(response.error().unwrap().code.value(), -32602);
        assert_eq!(response.id(), &RequestId::Number(2));
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.client_count(), 0);
    }
}
