//! The application handler seam.

use jlrpc_common::{BatchOrSingle, Request, Response, Result};

/// Identifies one connected client for the lifetime of its connection.
///
/// Slot indices are reused after disconnect, so a `ClientId` is only
/// meaningful while the connection it was handed out with is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub(crate) usize);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Application callback invoked by the reactor.
///
/// One invocation receives every request drained from a single readiness
/// event, in wire order. The contract:
///
/// - Return `Ok(None)` when no response is owed (all inputs were
///   notifications).
/// - Return `Ok(Some(responses))` to send one frame per element, written in
///   the order given.
/// - Return `Err(_)` to tear down this connection; the reactor and its
///   other clients are unaffected.
///
/// The handler runs synchronously on the event loop: while it executes no
/// other client is served, so it is expected to be bounded.
pub trait Handler {
    fn handle(
        &mut self,
        client: ClientId,
        requests: BatchOrSingle<Request>,
    ) -> Result<Option<Vec<Response>>>;
}

impl<F> Handler for F
where
    F: FnMut(ClientId, BatchOrSingle<Request>) -> Result<Option<Vec<Response>>>,
{
    fn handle(
        &mut self,
        client: ClientId,
        requests: BatchOrSingle<Request>,
    ) -> Result<Option<Vec<Response>>> {
        self(client, requests)
    }
}
