//! jlrpc Server
//!
//! A single-threaded, readiness-driven JSON-RPC 2.0 server for JSON Lines
//! over TCP. One `poll(2)` loop multiplexes the listening socket and up to
//! `max_clients` connections; no user code ever runs in parallel.
//!
//! # Scheduling Model
//!
//! The reactor is strictly cooperative. Each connected client carries an
//! interest mask (readable or writable), a line buffer, and a write queue.
//! Incoming frames are drained per readiness event, parsed, and handed to
//! the application [`Handler`] in one invocation; the responses it returns
//! are written back with a single vectored write, falling back to
//! write-readiness notifications when the peer's socket buffer fills. A
//! slow peer therefore stops being read (backpressure) but never blocks the
//! loop; a slow handler serializes all clients.
//!
//! Idle connections are tracked in a FIFO of read deadlines: every read
//! that makes progress moves the client to the tail, the head bounds the
//! poll timeout, and expired clients get their receive side shut down so
//! the next read observes end-of-stream and the slot is reclaimed.
//!
//! # Example
//!
//! ```no_run
//! use jlrpc_common::{BatchOrSingle, Request, Response, Result};
//! use jlrpc_server::{ClientId, Server, ServerConfig};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let config = ServerConfig::new("127.0.0.1:7700".parse().unwrap());
//!     let mut server = Server::bind(config)?;
//!     server.run(|_client: ClientId, requests: BatchOrSingle<Request>| {
//!         let responses: Vec<Response> = requests
//!             .iter()
//!             .filter_map(|req| {
//!                 let id = req.id.clone()?;
//!                 Some(Response::success(json!(req.method), id))
//!             })
//!             .collect();
//!         Ok(if responses.is_empty() { None } else { Some(responses) })
//!     })
//! }
//! ```

pub mod config;
pub mod handler;

mod reactor;
mod slot;
mod timer;

pub use config::ServerConfig;
pub use handler::{ClientId, Handler};
pub use reactor::Server;
