//! jlrpc Client
//!
//! A blocking JSON-RPC 2.0 client for JSON Lines over TCP. One
//! [`RpcClient`] owns one connection and composes the shared line framing
//! with the protocol object model:
//!
//! - [`RpcClient::call`] writes a single request or a batch and reads one
//!   response frame per request that carries an id
//! - [`RpcClient::notify`] / [`RpcClient::notify_all`] write and never read
//!
//! Errors surface verbatim: I/O failures, protocol violations, timeouts,
//! and unexpected closes are returned to the caller without retries.
//!
//! # Example
//!
//! ```no_run
//! use jlrpc_client::RpcClient;
//! use jlrpc_common::{BatchOrSingle, Request, RequestId, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mut client = RpcClient::connect("127.0.0.1:7700")?;
//!
//!     let request = Request::new("subtract", Some(RequestId::Number(1)))?
//!         .with_positional_params(vec![json!(42), json!(23)]);
//!     let response = client.call_one(request)?;
//!     assert_eq!(response.result(), Some(&json!(19)));
//!
//!     client.notify(&Request::notification("heartbeat")?)?;
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{ClientConfig, RpcClient};
