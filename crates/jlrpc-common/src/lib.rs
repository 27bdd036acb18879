//! jlrpc Common Types and Framing
//!
//! This crate provides the protocol object model and the line framing layer
//! for jlrpc, a JSON-RPC 2.0 library for persistent TCP connections.
//!
//! # Overview
//!
//! jlrpc speaks JSON-RPC 2.0 framed as JSON Lines: every message is one
//! compact JSON object followed by exactly one LF byte. Successive messages
//! on a connection are simply concatenated. This crate contains the pieces
//! shared by the server and the client:
//!
//! - **Protocol Layer**: validated `Request`/`Response` types, the error
//!   object model, batch-or-single unification, and the error taxonomy
//! - **Framing Layer**: a buffered line reader for non-blocking sockets and
//!   a resumable vectored write queue
//!
//! # Wire Format
//!
//! ```text
//! {"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}\n
//! {"jsonrpc":"2.0","result":19,"id":1}\n
//! ```
//!
//! A batch is two or more LF-delimited objects, not a JSON array. This is a
//! deliberate departure from the JSON-RPC 2.0 batch format: it keeps framing
//! uniform and allows streaming parsing. Interoperating with
//! standards-conformant batch clients requires a shim at the boundary.
//!
//! # Example
//!
//! ```
//! use jlrpc_common::{Request, RequestId, Response};
//! use serde_json::json;
//!
//! let request = Request::new("subtract", Some(RequestId::Number(1)))
//!     .unwrap()
//!     .with_positional_params(vec![json!(42), json!(23)]);
//!
//! let line = request.to_line().unwrap();
//! let parsed = Request::from_line(&line).unwrap();
//! assert_eq!(request, parsed);
//!
//! let response = Response::success(json!(19), RequestId::Number(1));
//! assert!(response.is_success());
//! ```

pub mod framing;
pub mod protocol;

pub use framing::{LineReader, WriteQueue, DEFAULT_READ_BUFFER_SIZE};
pub use protocol::{
    BatchOrSingle, ErrorCode, ErrorPayload, FramedMessage, JlrpcError, Params, Request, RequestId,
    Response, Result, Version,
};
