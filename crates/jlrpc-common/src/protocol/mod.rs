//! jlrpc Protocol Definitions
//!
//! This module implements the JSON-RPC 2.0 object model for jlrpc.
//!
//! # JSON-RPC 2.0 Compliance
//!
//! - JSON-RPC version: `"2.0"` (the only accepted value)
//! - Request format: `{"jsonrpc": "2.0", "method": "...", "params": ..., "id": ...}`
//! - Response format: `{"jsonrpc": "2.0", "result": ..., "id": ...}` or
//!   `{"jsonrpc": "2.0", "error": {...}, "id": ...}`
//! - Error format: `{"code": ..., "message": "...", "data": ...}`
//!
//! A request without an `id` member is a notification and gets no response.
//! A request whose `id` is the literal JSON `null` is *not* a notification;
//! the two shapes are distinguished throughout.
//!
//! # Error Codes
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000` to `-32099`: Server error
//!
//! Remaining codes down to `-32768` are reserved and fail to decode; codes
//! outside the reserved range entirely are invalid.
//!
//! # Example
//!
//! ```
//! use jlrpc_common::protocol::{ErrorPayload, Request, RequestId, Response};
//! use serde_json::json;
//!
//! let request = Request::new("compute", Some(RequestId::Number(7))).unwrap();
//! let ok = Response::success(json!({"result": 42}), RequestId::Number(7));
//! let err = Response::failure(ErrorPayload::method_not_found(), RequestId::Number(7));
//! assert!(ok.is_success());
//! assert!(!err.is_success());
//! ```

pub mod batch;
pub mod error;
pub mod request;
pub mod response;

#[cfg(test)]
mod tests;

pub use batch::{BatchOrSingle, FramedMessage};
pub use error::{JlrpcError, Result};
pub use request::{Params, Request, RequestId, Version};
pub use response::{ErrorCode, ErrorPayload, Response};
