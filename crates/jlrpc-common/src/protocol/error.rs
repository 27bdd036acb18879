use thiserror::Error;

/// Error type for every jlrpc operation.
///
/// Protocol kinds describe inbound wire violations, framing kinds describe
/// line-extraction failures, and the remaining kinds cover I/O and server
/// resources. Would-block is never surfaced here: it stays
/// `std::io::ErrorKind::WouldBlock` inside the framing layer and callers see
/// "no progress" instead of an error.
#[derive(Error, Debug)]
pub enum JlrpcError {
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request has no method member")]
    MissingMethod,

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("response has no id member")]
    MissingId,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("error object code is missing or not an integer")]
    MissingErrorCode,

    #[error("error code {0} is outside the JSON-RPC error range")]
    InvalidErrorCode(i64),

    #[error("error code {0} falls in the reserved range")]
    ReservedErrorCode(i64),

    #[error("error object has no message member")]
    MissingErrorMessage,

    #[error("error object message is not a string")]
    InvalidErrorMessage,

    #[error("error member is not an object")]
    InvalidErrorObject,

    #[error("empty input")]
    EmptyInput,

    #[error("line exceeds the read buffer capacity of {0} bytes")]
    LineTooLong(usize),

    #[error("connection closed by peer")]
    Closed,

    #[error("read timed out after {0}ms")]
    Timeout(u64),

    #[error("client slot table full ({0} slots)")]
    SlotTableFull(usize),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JlrpcError>;
