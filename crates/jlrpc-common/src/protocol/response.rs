//! jlrpc Response Types
//!
//! This module defines the response side of the object model: the error code
//! space, the error payload, and the success/failure response sum.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::error::{JlrpcError, Result};
use super::request::{strip_newline, RequestId, Version};

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Implementation-defined server errors occupy `[-32099, -32000]`.
const SERVER_ERROR_BAND: std::ops::RangeInclusive<i64> = -32099..=-32000;
/// The rest of the pre-defined range is reserved and refuses to decode.
const RESERVED_BAND: std::ops::Range<i64> = -32768..-32100;

/// JSON-RPC error code.
///
/// The named variants carry the five codes JSON-RPC 2.0 defines;
/// `ServerError` carries an implementation-defined code in
/// `[-32099, -32000]`. Codes are validated on decode: the remaining
/// pre-defined range `[-32768, -32100)` is [`JlrpcError::ReservedErrorCode`]
/// and anything else is [`JlrpcError::InvalidErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64),
}

impl ErrorCode {
    /// The numeric wire value.
    pub fn value(self) -> i64 {
        match self {
            ErrorCode::ParseError => PARSE_ERROR,
            ErrorCode::InvalidRequest => INVALID_REQUEST,
            ErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => INVALID_PARAMS,
            ErrorCode::InternalError => INTERNAL_ERROR,
            ErrorCode::ServerError(code) => code,
        }
    }

    /// Decodes a numeric wire value.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            PARSE_ERROR => Ok(ErrorCode::ParseError),
            INVALID_REQUEST => Ok(ErrorCode::InvalidRequest),
            METHOD_NOT_FOUND => Ok(ErrorCode::MethodNotFound),
            INVALID_PARAMS => Ok(ErrorCode::InvalidParams),
            INTERNAL_ERROR => Ok(ErrorCode::InternalError),
            _ if SERVER_ERROR_BAND.contains(&code) => Ok(ErrorCode::ServerError(code)),
            _ if RESERVED_BAND.contains(&code) => Err(JlrpcError::ReservedErrorCode(code)),
            _ => Err(JlrpcError::InvalidErrorCode(code)),
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value())
    }
}

/// The `error` member of a failure response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches arbitrary diagnostic data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create a parse error (-32700).
    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    /// Create an invalid request error (-32600).
    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, "Invalid Request")
    }

    /// Create a method not found error (-32601).
    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, "Method not found")
    }

    /// Create an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Create an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a server error with an implementation-defined code.
    ///
    /// Fails unless `code` is inside `[-32099, -32000]`.
    pub fn server_error(code: i64, message: impl Into<String>) -> Result<Self> {
        match ErrorCode::from_code(code)? {
            c @ ErrorCode::ServerError(_) => Ok(Self::new(c, message)),
            c => Err(JlrpcError::InvalidErrorCode(c.value())),
        }
    }

    /// Validates the `error` member of a response.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or(JlrpcError::InvalidErrorObject)?;

        let code = obj
            .get("code")
            .and_then(Value::as_i64)
            .ok_or(JlrpcError::MissingErrorCode)?;
        let code = ErrorCode::from_code(code)?;

        let message = match obj.get("message") {
            None => return Err(JlrpcError::MissingErrorMessage),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(JlrpcError::InvalidErrorMessage),
        };

        Ok(Self {
            code,
            message,
            data: obj.get("data").cloned(),
        })
    }
}

/// A JSON-RPC 2.0 response.
///
/// Success carries an arbitrary `result` (possibly the JSON `null`) and a
/// non-null id echoed from the request. Failure carries an [`ErrorPayload`]
/// and an id that may be the literal `Null` when the server could not parse
/// one out of a malformed request.
///
/// # Example
///
/// ```
/// use jlrpc_common::protocol::{ErrorPayload, RequestId, Response};
/// use serde_json::json;
///
/// let ok = Response::success(json!(19), RequestId::Number(1));
/// let err = Response::failure(ErrorPayload::method_not_found(), RequestId::Null);
/// assert!(ok.is_success());
/// assert_eq!(err.error().unwrap().message, "Method not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        jsonrpc: Version,
        result: Value,
        id: RequestId,
    },
    Failure {
        jsonrpc: Version,
        error: ErrorPayload,
        id: RequestId,
    },
}

impl Response {
    /// Creates a success response. The id is always present; `result` may be
    /// any JSON value including `null`.
    pub fn success(result: Value, id: RequestId) -> Self {
        Response::Success {
            jsonrpc: Version::V2,
            result,
            id,
        }
    }

    /// Creates a failure response. `id` is `RequestId::Null` when the
    /// offending request's id could not be recovered.
    pub fn failure(error: ErrorPayload, id: RequestId) -> Self {
        Response::Failure {
            jsonrpc: Version::V2,
            error,
            id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// The echoed request id.
    pub fn id(&self) -> &RequestId {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => id,
        }
    }

    /// The result value, when this is a success.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Response::Success { result, .. } => Some(result),
            Response::Failure { .. } => None,
        }
    }

    /// The error payload, when this is a failure.
    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Response::Success { .. } => None,
            Response::Failure { error, .. } => Some(error),
        }
    }

    /// Parses one JSON Lines record into a response.
    ///
    /// The presence of an `error` member selects the failure shape; its
    /// `code` must be an in-range integer and its `message` a string.
    /// Otherwise a `result` member must be present (any JSON) together with
    /// a non-null id.
    pub fn from_line(line: &[u8]) -> Result<Self> {
        let line = strip_newline(line);
        let root: Value = serde_json::from_slice(line)?;
        let obj = root.as_object().ok_or_else(|| {
            JlrpcError::InvalidResponse("response is not a JSON object".to_string())
        })?;

        match obj.get("jsonrpc").and_then(Value::as_str) {
            Some("2.0") => {}
            other => {
                return Err(JlrpcError::InvalidResponse(format!(
                    "jsonrpc member missing or unsupported: {other:?}"
                )))
            }
        }

        let id = match obj.get("id") {
            None => return Err(JlrpcError::MissingId),
            Some(v) => RequestId::from_value(v)?,
        };

        if let Some(error) = obj.get("error") {
            let error = ErrorPayload::from_value(error)?;
            return Ok(Response::failure(error, id));
        }

        let result = obj
            .get("result")
            .cloned()
            .ok_or_else(|| JlrpcError::InvalidResponse("missing result member".to_string()))?;
        if id == RequestId::Null {
            return Err(JlrpcError::InvalidId(
                "success response id is null".to_string(),
            ));
        }
        Ok(Response::success(result, id))
    }

    /// Serializes this response as one LF-terminated JSON Lines record.
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ParseError.value(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.value(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.value(), -32601);
        assert_eq!(ErrorCode::InvalidParams.value(), -32602);
        assert_eq!(ErrorCode::InternalError.value(), -32603);
        assert_eq!(ErrorCode::ServerError(-32050).value(), -32050);
    }

    #[test]
    fn test_error_code_decode_named() {
        assert_eq!(ErrorCode::from_code(-32700).unwrap(), ErrorCode::ParseError);
        assert_eq!(
            ErrorCode::from_code(-32601).unwrap(),
            ErrorCode::MethodNotFound
        );
    }

    #[test]
    fn test_error_code_server_band_boundaries() {
        assert_eq!(
            ErrorCode::from_code(-32000).unwrap(),
            ErrorCode::ServerError(-32000)
        );
        assert_eq!(
            ErrorCode::from_code(-32099).unwrap(),
            ErrorCode::ServerError(-32099)
        );
    }

    #[test]
    fn test_error_code_reserved_and_invalid() {
        assert!(matches!(
            ErrorCode::from_code(-32768),
            Err(JlrpcError::ReservedErrorCode(-32768))
        ));
        assert!(matches!(
            ErrorCode::from_code(-32150),
            Err(JlrpcError::ReservedErrorCode(-32150))
        ));
        assert!(matches!(
            ErrorCode::from_code(-32100),
            Err(JlrpcError::InvalidErrorCode(-32100))
        ));
        assert!(matches!(
            ErrorCode::from_code(0),
            Err(JlrpcError::InvalidErrorCode(0))
        ));
        assert!(matches!(
            ErrorCode::from_code(-31999),
            Err(JlrpcError::InvalidErrorCode(-31999))
        ));
    }

    #[test]
    fn test_canonical_messages() {
        assert_eq!(ErrorPayload::parse_error().message, "Parse error");
        assert_eq!(ErrorPayload::invalid_request().message, "Invalid Request");
        assert_eq!(
            ErrorPayload::method_not_found().message,
            "Method not found"
        );
    }

    #[test]
    fn test_server_error_constructor_validates_band() {
        let payload = ErrorPayload::server_error(-32042, "backend down").unwrap();
        assert_eq!(payload.code, ErrorCode::ServerError(-32042));
        assert!(ErrorPayload::server_error(-32700, "nope").is_err());
    }

    #[test]
    fn test_success_serialization_shape() {
        let resp = Response::success(json!(19), RequestId::Number(1));
        let text = String::from_utf8(resp.to_line().unwrap()).unwrap();
        assert_eq!(text, "{\"jsonrpc\":\"2.0\",\"result\":19,\"id\":1}\n");
    }

    #[test]
    fn test_null_result_is_emitted() {
        let resp = Response::success(Value::Null, RequestId::Number(1));
        let text = String::from_utf8(resp.to_line().unwrap()).unwrap();
        assert!(text.contains("\"result\":null"));
    }

    #[test]
    fn test_failure_serialization_shape() {
        let resp = Response::failure(
            ErrorPayload::method_not_found(),
            RequestId::String("1".into()),
        );
        let text = String::from_utf8(resp.to_line().unwrap()).unwrap();
        assert_eq!(
            text,
            "{\"jsonrpc\":\"2.0\",\"error\":{\"code\":-32601,\"message\":\"Method not found\"},\"id\":\"1\"}\n"
        );
    }

    #[test]
    fn test_parse_success() {
        let resp = Response::from_line(b"{\"jsonrpc\":\"2.0\",\"result\":19,\"id\":1}\n").unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.result(), Some(&json!(19)));
        assert_eq!(resp.id(), &RequestId::Number(1));
    }

    #[test]
    fn test_parse_failure_with_null_id() {
        let resp = Response::from_line(
            br#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Parse error"},"id":null}"#,
        )
        .unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.id(), &RequestId::Null);
        assert_eq!(resp.error().unwrap().code, ErrorCode::ParseError);
    }

    #[test]
    fn test_parse_rejects_null_id_on_success() {
        let err = Response::from_line(br#"{"jsonrpc":"2.0","result":1,"id":null}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidId(_)));
    }

    #[test]
    fn test_parse_rejects_missing_id() {
        let err = Response::from_line(br#"{"jsonrpc":"2.0","result":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::MissingId));
    }

    #[test]
    fn test_parse_rejects_missing_result() {
        let err = Response::from_line(br#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_rejects_missing_error_code() {
        let err = Response::from_line(
            br#"{"jsonrpc":"2.0","error":{"message":"broken"},"id":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JlrpcError::MissingErrorCode));
    }

    #[test]
    fn test_parse_rejects_non_integer_error_code() {
        let err = Response::from_line(
            br#"{"jsonrpc":"2.0","error":{"code":"E1","message":"broken"},"id":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JlrpcError::MissingErrorCode));
    }

    #[test]
    fn test_parse_rejects_missing_error_message() {
        let err =
            Response::from_line(br#"{"jsonrpc":"2.0","error":{"code":-32700},"id":1}"#)
                .unwrap_err();
        assert!(matches!(err, JlrpcError::MissingErrorMessage));
    }

    #[test]
    fn test_parse_rejects_non_string_error_message() {
        let err = Response::from_line(
            br#"{"jsonrpc":"2.0","error":{"code":-32700,"message":9},"id":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidErrorMessage));
    }

    #[test]
    fn test_parse_rejects_non_object_error() {
        let err = Response::from_line(br#"{"jsonrpc":"2.0","error":"bad","id":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidErrorObject));
    }

    #[test]
    fn test_error_data_round_trip() {
        let resp = Response::failure(
            ErrorPayload::invalid_params("missing field").with_data(json!({"field": "n"})),
            RequestId::Number(4),
        );
        let parsed = Response::from_line(&resp.to_line().unwrap()).unwrap();
        assert_eq!(resp, parsed);
    }

    #[test]
    fn test_response_round_trip() {
        let resp = Response::success(json!({"value": [1, 2, 3]}), RequestId::String("k".into()));
        let parsed = Response::from_line(&resp.to_line().unwrap()).unwrap();
        assert_eq!(resp, parsed);
    }
}
