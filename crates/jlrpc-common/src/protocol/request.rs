//! jlrpc Request Types
//!
//! This module defines the request side of the object model: the protocol
//! version tag, request identifiers, structured params, and the validated
//! `Request` itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{JlrpcError, Result};

/// JSON-RPC protocol version.
///
/// A closed enumeration with a single variant whose wire form is the string
/// `"2.0"`. Any other value on the wire is a protocol violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    #[default]
    #[serde(rename = "2.0")]
    V2,
}

/// Request identifier.
///
/// JSON-RPC ids may be an integer, a string, or the literal `null`. Floats,
/// booleans, arrays, and objects are rejected at parse time and are
/// unrepresentable here. Absence of an id is modeled as `Option<RequestId>`
/// on [`Request`]; absence marks a notification, while an explicit `null` id
/// does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

impl RequestId {
    /// Validates a JSON value as a request id.
    ///
    /// Accepts integers, strings, and `null`. Everything else, including
    /// non-integer numbers, fails with [`JlrpcError::InvalidId`].
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(RequestId::Number)
                .ok_or_else(|| JlrpcError::InvalidId(format!("{n} is not an integer"))),
            Value::String(s) => Ok(RequestId::String(s.clone())),
            Value::Null => Ok(RequestId::Null),
            other => Err(JlrpcError::InvalidId(format!(
                "expected integer, string, or null, got {other}"
            ))),
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// Structured method parameters.
///
/// JSON-RPC params must be positional (an array) or named (an object) when
/// present. Absence is `Option<Params>` on [`Request`] and is distinct from
/// an empty array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl Params {
    /// Validates a JSON value as a params member.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Params::Array(items.clone())),
            Value::Object(map) => Ok(Params::Object(map.clone())),
            other => Err(JlrpcError::InvalidParams(format!(
                "expected array or object, got {other}"
            ))),
        }
    }
}

/// A JSON-RPC 2.0 request.
///
/// A request with no `id` member is a notification: the server processes it
/// but owes no response. A request whose `id` is the literal `null` is a
/// regular request. Parsed requests own their JSON subtrees; nothing borrows
/// from the input line after [`Request::from_line`] returns.
///
/// # Example
///
/// ```
/// use jlrpc_common::protocol::{Request, RequestId};
/// use serde_json::json;
///
/// let request = Request::new("subtract", Some(RequestId::Number(1)))
///     .unwrap()
///     .with_positional_params(vec![json!(42), json!(23)]);
/// assert!(!request.is_notification());
///
/// let fire_and_forget = Request::notification("log").unwrap();
/// assert!(fire_and_forget.is_notification());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Protocol version, always `"2.0"` on the wire and emitted first.
    pub jsonrpc: Version,
    /// Method name, at least one byte long.
    pub method: String,
    /// Structured params; omitted from the wire when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Request id; omitted from the wire when absent (notification).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    /// Creates a validated request.
    ///
    /// Fails with [`JlrpcError::InvalidMethod`] when `method` is empty. Ids
    /// and params that JSON-RPC forbids are unrepresentable in the typed
    /// arguments, so no further validation is needed here.
    pub fn new(method: impl Into<String>, id: Option<RequestId>) -> Result<Self> {
        let method = method.into();
        if method.is_empty() {
            return Err(JlrpcError::InvalidMethod("method is empty".to_string()));
        }
        Ok(Request {
            jsonrpc: Version::V2,
            method,
            params: None,
            id,
        })
    }

    /// Creates a notification: a request with no id and thus no response.
    pub fn notification(method: impl Into<String>) -> Result<Self> {
        Self::new(method, None)
    }

    /// Attaches structured params.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Attaches positional (array) params.
    pub fn with_positional_params(self, params: Vec<Value>) -> Self {
        self.with_params(Params::Array(params))
    }

    /// Attaches named (object) params.
    pub fn with_named_params(self, params: Map<String, Value>) -> Self {
        self.with_params(Params::Object(params))
    }

    /// True when this request carries no id and therefore gets no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Parses one JSON Lines record into a request.
    ///
    /// `line` is a single JSON document; a trailing LF is tolerated. Each
    /// wire violation maps to a precise error kind:
    ///
    /// - malformed JSON -> [`JlrpcError::Syntax`]
    /// - root not an object, or `jsonrpc` not `"2.0"` -> [`JlrpcError::InvalidRequest`]
    /// - absent / non-string / empty `method` -> [`JlrpcError::MissingMethod`] /
    ///   [`JlrpcError::InvalidMethod`]
    /// - unstructured `params` -> [`JlrpcError::InvalidParams`]
    /// - ill-typed `id` (floats included) -> [`JlrpcError::InvalidId`]
    pub fn from_line(line: &[u8]) -> Result<Self> {
        let line = strip_newline(line);
        let root: Value = serde_json::from_slice(line)?;
        let obj = root.as_object().ok_or_else(|| {
            JlrpcError::InvalidRequest("request is not a JSON object".to_string())
        })?;

        match obj.get("jsonrpc").and_then(Value::as_str) {
            Some("2.0") => {}
            Some(other) => {
                return Err(JlrpcError::InvalidRequest(format!(
                    "unsupported jsonrpc version {other:?}"
                )))
            }
            None => {
                return Err(JlrpcError::InvalidRequest(
                    "jsonrpc member missing or not a string".to_string(),
                ))
            }
        }

        let method = match obj.get("method") {
            None => return Err(JlrpcError::MissingMethod),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => {
                return Err(JlrpcError::InvalidMethod("method is empty".to_string()))
            }
            Some(other) => {
                return Err(JlrpcError::InvalidMethod(format!(
                    "method is not a string: {other}"
                )))
            }
        };

        // A literal `"params": null` reads as absent; a null id does not.
        let params = match obj.get("params") {
            None | Some(Value::Null) => None,
            Some(value) => Some(Params::from_value(value)?),
        };
        let id = obj.get("id").map(RequestId::from_value).transpose()?;

        Ok(Request {
            jsonrpc: Version::V2,
            method,
            params,
            id,
        })
    }

    /// Serializes this request as one LF-terminated JSON Lines record.
    ///
    /// `jsonrpc` is emitted first; absent optional members are omitted
    /// entirely, never emitted as `null`.
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Strips at most one trailing LF from a JSON Lines record.
pub(crate) fn strip_newline(line: &[u8]) -> &[u8] {
    match line {
        [rest @ .., b'\n'] => rest,
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_creation() {
        let req = Request::new("compute", Some(RequestId::Number(7))).unwrap();
        assert_eq!(req.method, "compute");
        assert_eq!(req.id, Some(RequestId::Number(7)));
        assert!(req.params.is_none());
        assert!(!req.is_notification());
    }

    #[test]
    fn test_notification_has_no_id() {
        let req = Request::notification("log").unwrap();
        assert!(req.is_notification());
        assert!(req.id.is_none());
    }

    #[test]
    fn test_null_id_is_not_a_notification() {
        let req = Request::new("compute", Some(RequestId::Null)).unwrap();
        assert!(!req.is_notification());
    }

    #[test]
    fn test_empty_method_rejected() {
        let err = Request::new("", None).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidMethod(_)));
    }

    #[test]
    fn test_serialization_emits_jsonrpc_first() {
        let req = Request::new("echo", Some(RequestId::Number(1))).unwrap();
        let line = req.to_line().unwrap();
        let text = String::from_utf8(line).unwrap();
        assert!(text.starts_with(r#"{"jsonrpc":"2.0""#));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_absent_members_are_omitted() {
        let req = Request::notification("ping").unwrap();
        let text = String::from_utf8(req.to_line().unwrap()).unwrap();
        assert!(!text.contains("\"id\""));
        assert!(!text.contains("\"params\""));
    }

    #[test]
    fn test_null_id_is_emitted() {
        let req = Request::new("echo", Some(RequestId::Null)).unwrap();
        let text = String::from_utf8(req.to_line().unwrap()).unwrap();
        assert!(text.contains(r#""id":null"#));
    }

    #[test]
    fn test_from_line_round_trip() {
        let req = Request::new("subtract", Some(RequestId::String("a".into())))
            .unwrap()
            .with_positional_params(vec![json!(42), json!(23)]);
        let parsed = Request::from_line(&req.to_line().unwrap()).unwrap();
        assert_eq!(req, parsed);
    }

    #[test]
    fn test_from_line_tolerates_missing_newline() {
        let parsed =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"echo","id":1}"#).unwrap();
        assert_eq!(parsed.method, "echo");
        assert_eq!(parsed.id, Some(RequestId::Number(1)));
    }

    #[test]
    fn test_malformed_json_is_syntax_error() {
        let err = Request::from_line(b"{\"jsonrpc\":").unwrap_err();
        assert!(matches!(err, JlrpcError::Syntax(_)));
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = Request::from_line(b"[1,2,3]\n").unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidRequest(_)));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let err =
            Request::from_line(br#"{"jsonrpc":"1.0","method":"x","id":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidRequest(_)));
    }

    #[test]
    fn test_missing_method_rejected() {
        let err = Request::from_line(br#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::MissingMethod));
    }

    #[test]
    fn test_non_string_method_rejected() {
        let err =
            Request::from_line(br#"{"jsonrpc":"2.0","method":5,"id":1}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidMethod(_)));
    }

    #[test]
    fn test_float_id_rejected() {
        let err =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","id":1.5}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidId(_)));
    }

    #[test]
    fn test_bool_id_rejected() {
        let err =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","id":true}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidId(_)));
    }

    #[test]
    fn test_unstructured_params_rejected() {
        let err =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","params":3}"#).unwrap_err();
        assert!(matches!(err, JlrpcError::InvalidParams(_)));
    }

    #[test]
    fn test_null_params_reads_as_absent() {
        let req =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"echo","params":null,"id":1}"#)
                .unwrap();
        assert!(req.params.is_none());
    }

    #[test]
    fn test_params_absence_differs_from_empty_array() {
        let absent = Request::from_line(br#"{"jsonrpc":"2.0","method":"x"}"#).unwrap();
        let empty =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","params":[]}"#).unwrap();
        assert!(absent.params.is_none());
        assert_eq!(empty.params, Some(Params::Array(vec![])));
    }

    #[test]
    fn test_id_echo_preserves_type_and_value() {
        let numeric =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"x","id":-9007199254740993}"#)
                .unwrap();
        assert_eq!(numeric.id, Some(RequestId::Number(-9007199254740993)));

        let string = Request::from_line(br#"{"jsonrpc":"2.0","method":"x","id":"1"}"#).unwrap();
        assert_eq!(string.id, Some(RequestId::String("1".into())));
    }
}
