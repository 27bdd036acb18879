//! Cross-type protocol tests: round-trip laws, idempotence, and the
//! invariants every parsed object must satisfy.

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;

    #[test]
    fn test_request_round_trip_law() {
        let cases = vec![
            Request::new("echo", Some(RequestId::Number(1))).unwrap(),
            Request::new("echo", Some(RequestId::String("abc".into()))).unwrap(),
            Request::new("echo", Some(RequestId::Null)).unwrap(),
            Request::notification("fire").unwrap(),
            Request::new("sum", Some(RequestId::Number(2)))
                .unwrap()
                .with_positional_params(vec![json!(1), json!(2), json!(3)]),
            Request::new("get", Some(RequestId::Number(3)))
                .unwrap()
                .with_named_params(
                    json!({"key": "k", "nested": {"deep": [null, true]}})
                        .as_object()
                        .unwrap()
                        .clone(),
                ),
        ];
        for request in cases {
            let parsed = Request::from_line(&request.to_line().unwrap()).unwrap();
            assert_eq!(request, parsed);
        }
    }

    #[test]
    fn test_response_round_trip_law() {
        let cases = vec![
            Response::success(json!(19), RequestId::Number(1)),
            Response::success(json!(null), RequestId::String("x".into())),
            Response::failure(ErrorPayload::parse_error(), RequestId::Null),
            Response::failure(
                ErrorPayload::server_error(-32010, "backend down")
                    .unwrap()
                    .with_data(json!({"retry_after": 5})),
                RequestId::Number(9),
            ),
        ];
        for response in cases {
            let parsed = Response::from_line(&response.to_line().unwrap()).unwrap();
            assert_eq!(response, parsed);
        }
    }

    #[test]
    fn test_serialization_idempotence() {
        let a = Request::new("a", Some(RequestId::Number(1))).unwrap();
        let b = Request::notification("b").unwrap();

        let mut concatenated = a.to_line().unwrap();
        assert_eq!(*concatenated.last().unwrap(), b'\n');
        concatenated.extend_from_slice(&b.to_line().unwrap());

        let parsed: BatchOrSingle<Request> =
            BatchOrSingle::from_bytes(&concatenated).unwrap();
        assert_eq!(parsed, BatchOrSingle::many(vec![a, b]));
    }

    #[test]
    fn test_parsed_request_invariants() {
        let lines: &[&[u8]] = &[
            br#"{"jsonrpc":"2.0","method":"m"}"#,
            br#"{"jsonrpc":"2.0","method":"m","id":4}"#,
            br#"{"jsonrpc":"2.0","method":"m","id":"s"}"#,
            br#"{"jsonrpc":"2.0","method":"m","id":null,"params":[]}"#,
            br#"{"jsonrpc":"2.0","method":"m","params":{"a":1}}"#,
        ];
        for line in lines {
            let request = Request::from_line(line).unwrap();
            assert!(!request.method.is_empty());
            match &request.params {
                None | Some(Params::Array(_)) | Some(Params::Object(_)) => {}
            }
            match &request.id {
                None
                | Some(RequestId::Number(_))
                | Some(RequestId::String(_))
                | Some(RequestId::Null) => {}
            }
        }
    }

    #[test]
    fn test_error_code_domain() {
        for code in [-32700, -32600, -32601, -32602, -32603] {
            assert_eq!(ErrorCode::from_code(code).unwrap().value(), code);
        }
        for code in -32099..=-32000 {
            assert_eq!(
                ErrorCode::from_code(code).unwrap(),
                ErrorCode::ServerError(code)
            );
        }
    }

    #[test]
    fn test_response_echoes_request_id_verbatim() {
        let request =
            Request::from_line(br#"{"jsonrpc":"2.0","method":"m","id":9007199254740993}"#)
                .unwrap();
        let id = request.id.clone().unwrap();
        let response = Response::success(json!("ok"), id.clone());
        let parsed = Response::from_line(&response.to_line().unwrap()).unwrap();
        assert_eq!(parsed.id(), &id);
        assert_eq!(parsed.id(), &RequestId::Number(9007199254740993));
    }

    #[test]
    fn test_framed_message_seam() {
        fn round_trip<T: FramedMessage + PartialEq + std::fmt::Debug>(value: &T) {
            let line = value.to_line().unwrap();
            let parsed = T::from_line(&line).unwrap();
            assert_eq!(&parsed, value);
        }
        round_trip(&Request::new("m", Some(RequestId::Number(1))).unwrap());
        round_trip(&Response::success(json!(1), RequestId::Number(1)));
    }
}
