use jlrpc_common::{BatchOrSingle, Request, Response};
use jlrpc_server::{ClientId, Server, ServerConfig};
use serde_json::json;

fn main() -> jlrpc_common::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::new("127.0.0.1:7700".parse().unwrap());
    let mut server = Server::bind(config)?;
    println!("Echo server listening on {}", server.local_addr()?);

    server.run(|client: ClientId, requests: BatchOrSingle<Request>| {
        let responses: Vec<Response> = requests
            .iter()
            .filter_map(|request| {
                println!("{client}: {} ({:?})", request.method, request.params);
                let id = request.id.clone()?;
                Some(Response::success(json!(request.method), id))
            })
            .collect();
        Ok(if responses.is_empty() {
            None
        } else {
            Some(responses)
        })
    })
}
