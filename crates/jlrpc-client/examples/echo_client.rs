use jlrpc_client::RpcClient;
use jlrpc_common::{BatchOrSingle, Request, RequestId};
use serde_json::json;

fn main() -> jlrpc_common::Result<()> {
    println!("Connecting to 127.0.0.1:7700 (echo server)");
    let mut client = RpcClient::connect("127.0.0.1:7700")?;

    println!("Calling echo RPC...");
    let request = Request::new("echo", Some(RequestId::Number(1)))?
        .with_positional_params(vec![json!("hello from client")]);
    match client.call_one(request) {
        Ok(response) => println!("Success! Result: {:?}", response.result()),
        Err(e) => eprintln!("Error: {e}"),
    }

    println!("Sending a batch...");
    let batch = BatchOrSingle::many(vec![
        Request::new("first", Some(RequestId::Number(2)))?,
        Request::new("second", Some(RequestId::String("3".into())))?,
        Request::notification("and-a-notification")?,
    ]);
    let responses = client.call(batch)?;
    for response in responses.iter() {
        println!("  {:?} -> {:?}", response.id(), response.result());
    }

    client.notify(&Request::notification("bye")?)?;
    Ok(())
}
