//! Protocol client against a loopback engine stub

use sculpt::prelude::*;
use sculpt::protocol::io::{read_frame, write_message};
use sculpt::protocol::{Framing, TcpConnector};
use sculpt::CommandKind;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Accept one connection and answer every request with `reply(request)`.
/// Resolves to the requests received once the client hangs up.
async fn spawn_engine(
    framing: Framing,
    reply: fn(&Value) -> Value,
) -> (EngineAddress, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut socket = BufReader::new(socket);
        let mut requests = Vec::new();
        while let Ok(body) = read_frame(&mut socket, framing).await {
            let request: Value = serde_json::from_slice(&body).unwrap();
            let response = reply(&request);
            requests.push(request);
            write_message(socket.get_mut(), framing, &response)
                .await
                .unwrap();
        }
        requests
    });

    (EngineAddress::new("127.0.0.1", port), handle)
}

fn echo_kind(request: &Value) -> Value {
    json!({"status": "success", "result": {"type": request["type"]}})
}

#[tokio::test]
async fn test_round_trip_over_tcp() {
    let (address, engine) = spawn_engine(Framing::LengthPrefixed, echo_kind).await;
    let mut client = ProtocolClient::connect(&address, Framing::LengthPrefixed, TIMEOUT, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(client.peer(), address.to_string());

    let response = client
        .execute(Command::execute_script("import bpy"))
        .await
        .unwrap();
    assert_eq!(response.payload, Some(json!({"type": "execute_code"})));

    client.close().await;
    let requests = engine.await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["params"]["code"], "import bpy");
}

#[tokio::test]
async fn test_newline_delimited_framing() {
    let (address, engine) = spawn_engine(Framing::NewlineDelimited, echo_kind).await;
    let mut client =
        ProtocolClient::connect(&address, Framing::NewlineDelimited, TIMEOUT, TIMEOUT)
            .await
            .unwrap();

    for name in ["a", "b", "c"] {
        let response = client.execute(Command::delete_object(name)).await.unwrap();
        assert_eq!(response.payload, Some(json!({"type": "delete_object"})));
    }

    client.close().await;
    let requests = engine.await.unwrap();
    let names: Vec<_> = requests
        .iter()
        .map(|r| r["params"]["object_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_large_response_decodes() {
    fn big(_: &Value) -> Value {
        json!({"status": "success", "result": "v".repeat(1 << 20)})
    }

    let (address, _engine) = spawn_engine(Framing::LengthPrefixed, big).await;
    let mut client = ProtocolClient::connect(&address, Framing::LengthPrefixed, TIMEOUT, TIMEOUT)
        .await
        .unwrap();

    let response = client
        .execute(Command::execute_script("dump()"))
        .await
        .unwrap();
    assert_eq!(response.payload.unwrap().as_str().unwrap().len(), 1 << 20);
}

#[tokio::test]
async fn test_failure_status_is_command_error() {
    fn reject(_: &Value) -> Value {
        json!({"status": "error", "error": "object not found"})
    }

    let (address, _engine) = spawn_engine(Framing::LengthPrefixed, reject).await;
    let mut client = ProtocolClient::connect(&address, Framing::LengthPrefixed, TIMEOUT, TIMEOUT)
        .await
        .unwrap();

    let response = client.send(Command::delete_object("ghost")).await.unwrap();
    assert!(!response.is_success());

    let err = client
        .execute(Command::delete_object("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Command { kind: CommandKind::DeleteObject, ref detail }
            if detail == "object not found"
    ));
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_refused_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = ProtocolClient::connect(
        &EngineAddress::new("127.0.0.1", port),
        Framing::LengthPrefixed,
        TIMEOUT,
        TIMEOUT,
    )
    .await;
    match result {
        Err(err) => assert!(err.is_connection()),
        Ok(_) => panic!("connected to a closed port"),
    }
}

#[tokio::test]
async fn test_send_after_close_fails() {
    let (address, _engine) = spawn_engine(Framing::LengthPrefixed, echo_kind).await;
    let mut client = ProtocolClient::connect(&address, Framing::LengthPrefixed, TIMEOUT, TIMEOUT)
        .await
        .unwrap();

    client.close().await;
    client.close().await;

    let err = client
        .send(Command::delete_object("tree"))
        .await
        .unwrap_err();
    assert!(err.is_connection());
}

#[tokio::test]
async fn test_connector_uses_settings() {
    let (address, engine) = spawn_engine(Framing::NewlineDelimited, echo_kind).await;
    let settings = Settings::default()
        .with_engine(address)
        .with_framing(Framing::NewlineDelimited);

    let connector = TcpConnector::from_settings(&settings);
    let mut client = connector.connect().await.unwrap();
    assert_eq!(client.framing(), Framing::NewlineDelimited);
    client
        .execute(Command::delete_object("tree"))
        .await
        .unwrap();
    client.close().await;

    assert_eq!(engine.await.unwrap().len(), 1);
}
