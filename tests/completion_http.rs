use novachat::{ChatSession, CompletionError, Config, LlmClient, Message, SendState};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the fake endpoint saw
struct CapturedRequest {
    head: String,
    body: serde_json::Value,
}

/// Serve exactly one HTTP response on a local port
async fn one_shot_endpoint(status: &'static str, body: String) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&chunk[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while raw.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending body");
            raw.extend_from_slice(&chunk[..n]);
        }

        let request_body = serde_json::from_slice(&raw[header_end..header_end + content_length])
            .unwrap_or(serde_json::Value::Null);

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let _ = tx.send(CapturedRequest {
            head,
            body: request_body,
        });
    });

    (format!("http://{}/api/v1", addr), rx)
}

fn config_for(base_url: String) -> Config {
    Config {
        api_key: Some("test-key-123".to_string()),
        base_url,
        model: "meta-llama/llama-3-8b-instruct".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_hi_scenario_over_http() {
    let reply = json!({"choices": [{"message": {"role": "assistant", "content": "Hi there!"}}]});
    let (base_url, captured) = one_shot_endpoint("200 OK", reply.to_string()).await;
    let config = config_for(base_url);
    let client = LlmClient::new(&config);

    let mut session = ChatSession::new(config.greeting.clone());
    session.send(&client, "Hi").await;

    assert_eq!(session.state(), &SendState::Idle);
    assert_eq!(
        session.conversation().to_messages(),
        vec![
            Message::assistant("Hello! How can I help you today?"),
            Message::user("Hi"),
            Message::assistant("Hi there!"),
        ]
    );

    let request = captured.await.unwrap();
    let head = request.head.to_lowercase();
    assert!(head.starts_with("post /api/v1/chat/completions "));
    assert!(head.contains("authorization: bearer test-key-123"));
    assert_eq!(
        request.body,
        json!({
            "model": "meta-llama/llama-3-8b-instruct",
            "messages": [
                {"role": "assistant", "content": "Hello! How can I help you today?"},
                {"role": "user", "content": "Hi"}
            ]
        })
    );
}

#[tokio::test]
async fn test_empty_object_is_protocol_error() {
    let (base_url, _captured) = one_shot_endpoint("200 OK", "{}".to_string()).await;
    let client = LlmClient::new(&config_for(base_url));

    let err = client.request_completion(&[Message::user("Hi")]).await.unwrap_err();
    assert!(err.is_protocol(), "expected protocol error, got {:?}", err);
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let body = json!({"error": {"message": "invalid key"}}).to_string();
    let (base_url, _captured) = one_shot_endpoint("401 Unauthorized", body).await;
    let client = LlmClient::new(&config_for(base_url));

    match client.request_completion(&[Message::user("Hi")]).await {
        Err(CompletionError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("invalid key"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_request_leaves_user_message_and_clears_flag() {
    let (base_url, _captured) = one_shot_endpoint("500 Internal Server Error", "oops".to_string()).await;
    let config = config_for(base_url);
    let client = LlmClient::new(&config);

    let mut session = ChatSession::new(config.greeting.clone());
    session.send(&client, "Hi").await;

    assert!(!session.is_request_in_flight());
    assert!(matches!(session.state(), SendState::Failed(_)));
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LlmClient::new(&config_for(format!("http://{}", addr)));
    let err = client.request_completion(&[Message::user("Hi")]).await.unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)));
}
