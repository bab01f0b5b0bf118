//! HTTP transport and retry tests against a mock chat-completions server

use chatllm_core::config::{ClientConfig, SecretString, DEFAULT_API_PATH};
use chatllm_core::http::{HttpTransport, ReqwestTransport, RequestOptions, TransportError};
use chatllm_core::protocol::ChatRequest;
use chatllm_core::retry::AttemptFailure;
use chatllm_core::{ChatClient, ChatError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROMPT: &str = "For the RTSP protocol, the typical sequence is: DESCRIBE, SETUP, PLAY. \
                      Where do \"SET_PARAMETER\" and TEARDOWN go?";

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.uri())
        .with_api_key("test-key")
}

/// Request carries the exact headers and body
#[tokio::test]
async fn test_request_shape() {
    let mock_server = MockServer::start().await;
    let expected_body = ChatRequest::new("gpt-4o-mini", PROMPT, 0.7).to_json_body();

    Mock::given(method("POST"))
        .and(path(DEFAULT_API_PATH))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer test-key"))
        .and(header_exists("x-request-id"))
        .and(body_string(expected_body))
        .respond_with(completion("SET_PARAMETER after PLAY, TEARDOWN last"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(test_config(&mock_server)).expect("Failed to create client");
    let content = client.chat(PROMPT, "gpt-4o-mini", 3, 0.7).await;

    assert_eq!(
        content.as_deref(),
        Some("SET_PARAMETER after PLAY, TEARDOWN last")
    );
}

/// Two server errors followed by a success: three attempts, content returned
#[tokio::test]
async fn test_recovers_after_two_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_API_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_API_PATH))
        .respond_with(completion("third attempt"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(test_config(&mock_server)).unwrap();
    let outcome = client.try_chat("hi", "gpt-4o-mini", 3, 0.7).await.unwrap();

    assert_eq!(outcome.content, "third attempt");
    assert_eq!(outcome.attempts, 3);
    assert_eq!(
        outcome.failures,
        vec![AttemptFailure::Status(500), AttemptFailure::Status(500)]
    );
}

/// Status other than 200 is a failure even when the body has content
#[tokio::test]
async fn test_non_200_success_codes_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201).set_body_string(r#"{"content":"created, not ok"}"#),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(test_config(&mock_server)).unwrap();
    let err = client.try_chat("hi", "m", 2, 0.7).await.unwrap_err();

    assert_eq!(err.last_failure(), Some(&AttemptFailure::Status(201)));
}

/// A 200 without a content field is retried like a transport failure
#[tokio::test]
async fn test_unparseable_body_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(test_config(&mock_server)).unwrap();
    assert_eq!(client.chat("hi", "m", 3, 0.7).await, None);
}

/// No credential: the server never sees a request
#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion("unreachable"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default().with_base_url(mock_server.uri());
    let client = ChatClient::new(config).unwrap();

    let err = client.try_chat("hi", "m", 3, 0.7).await.unwrap_err();
    assert!(matches!(err, ChatError::MissingCredential));
}

/// Slow responses hit the per-attempt timeout
#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion("late").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new(&test_config(&mock_server)).unwrap();
    let options = RequestOptions::new(Duration::from_millis(200));
    let url = format!("{}{}", mock_server.uri(), DEFAULT_API_PATH);

    let result = transport
        .post_json(&url, &SecretString::new("test-key"), "{}", &options)
        .await;

    assert_eq!(
        result.unwrap_err(),
        TransportError::Timeout(Duration::from_millis(200))
    );
}

/// Bodies over the configured limit abort the attempt
#[tokio::test]
async fn test_response_size_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion(&"x".repeat(4096)))
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        max_response_bytes: 1024,
        ..test_config(&mock_server)
    };
    let client = ChatClient::new(config).unwrap();
    let err = client.try_chat("hi", "m", 1, 0.7).await.unwrap_err();

    assert!(matches!(
        err.last_failure(),
        Some(AttemptFailure::Transport(TransportError::ResponseTooLarge { max: 1024, .. }))
    ));
}

/// Serve one chunked 200 response, read after the full request has arrived
async fn serve_chunked_once(chunks: Vec<Vec<u8>>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        // Headers, then as many body bytes as Content-Length announces
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + body_len {
                    break;
                }
            }
        }

        let mut response =
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n"
                .to_vec();
        for chunk in chunks {
            response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            response.extend_from_slice(&chunk);
            response.extend_from_slice(b"\r\n");
        }
        response.extend_from_slice(b"0\r\n\r\n");
        socket.write_all(&response).await.unwrap();
        socket.flush().await.unwrap();

        // Hold the connection until the client is done with it
        let _ = socket.read(&mut buf).await;
    });

    format!("http://{}", addr)
}

/// Without Content-Length the cap is enforced while chunks accumulate
#[tokio::test]
async fn test_chunked_response_size_limit() {
    let url = serve_chunked_once(vec![vec![b'a'; 600], vec![b'b'; 600]]).await;
    let transport = ReqwestTransport::from_client(reqwest::Client::new(), 1024);

    let result = transport
        .post_json(
            &url,
            &SecretString::new("test-key"),
            "{}",
            &RequestOptions::new(Duration::from_secs(5)),
        )
        .await;

    match result {
        Err(TransportError::ResponseTooLarge { size, max }) => {
            assert_eq!(max, 1024);
            assert!(size > 1024 && size <= 1200, "unexpected size {}", size);
        }
        other => panic!("Expected ResponseTooLarge, got {:?}", other),
    }
}

/// Chunked bodies under the cap arrive intact
#[tokio::test]
async fn test_chunked_response_is_accumulated() {
    let body = br#"{"choices":[{"message":{"content":"chunked answer"}}]}"#;
    let (head, tail) = body.split_at(20);
    let url = serve_chunked_once(vec![head.to_vec(), tail.to_vec()]).await;
    let transport = ReqwestTransport::from_client(reqwest::Client::new(), 1024);

    let response = transport
        .post_json(
            &url,
            &SecretString::new("test-key"),
            "{}",
            &RequestOptions::new(Duration::from_secs(5)),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, body.to_vec());
}

/// Large bodies are accumulated completely
#[tokio::test]
async fn test_large_body_is_accumulated() {
    let mock_server = MockServer::start().await;
    let long_answer = "RTSP ".repeat(50_000);

    Mock::given(method("POST"))
        .respond_with(completion(&long_answer))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(test_config(&mock_server)).unwrap();
    let content = client.chat("hi", "m", 1, 0.7).await.unwrap();

    assert_eq!(content.len(), long_answer.len());
    assert_eq!(content, long_answer);
}

/// Connection refused is reported as a transport failure
#[tokio::test]
async fn test_connection_refused() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClientConfig::default()
        .with_base_url(format!("http://127.0.0.1:{}", port))
        .with_api_key("test-key");
    let client = ChatClient::new(config).unwrap();
    let err = client.try_chat("hi", "m", 2, 0.7).await.unwrap_err();

    match err {
        ChatError::Exhausted { attempts, failures } => {
            assert_eq!(attempts, 2);
            assert!(failures
                .iter()
                .all(|f| matches!(f, AttemptFailure::Transport(_))));
        }
        other => panic!("Expected Exhausted, got {:?}", other),
    }
}
