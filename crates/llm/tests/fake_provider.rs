//! DeepSeekClient against a one-shot local HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use runlog_llm::{DeepSeekClient, LlmError, ModelClient, ModelConfig};
use rust_decimal::Decimal;

/// Serve exactly one request with the given status and body, and hand back
/// the raw request text.
fn serve_once(status: &str, content_type: &str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let status = status.to_string();
    let content_type = content_type.to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            let end = line == "\r\n";
            head.push_str(&line);
            if end {
                break;
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();
        head.push_str(&String::from_utf8(request_body).unwrap());

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
        head
    });

    (base, handle)
}

fn client(base: &str, stream: bool) -> DeepSeekClient {
    DeepSeekClient::new(ModelConfig {
        api_base: base.to_string(),
        stream,
        ..ModelConfig::new("sk-fake")
    })
}

fn sse(parts: &[&str]) -> String {
    let mut body = String::from(": connected\n\n");
    for part in parts {
        let event = serde_json::json!({"choices": [{"delta": {"content": part}}]});
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn streamed_completion_is_concatenated() {
    let (base, server) = serve_once("200 OK", "text/event-stream", sse(&["Sum", "mary: OK"]));

    let text = client(&base, true).generate_report("the logs").await.unwrap();
    assert_eq!(text, "Summary: OK");

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /chat/completions"));
    assert!(request.contains("Bearer sk-fake"));
    assert!(request.contains(r#""stream":true"#));
    assert!(request.contains("the logs"));
}

#[tokio::test]
async fn non_streamed_completion_reads_message() {
    let body = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": "All good"}}]
    })
    .to_string();
    let (base, server) = serve_once("200 OK", "application/json", body);

    let text = client(&base, false).generate_report("p").await.unwrap();
    assert_eq!(text, "All good");

    let request = server.join().unwrap();
    assert!(request.contains(r#""stream":false"#));
}

#[tokio::test]
async fn balance_prefers_reference_currency() {
    let body = serde_json::json!({
        "is_available": true,
        "balance_infos": [
            {"currency": "USD", "total_balance": "1.00", "granted_balance": "0.00", "topped_up_balance": "1.00"},
            {"currency": "CNY", "total_balance": "110.50", "granted_balance": "10.00", "topped_up_balance": "100.50"}
        ]
    })
    .to_string();
    let (base, server) = serve_once("200 OK", "application/json", body);

    let snapshot = client(&base, true).check_balance().await.unwrap();
    assert!(snapshot.available);
    assert_eq!(snapshot.currency, "CNY");
    assert_eq!(snapshot.total, Decimal::new(11050, 2));
    assert_eq!(snapshot.topped_up, Decimal::new(10050, 2));

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /user/balance"));
}

#[tokio::test]
async fn error_status_is_provider_error() {
    let (base, server) = serve_once(
        "402 Payment Required",
        "application/json",
        r#"{"error":{"message":"Insufficient Balance"}}"#.to_string(),
    );

    match client(&base, true).generate_report("p").await {
        Err(LlmError::Provider { status, message }) => {
            assert_eq!(status, 402);
            assert!(message.contains("Insufficient Balance"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
    server.join().unwrap();
}

#[tokio::test]
async fn unreachable_provider_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client(&base, true).check_balance().await;
    assert!(matches!(result, Err(LlmError::Network(_))));
}
