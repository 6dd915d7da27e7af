//! HTTP client tests against a one-shot local responder.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use storyloom_core::{
    GenerationRequest, GenerationTransport, SpeechSynthesizer, StoreError, StoryStore,
    StreamError, SynthesisError,
};
use storyloom_remote::{HttpStoryClient, RemoteConfig};
use storyloom_session::{StreamConsumer, continuation_text};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

// ── Harness ────────────────────────────────────────────────────────

/// Serve exactly one request with a canned response, returning the raw
/// request text once the connection is done.
async fn serve_once(status: &str, content_type: &str, body: Vec<u8>) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let head = format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    );

    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    let url = Url::parse(&format!("http://{addr}/")).unwrap();
    (url, task)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0_u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&raw);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn client(base: Url) -> HttpStoryClient {
    HttpStoryClient::new(RemoteConfig::new(base, Duration::from_secs(5))).unwrap()
}

// ── Generation ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_opening_stream_passes_body_through() {
    let sse =
        b"data: {\"text\":\"Once\"}\n\ndata: {\"done\":true,\"story\":\"Once.\"}\n\n".to_vec();
    let (base, server) = serve_once("200 OK", "text/event-stream", sse.clone()).await;

    let request = GenerationRequest::Opening {
        theme: "a lighthouse".to_string(),
        prior_improvisations: vec![],
        session_id: "s-1".to_string(),
    };
    let mut stream = client(base).open(&request).await.unwrap();
    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(received, sse);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /generate-story-stream/ "));
    assert!(raw.contains("\"theme\":\"a lighthouse\""));
    assert!(raw.to_ascii_lowercase().contains("accept: text/event-stream"));
}

#[tokio::test]
async fn test_continuation_uses_continue_endpoint() {
    let body = br#"{"story_id": "story-7", "story": "A fox hid. \n\n\n Then a storm rolled in."}"#;
    let (base, server) = serve_once("200 OK", "application/json", body.to_vec()).await;

    let request = GenerationRequest::Continuation {
        session_id: "story-7".to_string(),
        improvisation: "a storm rolls in".to_string(),
    };
    let mut stream = client(base).open(&request).await.unwrap();
    while stream.next().await.is_some() {}

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /continue-story/ "));
    assert!(raw.contains("\"story_id\":\"story-7\""));
    assert!(raw.contains("\"improv\":\"a storm rolls in\""));
}

#[tokio::test]
async fn test_plain_json_continuation_reply_completes_generation() {
    let body = br#"{"story_id": "story-7", "story": "A fox hid. \n\n\n Then a storm rolled in."}"#;
    let (base, _server) = serve_once("200 OK", "application/json", body.to_vec()).await;

    let consumer = StreamConsumer::new(Arc::new(client(base)));
    let request = GenerationRequest::Continuation {
        session_id: "story-7".to_string(),
        improvisation: "a storm rolls in".to_string(),
    };
    let completion = consumer.generate(&request, |_| {}).await.unwrap();

    assert_eq!(completion.story_id.as_deref(), Some("story-7"));
    assert_eq!(
        continuation_text("A fox hid.", &completion.text),
        "Then a storm rolled in."
    );
}

#[tokio::test]
async fn test_generation_status_error() {
    let (base, _server) = serve_once(
        "500 Internal Server Error",
        "text/plain",
        b"model offline".to_vec(),
    )
    .await;

    let request = GenerationRequest::Opening {
        theme: "anything".to_string(),
        prior_improvisations: vec![],
        session_id: "s-1".to_string(),
    };
    let err = match client(base).open(&request).await {
        Ok(_) => panic!("expected a status error"),
        Err(err) => err,
    };
    assert_eq!(
        err,
        StreamError::Status {
            status: 500,
            message: "model offline".to_string()
        }
    );
}

// ── Speech ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_speech_returns_bytes_and_content_type() {
    let audio = vec![0x49, 0x44, 0x33, 0x04, 0x00];
    let (base, server) = serve_once("200 OK", "audio/mpeg", audio.clone()).await;

    let payload = client(base).synthesize("Hello there.").await.unwrap();
    assert_eq!(payload.bytes.as_ref(), audio.as_slice());
    assert_eq!(payload.content_type.as_deref(), Some("audio/mpeg"));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /text-to-speech/ "));
    assert!(raw.contains("\"text\":\"Hello there.\""));
}

#[tokio::test]
async fn test_speech_empty_body_is_error() {
    let (base, _server) = serve_once("200 OK", "audio/mpeg", Vec::new()).await;
    let err = client(base).synthesize("Hello.").await.unwrap_err();
    assert_eq!(err, SynthesisError::EmptyPayload);
}

#[tokio::test]
async fn test_speech_status_error() {
    let (base, _server) = serve_once("503 Service Unavailable", "text/plain", Vec::new()).await;
    let err = client(base).synthesize("Hello.").await.unwrap_err();
    assert_eq!(err, SynthesisError::Status { status: 503 });
}

// ── Story store ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_story() {
    let body = br#"{"story_id":"abc","theme":"a fox","content":"The fox ran.","improvisations":["rain"],"remaining_improvs":2}"#;
    let (base, server) = serve_once("200 OK", "application/json", body.to_vec()).await;

    let story = client(base).fetch_story("abc").await.unwrap();
    assert_eq!(story.story_id, "abc");
    assert_eq!(story.content, "The fox ran.");
    assert_eq!(story.improvisations, vec!["rain".to_string()]);
    assert_eq!(story.remaining_improvisations, 2);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /get-story/?story_id=abc "));
}

#[tokio::test]
async fn test_fetch_story_not_found() {
    let (base, _server) = serve_once("404 Not Found", "application/json", b"{}".to_vec()).await;
    let err = client(base).fetch_story("missing").await.unwrap_err();
    assert_eq!(err, StoreError::NotFound("missing".to_string()));
}

#[tokio::test]
async fn test_fetch_story_malformed_payload() {
    let (base, _server) = serve_once("200 OK", "application/json", b"[1,2,3]".to_vec()).await;
    let err = client(base).fetch_story("abc").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)));
}
