//! HTTP provider against a local one-shot responder

use sectionseo::config::{EndpointConfig, GenerationSettings};
use sectionseo::error::GenerationError;
use sectionseo::provider::{
    parse_response, GenerationProvider, GenerationRequest, GlobalParameters, HttpGenerationProvider,
    SectionContext,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accept one connection, capture the raw request, answer with `status` and `body`.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/seo/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(head_end) = find_head_end(&raw) {
                let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).to_string()
    });

    (url, handle)
}

fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn endpoint(url: String) -> EndpointConfig {
    EndpointConfig {
        url,
        connect_timeout_secs: 5,
        request_timeout_secs: 5,
    }
}

fn request() -> GenerationRequest {
    let settings = GenerationSettings {
        api_key: "secret".to_string(),
        company_name: "Lampshop".to_string(),
        ..GenerationSettings::default()
    };
    GenerationRequest {
        data1: GlobalParameters::from(&settings),
        data2: vec![SectionContext::new(12, "Desk", &["Lamps".to_string(), "Lighting".to_string()])],
    }
}

#[tokio::test]
async fn posts_json_and_returns_body() {
    let (url, server) = respond_once("200 OK", r#"[{"id":12,"h1":"Desk lamps"}]"#).await;
    let provider = HttpGenerationProvider::new(&endpoint(url.clone())).unwrap();
    assert_eq!(provider.endpoint(), url);

    let body = provider.submit(&request()).await.unwrap();
    assert_eq!(parse_response(&body).unwrap().len(), 1);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /seo/ HTTP/1.1"));
    assert!(raw.to_lowercase().contains("content-type: application/json"));
    let head_end = raw.find("\r\n\r\n").unwrap();
    let sent: serde_json::Value = serde_json::from_str(&raw[head_end + 4..]).unwrap();
    assert_eq!(sent["data1"]["COMPANY_NAME"], "Lampshop");
    assert_eq!(sent["data2"][0]["category_id"], 12);
    assert_eq!(sent["data2"][0]["parent_category_2"], "Lighting");
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let (url, server) = respond_once("502 Bad Gateway", r#"{"error":"upstream"}"#).await;
    let provider = HttpGenerationProvider::new(&endpoint(url)).unwrap();

    let err = provider.submit(&request()).await.unwrap_err();
    match err {
        GenerationError::Transport(message) => assert!(message.contains("502")),
        other => panic!("expected transport error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/seo/", listener.local_addr().unwrap());
    drop(listener);

    let provider = HttpGenerationProvider::new(&endpoint(url)).unwrap();
    assert!(matches!(
        provider.submit(&request()).await,
        Err(GenerationError::Transport(_))
    ));
}
