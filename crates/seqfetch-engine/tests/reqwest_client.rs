//! `ReqwestClient` against a minimal HTTP/1.1 server on localhost.

#![cfg(feature = "reqwest")]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use seqfetch_engine::{Engine, EngineOptions, HttpClient, MemoryStore, ReqwestClient};

/// Serves `/seq/{i}.bin` for `i < len`, 404 beyond, and 500 for `/broken`.
/// Requests carrying `x-token: secret` are echoed back as the body of
/// `/headers`.
async fn serve(len: u64) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap();
                    if n == 0 {
                        return;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = if path == "/broken" {
                    ("500 Internal Server Error", String::new())
                } else if path == "/headers" {
                    let token = request
                        .lines()
                        .map(str::to_ascii_lowercase)
                        .find_map(|l| l.strip_prefix("x-token: ").map(str::to_string))
                        .unwrap_or_default();
                    ("200 OK", token)
                } else {
                    let index = path
                        .strip_prefix("/seq/")
                        .and_then(|p| p.strip_suffix(".bin"))
                        .and_then(|p| p.parse::<u64>().ok());
                    match index {
                        Some(i) if i < len => ("200 OK", format!("<{i}>")),
                        _ => ("404 Not Found", String::new()),
                    }
                };

                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_status_and_body() {
    let addr = serve(3).await;
    let client = ReqwestClient::new().unwrap();

    let found = client.get(&format!("http://{addr}/seq/2.bin"), &[]).await.unwrap();
    assert_eq!(found.status, 200);
    assert_eq!(found.body.as_ref(), b"<2>");

    let missing = client.get(&format!("http://{addr}/seq/3.bin"), &[]).await.unwrap();
    assert_eq!(missing.status, 404);
    assert!(missing.body.is_empty());

    let broken = client.get(&format!("http://{addr}/broken"), &[]).await.unwrap();
    assert_eq!(broken.status, 500);
}

#[tokio::test]
async fn test_headers_are_sent() {
    let addr = serve(0).await;
    let client = ReqwestClient::new().unwrap();
    let headers = [("X-Token".to_string(), "secret".to_string())];

    let response = client.get(&format!("http://{addr}/headers"), &headers).await.unwrap();
    assert_eq!(response.body.as_ref(), b"secret");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ReqwestClient::new().unwrap();
    assert!(client.get(&format!("http://{addr}/seq/0.bin"), &[]).await.is_err());
}

#[tokio::test]
async fn test_engine_over_http() {
    let addr = serve(37).await;
    let options = EngineOptions::default().initial_step(8);
    let engine = Engine::new(ReqwestClient::new().unwrap(), options);
    let store = Arc::new(MemoryStore::new());

    let count = engine
        .run(Arc::clone(&store), &format!("http://{addr}/seq/"), "%d.bin", ())
        .await
        .unwrap();
    assert_eq!(count, 37);

    let expected: String = (0..37).map(|i| format!("<{i}>")).collect();
    assert_eq!(store.assemble(count).unwrap(), expected.into_bytes());
}
