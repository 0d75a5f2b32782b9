//! Preflight checks against throwaway local HTTP servers

use std::time::Duration;

use pmcheck_e2e::preflight::{require_webdriver, wait_for_app, webdriver_ready};
use pmcheck_e2e::E2eError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve every connection with the same canned response.
async fn serve(status: &str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// A local URL nothing listens on.
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_reachable_app_passes() {
    let url = serve("200 OK", "<html></html>").await;
    wait_for_app(&url, Duration::from_secs(5)).await.unwrap();
}

#[tokio::test]
async fn test_client_error_still_counts_as_up() {
    let url = serve("404 Not Found", "").await;
    wait_for_app(&url, Duration::from_secs(5)).await.unwrap();
}

#[tokio::test]
async fn test_unreachable_app_is_environment_error() {
    let url = closed_port().await;
    let err = wait_for_app(&url, Duration::from_millis(600)).await.unwrap_err();

    assert!(matches!(err, E2eError::Environment(_)));
    assert!(err.to_string().contains("did not respond"));
}

#[tokio::test]
async fn test_webdriver_status() {
    let ready = serve("200 OK", r#"{"value":{"ready":true,"message":"ok"}}"#).await;
    assert!(webdriver_ready(&ready).await);

    let busy = serve("200 OK", r#"{"value":{"ready":false,"message":"session in use"}}"#).await;
    assert!(!webdriver_ready(&busy).await);

    let down = closed_port().await;
    let err = require_webdriver(&down).await.unwrap_err();
    assert!(err.is_fatal());
}
