//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock backend that returns a fixed response body.
/// Binds an ephemeral port and returns the address.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_slow_backend(response, Duration::ZERO).await
}

/// Start a mock backend that waits before responding, to hold connections
/// open for least-connections tests.
pub async fn start_slow_backend(response: &'static str, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        if delay > Duration::ZERO {
                            tokio::time::sleep(delay).await;
                        }
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that responds with the value of the named request
/// header (or "missing") as the body.
#[allow(dead_code)]
pub async fn start_header_echo_backend(header: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();

                        let wanted = format!("{}:", header.to_lowercase());
                        let value = head
                            .lines()
                            .find(|line| line.to_lowercase().starts_with(&wanted))
                            .and_then(|line| line.splitn(2, ':').nth(1))
                            .map(|v| v.trim().to_string())
                            .unwrap_or_else(|| "missing".to_string());

                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            value.len(),
                            value
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
