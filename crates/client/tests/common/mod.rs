//! Minimal in-process servers for exercising the transport clients.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A JSON bulk action record with the given identity and status.
pub fn action_json(id: i64, action_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "actionId": action_id,
        "totalRecords": 10,
        "isScheduled": false,
        "scheduledTime": null,
        "createdAt": "2024-05-01T10:00:00Z",
        "actionType": "update",
        "status": status,
        "entity": "contact",
        "skippedCount": null,
        "failedCount": null,
        "successCount": null,
        "completedAt": null
    })
}

/// Read an HTTP request head and return its request line.
async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    let head = String::from_utf8_lossy(&received);
    head.lines().next().unwrap_or_default().to_string()
}

/// Serve exactly one HTTP response, then close.
///
/// Returns the base URL and a receiver yielding the request line
/// (e.g. `GET /bulk-action HTTP/1.1`).
pub async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: String,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request_line = read_request_line(&mut socket).await;
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}"), rx)
}

/// Serve one `text/event-stream` response, writing each chunk with a
/// short pause so the client sees them as separate reads, then close.
pub async fn serve_event_stream(chunks: Vec<&'static str>) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request_line = read_request_line(&mut socket).await;
        let _ = tx.send(request_line);

        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";
        socket.write_all(head.as_bytes()).await.expect("write head");
        for chunk in chunks {
            socket.write_all(chunk.as_bytes()).await.expect("write chunk");
            socket.flush().await.expect("flush");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}"), rx)
}
