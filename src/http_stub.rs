//! One-shot HTTP server for client tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response on a local port.
///
/// Returns the base URL and a handle yielding the raw request, body included.
pub async fn serve_once(response: String) -> (String, JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let handle = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
      if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let body_len = head
          .lines()
          .find_map(|l| l.strip_prefix("content-length:"))
          .and_then(|v| v.trim().parse::<usize>().ok())
          .unwrap_or(0);
        if request.len() >= head_end + 4 + body_len {
          break;
        }
      }
      let n = socket.read(&mut buf).await.unwrap();
      if n == 0 {
        break;
      }
      request.extend_from_slice(&buf[..n]);
    }
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();
    String::from_utf8_lossy(&request).into_owned()
  });

  (format!("http://{}", addr), handle)
}

/// A complete response with a JSON body.
pub fn json_response(status: &str, body: &str) -> String {
  format!(
    concat!(
      "HTTP/1.1 {}\r\ncontent-type: application/json\r\n",
      "content-length: {}\r\nconnection: close\r\n\r\n{}"
    ),
    status,
    body.len(),
    body
  )
}
