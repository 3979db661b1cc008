//! Reqwest-backed webhook adapters for the camera and analyzer.
//!
//! Both adapters own transport details only: JSON request encoding, the
//! request timeout, HTTP status mapping and response decoding. The shared
//! plumbing below reports failures as [`WebhookFailure`], which each adapter
//! converts into its port error.

mod analyzer;
mod camera;
mod dto;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use analyzer::AnalyzerWebhook;
pub use camera::CameraWebhook;

/// Errors raised while building a webhook adapter.
#[derive(Debug, thiserror::Error)]
pub enum WebhookSetupError {
    /// The HTTP client could not be constructed.
    #[error("failed to build webhook client: {0}")]
    Client(#[from] reqwest::Error),
    /// The configured URL does not yield a usable endpoint.
    #[error("invalid webhook endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Transport-level outcome of a failed webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WebhookFailure {
    Transport(String),
    Timeout(String),
    Status { status: u16, message: String },
    Decode(String),
}

/// POSTs `body` as JSON and decodes a JSON reply.
async fn post_json<B, R>(client: &Client, endpoint: &Url, body: &B) -> Result<R, WebhookFailure>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(endpoint.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .json(body)
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, bytes.as_ref()));
    }

    serde_json::from_slice(bytes.as_ref())
        .map_err(|error| WebhookFailure::Decode(format!("invalid JSON payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> WebhookFailure {
    if error.is_timeout() {
        WebhookFailure::Timeout(error.to_string())
    } else {
        WebhookFailure::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WebhookFailure {
    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return WebhookFailure::Timeout(format!("status {}", status.as_u16()));
    }
    WebhookFailure::Status {
        status: status.as_u16(),
        message: body_preview(body),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Resolves `segment` beneath `base`, keeping any path `base` already has.
fn endpoint_under(base: &Url, segment: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(segment)
}

#[cfg(test)]
pub(crate) mod test_server {
    //! One-shot HTTP responder for exercising the adapters end to end.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use reqwest::Url;

    /// Serves one request with `status_line` and `body`, yielding the raw
    /// request text once the exchange completes.
    pub(crate) async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            request
        });
        let url = Url::parse(&format!("http://{addr}/")).expect("url");
        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.expect("read");
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(chunk.get(..read).expect("chunk slice"));
            let text = String::from_utf8_lossy(&buffer);
            if let Some((head, rest)) = text.split_once("\r\n\r\n") {
                let expected = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if rest.len() >= expected {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
