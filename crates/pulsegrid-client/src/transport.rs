//! Transport boundary: carries one report to the registry and returns
//! success or a retry-eligible failure.
//!
//! The client only needs synchronous request/response semantics with a
//! distinguishable "OK" outcome; anything else is pluggable. The
//! reference implementation POSTs the JSON-encoded report over HTTP/1.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;
use thiserror::Error;
use tracing::debug;

use pulsegrid_state::BeatReport;

/// Boxed future returned by transport implementations.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures while submitting a report. All variants are treated alike by
/// the client's retry loop; no transient/permanent distinction is made.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode report: {0}")]
    Encode(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response code: {0}")]
    Status(u16),

    #[error("attempt timed out")]
    Timeout,
}

/// A point-to-point channel that can submit one report to the registry.
///
/// `Ok(())` means the registry acknowledged the report. Implementations
/// must be safe to call from concurrent tasks.
pub trait BeatTransport: Send + Sync {
    fn submit(&self, report: BeatReport) -> BoxFuture<TransportResult<()>>;
}

/// Reference transport: POST the report as JSON to
/// `http://{address}{path}` over a fresh HTTP/1 connection per attempt.
pub struct HttpBeatTransport {
    /// Registry address (host:port).
    address: String,
    /// Ingestion path, e.g. "/api/v1/beats".
    path: String,
}

impl HttpBeatTransport {
    pub fn new(address: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            path: path.into(),
        }
    }

    async fn post(address: String, path: String, report: BeatReport) -> TransportResult<()> {
        let body =
            serde_json::to_vec(&report).map_err(|e| TransportError::Encode(e.to_string()))?;
        let uri = format!("http://{address}{path}");

        let stream = tokio::net::TcpStream::connect(&address)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let request = http::Request::builder()
            .method("POST")
            .uri(&uri)
            .header("host", &address)
            .header("content-type", "application/json")
            .header("user-agent", "pulsegrid-client/0.1")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            debug!(status = %response.status(), %uri, "registry rejected beat");
            Err(TransportError::Status(response.status().as_u16()))
        }
    }
}

impl BeatTransport for HttpBeatTransport {
    fn submit(&self, report: BeatReport) -> BoxFuture<TransportResult<()>> {
        let address = self.address.clone();
        let path = self.path.clone();
        Box::pin(Self::post(address, path, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsegrid_state::Status;

    fn report() -> BeatReport {
        BeatReport {
            client_id: "worker-1".to_string(),
            status: Status::Ok,
            success_count: 1,
            error_count: 0,
            timestamp: 1_000,
            beat_delay: 500,
        }
    }

    #[tokio::test]
    async fn submit_to_closed_port_is_connect_error() {
        // Port 1 won't be listening.
        let transport = HttpBeatTransport::new("127.0.0.1:1", "/api/v1/beats");
        let result = transport.submit(report()).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
