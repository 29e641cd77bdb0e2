//! HTTP triage gateway
//!
//! Starts a run with `POST {base_url}{stream_path}` and reads the response
//! body as a server-sent event stream.

use crate::config::FileServerConfig;
use crate::sse::SseFrameSource;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info};
use triage_application::ports::frame_source::FrameSource;
use triage_application::ports::triage_gateway::{GatewayError, RunRequest, TriageGateway};

/// Gateway to the triage pipeline over HTTP
pub struct HttpTriageGateway {
    client: reqwest::Client,
    stream_url: String,
}

impl HttpTriageGateway {
    /// Build a client for the configured backend.
    ///
    /// Only connecting is bounded by a timeout; a run's stream stays open as
    /// long as the pipeline keeps it open.
    pub fn new(config: &FileServerConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("HttpTriageGateway initialized for {}", config.stream_url());

        Ok(Self {
            client,
            stream_url: config.stream_url(),
        })
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }
}

fn classify(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else if error.is_builder() {
        GatewayError::InvalidRequest(error.to_string())
    } else {
        GatewayError::Other(error.to_string())
    }
}

#[async_trait]
impl TriageGateway for HttpTriageGateway {
    async fn open_stream(&self, request: &RunRequest) -> Result<Box<dyn FrameSource>, GatewayError> {
        debug!(
            "POST {} (session {}, user {})",
            self.stream_url, request.session_id, request.user_id
        );

        let response = self
            .client
            .post(&self.stream_url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE)
            && !content_type
                .to_str()
                .is_ok_and(|ct| ct.starts_with("text/event-stream"))
        {
            debug!("Unexpected content type for event stream: {:?}", content_type);
        }

        Ok(Box::new(SseFrameSource::new(Box::pin(response.bytes_stream()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use triage_domain::{CaseInput, EventType, SessionId};

    /// One-shot HTTP server: answers the first request with `response` and
    /// hands back the request body.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length: usize = text[..end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse().unwrap())
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break buf[end + 4..end + 4 + length].to_vec();
                    }
                }
                assert!(n > 0, "client closed before sending the body");
            };
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            serde_json::from_slice(&body).unwrap()
        });

        (base_url, handle)
    }

    fn gateway(base_url: String) -> HttpTriageGateway {
        HttpTriageGateway::new(&FileServerConfig {
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    fn request() -> RunRequest {
        let case: CaseInput = serde_json::from_value(json!({
            "patient_id": "PT-TEST-002", "name": "Ravi Kumar", "age": 55, "gender": "Male",
            "symptoms": ["chest_pain"], "bp_systolic": 160, "bp_diastolic": 100,
            "heart_rate": 105, "temperature": 98.6, "spo2": 96, "conditions": []
        }))
        .unwrap();
        RunRequest::new("debug_user", SessionId::new("debug_session").unwrap(), case)
    }

    #[tokio::test]
    async fn streams_frames_from_response_body() {
        let (base_url, server) = serve_once(concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/event-stream\r\n",
            "Connection: close\r\n",
            "\r\n",
            "event: status\ndata: {\"phase\": \"init\"}\n\n",
            "event: complete\ndata: {}\n\n",
        ))
        .await;

        let mut source = gateway(base_url).open_stream(&request()).await.unwrap();
        let first = source.next_frame().await.unwrap().unwrap();
        let second = source.next_frame().await.unwrap().unwrap();

        assert_eq!(first.event_type(), &EventType::Status);
        assert_eq!(second.event_type(), &EventType::Complete);
        assert!(source.next_frame().await.is_none());

        let body = server.await.unwrap();
        assert_eq!(body["user_id"], "debug_user");
        assert_eq!(body["session_id"], "debug_session");
        assert_eq!(body["patient_data"]["bp_systolic"], 160);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (base_url, _server) = serve_once(concat!(
            "HTTP/1.1 500 Internal Server Error\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Length: 15\r\n",
            "Connection: close\r\n",
            "\r\n",
            "pipeline failed",
        ))
        .await;

        let result = gateway(base_url).open_stream(&request()).await;
        match result {
            Err(GatewayError::Rejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "pipeline failed");
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn stream_url_comes_from_config() {
        let gateway = gateway("http://localhost:8000/".to_string());
        assert_eq!(gateway.stream_url(), "http://localhost:8000/run/stream");
    }
}
