//! Inference backend trait and the reqwest-based HTTP implementation.
//!
//! A backend only moves bytes: it returns the raw status, content type and
//! body. Deciding whether that is an image, a loading notice or a failure is
//! left to [`super::classify`], so every backend shares one classifier.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::InferenceConfig;
use crate::credentials::Credential;
use crate::error::GenerationError;

/// Unclassified HTTP response from the inference API.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header, if present
    pub content_type: Option<String>,
    /// Full response body
    pub body: Vec<u8>,
}

/// Trait that all inference backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the fetcher holds a `Box<dyn InferenceBackend>`).
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Send one text-to-image request for `prompt` to `model`.
    async fn infer(
        &self,
        model: &str,
        prompt: &str,
        credential: &Credential,
    ) -> Result<RawResponse, GenerationError>;
}

#[derive(Serialize)]
struct InferenceBody<'a> {
    inputs: &'a str,
}

/// Hugging Face serverless inference over HTTPS.
pub struct HttpBackend {
    endpoint: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &InferenceConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GenerationError::Transport(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            client,
        })
    }

    /// Full URL for a model: `<endpoint>/<model>`.
    pub fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.endpoint, model.trim_start_matches('/'))
    }

    fn build_request(
        &self,
        model: &str,
        prompt: &str,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        self.client
            .post(self.model_url(model))
            .header(reqwest::header::AUTHORIZATION, credential.bearer())
            .header(reqwest::header::ACCEPT, "image/png, */*")
            .json(&InferenceBody { inputs: prompt })
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn infer(
        &self,
        model: &str,
        prompt: &str,
        credential: &Credential,
    ) -> Result<RawResponse, GenerationError> {
        let resp = self
            .build_request(model, prompt, credential)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.bytes().await.map_err(|e| self.map_send_error(e))?;

        tracing::debug!(
            "{model} -> HTTP {status}, {} bytes, content-type {:?}",
            body.len(),
            content_type
        );

        Ok(RawResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::classify::classify;
    use crate::types::AttemptResult;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn backend(endpoint: &str) -> HttpBackend {
        let config = InferenceConfig {
            endpoint: endpoint.to_string(),
            ..InferenceConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    /// Read one HTTP/1.1 request (headers plus `Content-Length` body).
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve exactly one canned response and hand back the request it received.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/models", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(&body).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });
        (endpoint, handle)
    }

    #[tokio::test]
    async fn test_infer_loading_response_round_trips_to_transient() {
        let body = br#"{"error":"Model org/model is currently loading","estimated_time":3.0}"#;
        let (endpoint, server) =
            serve_once("503 Service Unavailable", "application/json", body.to_vec()).await;
        let cred = Credential::new("hf_token").unwrap();

        let raw = backend(&endpoint)
            .infer("org/model", "a red kite", &cred)
            .await
            .unwrap();

        assert_eq!(raw.status, 503);
        assert_eq!(raw.content_type.as_deref(), Some("application/json"));
        assert_eq!(raw.body, body.to_vec());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /models/org/model HTTP/1.1"));
        assert!(request
            .to_lowercase()
            .contains("authorization: bearer hf_token"));
        assert!(request.ends_with(r#"{"inputs":"a red kite"}"#));

        match classify(raw) {
            AttemptResult::Transient {
                reason,
                estimated_time,
            } => {
                assert!(reason.contains("currently loading"));
                assert_eq!(estimated_time, Some(3.0));
            }
            other => panic!("expected transient, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_infer_returns_image_bytes() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        let (endpoint, server) = serve_once("200 OK", "image/png", png.clone()).await;
        let cred = Credential::new("hf_token").unwrap();

        let raw = backend(&endpoint)
            .infer("org/model", "fox", &cred)
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(raw.status, 200);
        assert_eq!(raw.content_type.as_deref(), Some("image/png"));
        assert_eq!(raw.body, png);
    }

    #[tokio::test]
    async fn test_infer_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/models", listener.local_addr().unwrap());
        drop(listener);
        let cred = Credential::new("hf_token").unwrap();

        let err = backend(&endpoint)
            .infer("org/model", "fox", &cred)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_infer_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/models", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });
        let config = InferenceConfig {
            endpoint,
            timeout_ms: 100,
            ..InferenceConfig::default()
        };
        let cred = Credential::new("hf_token").unwrap();

        let err = HttpBackend::new(&config)
            .unwrap()
            .infer("org/model", "fox", &cred)
            .await
            .unwrap_err();
        server.abort();

        assert!(
            matches!(err, GenerationError::Timeout { timeout_ms: 100 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_model_url_joins_single_slash() {
        let backend = backend("https://api-inference.huggingface.co/models/");
        assert_eq!(
            backend.model_url("stabilityai/stable-diffusion-2-1"),
            "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1"
        );
    }

    #[test]
    fn test_request_carries_bearer_json_and_prompt() {
        let backend = backend("https://example.test/models");
        let cred = Credential::new("hf_token").unwrap();
        let request = backend
            .build_request("org/model", "a lighthouse at dusk", &cred)
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://example.test/models/org/model");
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer hf_token"
        );
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({ "inputs": "a lighthouse at dusk" }));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(backend("https://example.test").name(), "huggingface");
    }
}
