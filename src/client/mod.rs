pub mod response;
pub mod types;

use reqwest::{StatusCode, header::CONTENT_TYPE};

use std::error::Error as _;

use crate::config::GeminiConfig;

use types::GenerateContentRequest;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum RemoteCallError {
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(String),

    #[error("{status} from POST {endpoint}: {body}")]
    Status {
        status: StatusCode,
        endpoint: String,
        body: String,
    },
}

/// Flattens a reqwest error and its causes into one line, without the
/// request URL (it ends with the API key).
fn describe(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Sends the prompt to `generateContent` and returns the raw response body.
    pub async fn invoke(&self, prompt: &str) -> Result<String, RemoteCallError> {
        tracing::debug!("Prompt: {}", prompt);

        let body = serde_json::to_vec(&GenerateContentRequest::from_prompt(prompt))?;

        let response = self
            .client
            .post(format!("{}{}", self.api_url, self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RemoteCallError::Transport(describe(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteCallError::Transport(describe(e)))?;

        tracing::debug!("Gemini API response ({}): {}", status, text);

        if !status.is_success() {
            return Err(RemoteCallError::Status {
                status,
                endpoint: self.api_url.clone(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn config_for(base: &str, timeout: Option<Duration>) -> GeminiConfig {
        GeminiConfig {
            api_url: format!("{base}{MODEL_PATH}?key="),
            api_key: "test-key".to_string(),
            timeout,
        }
    }

    fn unreachable_base() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_prompt_with_key_appended() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(query_param("key", "test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "contents": [{"parts": [{"text": "the prompt"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server.uri(), None)).unwrap();
        let raw = client.invoke("the prompt").await.unwrap();
        assert_eq!(raw, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string("{\"error\":{\"message\":\"API key not valid\"}}"),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server.uri(), None)).unwrap();
        let err = client.invoke("prompt").await.unwrap_err();

        match &err {
            RemoteCallError::Status { status, body, .. } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("400 Bad Request from POST"));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let client = GeminiClient::new(&config_for(&unreachable_base(), None)).unwrap();
        let err = client.invoke("prompt").await.unwrap_err();

        assert!(matches!(err, RemoteCallError::Transport(_)));
        assert!(err.to_string().contains("error sending request"));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(
            &server.uri(),
            Some(Duration::from_millis(100)),
        ))
        .unwrap();
        let err = client.invoke("prompt").await.unwrap_err();

        assert!(matches!(err, RemoteCallError::Transport(_)));
    }

    #[tokio::test]
    async fn long_error_bodies_are_truncated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server.uri(), None)).unwrap();
        match client.invoke("prompt").await.unwrap_err() {
            RemoteCallError::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
