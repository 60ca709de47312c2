//! # cmsedit Client
//!
//! [`HttpContentApi`] posts one [`SaveRequest`] per document to the content
//! save endpoint. Any 2xx is a success; every other status and every
//! transport failure (including the request timeout) is reported as a
//! [`SaveError`] and never retried here.

use async_trait::async_trait;
use cmsedit_editor::{ContentApi, EditorConfig, SaveError, SaveRequest};
use reqwest::{Client, Url};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid save endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: Client,
    endpoint: Url,
}

impl HttpContentApi {
    /// Build a client for the configured endpoint and timeout
    pub fn new(config: &EditorConfig) -> Result<Self, ClientError> {
        let endpoint =
            Url::parse(&config.save_endpoint).map_err(|err| ClientError::InvalidEndpoint {
                endpoint: config.save_endpoint.clone(),
                reason: err.to_string(),
            })?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn save_document(&self, request: &SaveRequest) -> Result<(), SaveError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(
                    document = %request.document_id,
                    error = %err,
                    "save request failed"
                );
                SaveError::Transport(err.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(document = %request.document_id, %status, "document saved");
            Ok(())
        } else {
            tracing::warn!(document = %request.document_id, %status, "save rejected");
            Err(SaveError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_config() {
        let api = HttpContentApi::new(&EditorConfig::default()).unwrap();
        assert_eq!(api.endpoint().path(), "/api/admin/content/save");
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = EditorConfig {
            save_endpoint: "not a url".into(),
            ..EditorConfig::default()
        };
        assert!(matches!(
            HttpContentApi::new(&config),
            Err(ClientError::InvalidEndpoint { .. })
        ));
    }
}
