//! Remote Documentation Endpoint
//!
//! Posts the request body to a route that already speaks the event-record
//! protocol and hands its body back as a byte stream.

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{ByteStream, GenerationRequest, GenerationService, ServiceConfig};
use crate::types::{DocError, Result};

pub struct HttpGenerationService {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpGenerationService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            DocError::Config(format!("Invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream> {
        info!(
            "Requesting {} documentation from {} (model: {})",
            request.mode, self.endpoint, request.model
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| DocError::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Endpoint error body: {}", body);
            return Err(DocError::request_failed(
                status.as_u16(),
                format!("endpoint returned {}", status),
            ));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(DocError::from))
            .boxed())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let config = ServiceConfig {
            provider: "http".into(),
            endpoint: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            HttpGenerationService::new(&config),
            Err(DocError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_parsed() {
        let service = HttpGenerationService::new(&ServiceConfig::default()).unwrap();
        assert_eq!(service.endpoint().path(), "/api/openai");
        assert_eq!(service.name(), "http");
    }
}
