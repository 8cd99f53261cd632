// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external embedding service.
//!
//! Provides [`HttpEmbedder`] which handles request construction,
//! authentication, bounded timeouts, and transient error retry. The
//! endpoint follows the OpenAI-compatible `/v1/embeddings` shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use formfact_config::model::EmbeddingConfig;
use formfact_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use formfact_core::{EmbeddingAdapter, FormfactError, PluginAdapter};

use crate::types::{ApiErrorResponse, EmbeddingsRequest, EmbeddingsResponse};

/// HTTP client for embedding-service communication.
///
/// Manages authentication headers, connection pooling, and retry logic for
/// transient errors (429, 500, 503). Every request observes the configured
/// bounded timeout; callers treat timeout and transport failures as the
/// embedding capability being unavailable, never as fatal.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
    max_retries: u32,
}

impl HttpEmbedder {
    /// Creates a new embedding client from configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, FormfactError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| FormfactError::Config(format!("invalid API key header value: {e}")))?;
            headers.insert("authorization", value);
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FormfactError::Embedding {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            timeout,
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn request_embeddings(
        &self,
        texts: &[String],
    ) -> Result<EmbeddingsResponse, FormfactError> {
        let request = EmbeddingsRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying embeddings request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = match self.client.post(&self.base_url).json(&request).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(FormfactError::Timeout {
                        duration: self.timeout,
                    });
                }
                Err(e) => {
                    return Err(FormfactError::Embedding {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, "embeddings response received");

            if status.is_success() {
                return response
                    .json::<EmbeddingsResponse>()
                    .await
                    .map_err(|e| FormfactError::Embedding {
                        message: format!("malformed embeddings response: {e}"),
                        source: Some(Box::new(e)),
                    });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(FormfactError::Embedding {
                    message: format!("service returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("service returned {status}: {}", api_err.error.message),
                Err(_) => format!("service returned {status}: {body}"),
            };
            return Err(FormfactError::Embedding {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| FormfactError::Embedding {
            message: "embeddings request failed".to_string(),
            source: None,
        }))
    }
}

/// Transient statuses worth one retry.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

/// L2-normalize a vector in place so cosine similarity is a dot product.
///
/// Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpEmbedder {
    fn name(&self) -> &str {
        "http-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FormfactError> {
        match self.request_embeddings(&["ping".to_string()]).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), FormfactError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HttpEmbedder {
    /// Generates one L2-normalized vector per input text, in input order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, FormfactError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: vec![],
                dimensions: self.dimensions,
            });
        }

        let response = self.request_embeddings(&input.texts).await?;

        if response.data.len() != input.texts.len() {
            return Err(FormfactError::Embedding {
                message: format!(
                    "expected {} embeddings, got {}",
                    input.texts.len(),
                    response.data.len()
                ),
                source: None,
            });
        }

        let mut data = response.data;
        data.sort_by_key(|obj| obj.index);

        let mut embeddings = Vec::with_capacity(data.len());
        for obj in data {
            if obj.embedding.len() != self.dimensions {
                return Err(FormfactError::Embedding {
                    message: format!(
                        "expected {}-dim vectors, got {}",
                        self.dimensions,
                        obj.embedding.len()
                    ),
                    source: None,
                });
            }
            let mut vector = obj.embedding;
            l2_normalize(&mut vector);
            embeddings.push(vector);
        }

        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}
