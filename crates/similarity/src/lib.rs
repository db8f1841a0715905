//! Text similarity backends for semantic matching.
//!
//! Provides the `SimilarityBackend` trait, the deterministic token-overlap
//! implementation used by default and in tests, and an HTTP embedding-service
//! implementation. This keeps the scoring core independent of any particular
//! embedding model.

use serde::{Deserialize, Serialize};
use std::future::Future;
use talentmatch_features::token_overlap_similarity;
use thiserror::Error;

/// Errors from similarity backend operations.
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Client setup failed: {0}")]
    Client(String),

    #[error("Backend not available")]
    Unavailable,
}

/// Trait for text similarity backends (token overlap, embedding services, etc.)
///
/// Scores are in `[0, 1]`; callers clamp anything outside that range.
pub trait SimilarityBackend {
    /// Similarity between two texts.
    fn similarity(
        &self,
        text_a: &str,
        text_b: &str,
    ) -> impl Future<Output = Result<f32, SimilarityError>> + Send;

    /// Check if the backend is healthy.
    fn health_check(&self) -> impl Future<Output = Result<(), SimilarityError>> + Send;

    /// Get the backend name for logging.
    fn name(&self) -> &'static str;

    /// Whether identical inputs always produce identical scores.
    fn is_deterministic(&self) -> bool {
        true
    }
}

/// Deterministic term-frequency cosine over normalized tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlapBackend;

impl SimilarityBackend for TokenOverlapBackend {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, SimilarityError> {
        Ok(token_overlap_similarity(text_a, text_b))
    }

    async fn health_check(&self) -> Result<(), SimilarityError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "token-overlap"
    }
}

/// Embedding service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings API
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "text-embedding".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Similarity via cosine of embeddings fetched from an HTTP service.
pub struct EmbeddingBackend {
    config: EmbeddingConfig,
    client: reqwest::Client,
}

impl EmbeddingBackend {
    /// Create a new embedding backend.
    pub fn new(config: EmbeddingConfig) -> Result<Self, SimilarityError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimilarityError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build the embeddings request body for a pair of texts.
    fn build_request(&self, text_a: &str, text_b: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "input": [text_a, text_b],
        })
    }

    /// Parse an embeddings response into the two vectors, in input order.
    fn parse_response(
        &self,
        response: serde_json::Value,
    ) -> Result<(Vec<f32>, Vec<f32>), SimilarityError> {
        let data = response
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| SimilarityError::ParseError("Missing data array".to_string()))?;

        let mut vectors: Vec<(u64, Vec<f32>)> = Vec::with_capacity(data.len());

        for (position, item) in data.iter().enumerate() {
            let embedding = item
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| SimilarityError::ParseError("Missing embedding".to_string()))?;

            let index = item
                .get("index")
                .and_then(|i| i.as_u64())
                .unwrap_or(position as u64);

            let values = embedding
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or_else(|| {
                    SimilarityError::ParseError("Non-numeric embedding value".to_string())
                })?;

            vectors.push((index, values));
        }

        if vectors.len() != 2 {
            return Err(SimilarityError::ParseError(format!(
                "Expected 2 embeddings, got {}",
                vectors.len()
            )));
        }

        vectors.sort_by_key(|(index, _)| *index);
        let second = vectors.pop().map(|(_, v)| v).unwrap_or_default();
        let first = vectors.pop().map(|(_, v)| v).unwrap_or_default();

        Ok((first, second))
    }
}

impl SimilarityBackend for EmbeddingBackend {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, SimilarityError> {
        let body = self.build_request(text_a, text_b);

        tracing::debug!(model = %self.config.model, "Requesting embeddings");

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SimilarityError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SimilarityError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SimilarityError::ParseError(e.to_string()))?;

        let (a, b) = self.parse_response(json)?;
        Ok(cosine_similarity(&a, &b))
    }

    async fn health_check(&self) -> Result<(), SimilarityError> {
        let response = self
            .client
            .get(format!("{}/health", self.config.base_url))
            .send()
            .await
            .map_err(|e| SimilarityError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SimilarityError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "embedding"
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}

/// Cosine similarity clamped to `[0, 1]`; opposed vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> EmbeddingBackend {
        EmbeddingBackend::new(EmbeddingConfig::default()).unwrap()
    }

    #[test]
    fn test_build_request() {
        let body = backend().build_request("rust engineer", "python developer");
        assert_eq!(body["model"], "text-embedding");
        assert_eq!(body["input"][0], "rust engineer");
        assert_eq!(body["input"][1], "python developer");
    }

    #[test]
    fn test_parse_response_orders_by_index() {
        let response = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let (a, b) = backend().parse_response(response).unwrap();
        assert_eq!(a, vec![1.0, 0.0]);
        assert_eq!(b, vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_response_errors() {
        let missing = serde_json::json!({ "result": [] });
        assert!(matches!(
            backend().parse_response(missing),
            Err(SimilarityError::ParseError(_))
        ));

        let single = serde_json::json!({ "data": [{ "embedding": [1.0] }] });
        assert!(matches!(
            backend().parse_response(single),
            Err(SimilarityError::ParseError(_))
        ));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_token_overlap_backend() {
        let backend = TokenOverlapBackend;
        let sim = backend
            .similarity("react node developer", "React and Node developer")
            .await
            .unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
        assert!(backend.is_deterministic());
        assert!(!self::backend().is_deterministic());
        assert!(backend.health_check().await.is_ok());
    }
}
