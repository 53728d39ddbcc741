//! HTTP Embedding Provider
//!
//! Implements the `EmbeddingProvider` port against the embedding service's
//! fixed contract: `POST /` with `{"texts": [...]}` returns
//! `{"vectors": [[...]]}`, and `GET /` answers 200 once the model is loaded.
//!
//! One `embed` call is split into requests bounded by text count and payload
//! bytes, pipelined with bounded concurrency. Batches succeed or fail
//! atomically: any request failure fails the whole call so the caller never
//! persists partial chunk sets.

use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use cortex_domain::constants::{
    EMBEDDING_BATCH_MAX_BYTES, EMBEDDING_BATCH_MAX_TEXTS, EMBEDDING_MAX_CONCURRENCY,
};
use cortex_domain::error::{Error, Result};
use cortex_domain::ports::providers::EmbeddingProvider;

use crate::constants::{
    CONTENT_TYPE_JSON, EMBEDDING_READY_POLL_MS, EMBEDDING_REQUEST_TIMEOUT_SECS,
    ERROR_MSG_REQUEST_TIMEOUT,
};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    vectors: Vec<Vec<f32>>,
}

/// Embedding provider backed by the model server's HTTP endpoint
pub struct HttpEmbeddingProvider {
    base_url: String,
    dimension: usize,
    max_batch_texts: usize,
    max_batch_bytes: usize,
    max_concurrency: usize,
    timeout: Duration,
    http_client: Client,
}

impl HttpEmbeddingProvider {
    /// Create a provider for the service at `base_url` producing vectors of
    /// `dimension` length
    pub fn new(base_url: String, dimension: usize, http_client: Client) -> Self {
        Self {
            base_url,
            dimension,
            max_batch_texts: EMBEDDING_BATCH_MAX_TEXTS,
            max_batch_bytes: EMBEDDING_BATCH_MAX_BYTES,
            max_concurrency: EMBEDDING_MAX_CONCURRENCY,
            timeout: Duration::from_secs(EMBEDDING_REQUEST_TIMEOUT_SECS),
            http_client,
        }
    }

    /// Override the batching bounds
    pub fn with_batch_limits(mut self, max_texts: usize, max_bytes: usize) -> Self {
        self.max_batch_texts = max_texts.max(1);
        self.max_batch_bytes = max_bytes.max(1);
        self
    }

    /// Override the number of in-flight requests
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Greedy split bounded by text count and total payload bytes. An
    /// oversized single text still travels alone rather than being dropped.
    fn batches<'a>(&self, texts: &'a [String]) -> Vec<&'a [String]> {
        let mut batches = Vec::new();
        let mut start = 0;
        let mut bytes = 0usize;
        for (i, text) in texts.iter().enumerate() {
            let len = text.len();
            let count = i - start;
            if count > 0 && (count >= self.max_batch_texts || bytes + len > self.max_batch_bytes) {
                batches.push(&texts[start..i]);
                start = i;
                bytes = 0;
            }
            bytes += len;
        }
        if start < texts.len() {
            batches.push(&texts[start..]);
        }
        batches
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .http_client
            .post(self.base_url.trim_end_matches('/'))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .timeout(self.timeout)
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::embedding(format!("{ERROR_MSG_REQUEST_TIMEOUT} {:?}", self.timeout))
                } else {
                    Error::embedding(format!("HTTP request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "embedding service returned {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("invalid embedding response: {e}")))?;

        if parsed.vectors.len() != texts.len() {
            return Err(Error::embedding(format!(
                "embedding service returned {} vectors for {} texts",
                parsed.vectors.len(),
                texts.len()
            )));
        }
        for vector in &parsed.vectors {
            if vector.len() != self.dimension {
                return Err(Error::embedding(format!(
                    "embedding has dimension {}, expected {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }
        Ok(parsed.vectors)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // `buffered` preserves batch order, so the flattened output lines up
        // with the input texts
        let futures: Vec<_> = self
            .batches(texts)
            .into_iter()
            .map(|batch| self.embed_batch(batch))
            .collect();
        let vectors: Vec<Vec<Vec<f32>>> = stream::iter(futures)
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        Ok(vectors.into_iter().flatten().collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let ready = self
                .http_client
                .get(&self.base_url)
                .timeout(Duration::from_millis(EMBEDDING_READY_POLL_MS * 4))
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::embedding(format!(
                    "embedding service at {} not ready after {:?}",
                    self.base_url, timeout
                )));
            }
            tokio::time::sleep(Duration::from_millis(EMBEDDING_READY_POLL_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(max_texts: usize, max_bytes: usize) -> HttpEmbeddingProvider {
        HttpEmbeddingProvider::new("http://localhost:0".into(), 4, Client::new())
            .with_batch_limits(max_texts, max_bytes)
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_batches_by_count() {
        let p = provider(2, usize::MAX);
        let input = texts(&["a", "b", "c", "d", "e"]);
        let batches = p.batches(&input);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_batches_by_bytes() {
        let p = provider(100, 10);
        let input = texts(&["aaaa", "bbbb", "cccc"]);
        let batches = p.batches(&input);
        // 4 + 4 fits, the third pushes past 10 bytes
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn test_oversized_text_travels_alone() {
        let p = provider(100, 4);
        let input = texts(&["0123456789", "x"]);
        let batches = p.batches(&input);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn test_empty_input_has_no_batches() {
        let p = provider(8, 64);
        let input: Vec<String> = Vec::new();
        assert!(p.batches(&input).is_empty());
    }
}
