//! Performance persistence client

use crate::error::{SessionError, SessionResult};
use crate::evaluation::{EvaluationResult, PerformanceStore};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// Persistence API over HTTP
///
/// `PUT <base_url>/users/<subject_id>/performance` with the result as JSON.
pub struct HttpPerformanceStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPerformanceStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build persistence HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn performance_url(&self, subject_id: &str) -> String {
        format!("{}/users/{}/performance", self.base_url, subject_id)
    }
}

#[async_trait::async_trait]
impl PerformanceStore for HttpPerformanceStore {
    async fn update_performance(
        &self,
        subject_id: &str,
        result: &EvaluationResult,
    ) -> SessionResult<()> {
        let url = self.performance_url(subject_id);
        info!("Persisting evaluation to {}", url);

        self.http
            .put(&url)
            .json(result)
            .send()
            .await
            .map_err(|e| SessionError::Persistence(e.to_string()))?
            .error_for_status()
            .map_err(|e| SessionError::Persistence(e.to_string()))?;

        Ok(())
    }
}
