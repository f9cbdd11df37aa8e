//! Client for the review backend.
//!
//! # Responsibilities
//! - Submit form text for review and decode the verdict
//! - List models the backend offers
//! - Submit final reports and read them back
//! - Retry transient review failures with jittered backoff

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ReviewConfig;
use crate::observability::metrics;
use crate::resilience::{is_retryable, Backoff};
use crate::review::prompt::check_prompt;
use crate::review::verdict::Verdict;
use crate::storage::{ReportRecord, ReportSubmission};

/// Errors returned by [`ReviewClient`].
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("request to review backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("review backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed reply: {0}")]
    MalformedVerdict(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SubmitReply {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TimestampsReply {
    timestamps: Vec<String>,
}

/// Body of `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub msg: &'a str,
}

/// HTTP client for the review backend.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    client: Client,
    endpoint: String,
    model: String,
    backoff: Backoff,
    max_attempts: u32,
}

impl ReviewClient {
    pub fn new(config: &ReviewConfig) -> Result<Self, ReviewError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            backoff: Backoff::from_config(config),
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Use a different model for subsequent reviews.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Names of the models the backend offers.
    pub async fn models(&self) -> Result<Vec<String>, ReviewError> {
        let res = self
            .client
            .get(format!("{}/fetchModels", self.endpoint))
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Store a final report; returns the backend's confirmation.
    pub async fn submit_report(&self, report: &ReportSubmission) -> Result<String, ReviewError> {
        let res = self
            .client
            .post(format!("{}/api/submit-final-report", self.endpoint))
            .json(report)
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        let reply: SubmitReply = serde_json::from_str(&body)?;
        Ok(reply.message)
    }

    /// Latest report of every recording.
    pub async fn reports(&self) -> Result<Vec<ReportRecord>, ReviewError> {
        let res = self
            .client
            .get(format!("{}/api/reports", self.endpoint))
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Submission times of one recording, newest first.
    pub async fn report_timestamps(&self, object_name: &str) -> Result<Vec<String>, ReviewError> {
        let res = self
            .client
            .get(format!("{}/api/get-timestamps", self.endpoint))
            .query(&[("object_name", object_name)])
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        let reply: TimestampsReply = serde_json::from_str(&body)?;
        Ok(reply.timestamps)
    }

    /// One past submission; a missing record is a 404 `Status` error.
    pub async fn report(&self, object_name: &str, timestamp: &str) -> Result<ReportRecord, ReviewError> {
        let res = self
            .client
            .get(format!("{}/api/get-report-details", self.endpoint))
            .query(&[("object_name", object_name), ("timestamp", timestamp)])
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Review a form with the standard rubric.
    pub async fn review(&self, form_text: &str) -> Result<Verdict, ReviewError> {
        self.review_with_prompt(&check_prompt(), form_text).await
    }

    /// Review with a caller-supplied prompt.
    pub async fn review_with_prompt(&self, prompt: &str, msg: &str) -> Result<Verdict, ReviewError> {
        let request = QueryRequest {
            model: &self.model,
            prompt,
            msg,
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let (status, err) = match self.send(&request).await {
                Ok(verdict) => {
                    metrics::record_review_attempt("success");
                    return Ok(verdict);
                }
                Err(ReviewError::Transport(e)) => (e.status(), ReviewError::Transport(e)),
                Err(ReviewError::Status { status, body }) => {
                    (Some(status), ReviewError::Status { status, body })
                }
                Err(e) => {
                    metrics::record_review_attempt("failed");
                    return Err(e);
                }
            };

            let transport = matches!(err, ReviewError::Transport(_));
            if attempts < self.max_attempts && is_retryable(status, transport) {
                let delay = self.backoff.delay(attempts);
                metrics::record_review_attempt("retry");
                tracing::info!(attempt = attempts, delay = ?delay, error = %err, "Retrying review");
                tokio::time::sleep(delay).await;
                continue;
            }

            metrics::record_review_attempt("failed");
            tracing::warn!(attempts, error = %err, "Review failed");
            return Err(err);
        }
    }

    async fn send(&self, request: &QueryRequest<'_>) -> Result<Verdict, ReviewError> {
        let res = self
            .client
            .post(format!("{}/query", self.endpoint))
            .json(request)
            .send()
            .await?;
        let body = Self::success_body(res).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn success_body(res: reqwest::Response) -> Result<String, ReviewError> {
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ReviewError::Status { status, body });
        }
        Ok(body)
    }
}
