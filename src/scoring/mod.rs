//! Chat-completions scoring client
//!
//! Sends the evaluation document to an OpenAI-compatible chat endpoint
//! with an instruction to answer with a bare JSON score object.

use crate::error::{SessionError, SessionResult};
use crate::evaluation::{EvaluationResult, Scorer};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const SYSTEM_PROMPT: &str = "You are an interview evaluator. Read the interview transcript \
and rate the candidate. Respond with a JSON object only, no prose, with exactly these fields: \
clarity, problemSolving, communication, confidence, technical (each an integer from 1 to 10) \
and overallFeedback (a short paragraph of feedback for the candidate).";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Scoring service over HTTP
pub struct HttpScorer {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpScorer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build scoring HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl Scorer for HttpScorer {
    async fn evaluate(&self, document: &str) -> SessionResult<EvaluationResult> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: document,
                },
            ],
            temperature: 0.2,
        };

        info!("Requesting evaluation from {}", self.endpoint);

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SessionError::Scoring(e.to_string()))?
            .error_for_status()
            .map_err(|e| SessionError::Scoring(e.to_string()))?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SessionError::MalformedEvaluation(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                SessionError::MalformedEvaluation("reply has no message content".to_string())
            })?;

        debug!("Scoring reply: {}", content);

        EvaluationResult::parse(&content)
    }
}
