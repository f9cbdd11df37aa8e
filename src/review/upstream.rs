//! OpenAI-compatible chat completion client used by the backend.
//!
//! # Responsibilities
//! - Build chat completion requests (system prompt + user message)
//! - Decide on JSON response format
//! - Return the reply content, or relay streamed deltas as NDJSON lines
//!
//! # Design Decisions
//! - One shared `reqwest::Client` with the upstream timeout
//! - SSE frames are split on newlines across chunk boundaries
//! - API keys never reach logs

use futures_util::{stream, Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ModelConfig;

/// Errors talking to the upstream model API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("upstream reply has no content")]
    EmptyReply,

    #[error("upstream sent invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// JSON output is requested when the prompt mentions json, unless the model
/// config says otherwise.
pub fn wants_json(model: &ModelConfig, prompt: &str) -> bool {
    model.json_format.unwrap_or_else(|| prompt.contains("json"))
}

/// Chat completion client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
}

impl LlmClient {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Run one completion and return the reply text.
    pub async fn complete(
        &self,
        model: &ModelConfig,
        prompt: &str,
        msg: &str,
    ) -> Result<String, UpstreamError> {
        let res = self.send(model, prompt, msg, false).await?;
        let reply: ChatResponse = res.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(UpstreamError::EmptyReply)
    }

    /// Run a streaming completion; each item is one delta as a JSON line.
    pub async fn stream(
        &self,
        model: &ModelConfig,
        prompt: &str,
        msg: &str,
    ) -> Result<impl Stream<Item = Result<String, UpstreamError>> + Send + 'static, UpstreamError>
    {
        let res = self.send(model, prompt, msg, true).await?;
        let mut decoder = SseDecoder::default();

        Ok(res
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => decoder
                    .feed(&bytes)
                    .into_iter()
                    .filter_map(|data| delta_line(&data))
                    .collect::<Vec<_>>(),
                Err(e) => vec![Err(UpstreamError::Transport(e))],
            })
            .flat_map(stream::iter))
    }

    /// Prompt goes out as the system message and `msg` as the user message,
    /// for plain and streaming calls alike.
    async fn send(
        &self,
        model: &ModelConfig,
        prompt: &str,
        msg: &str,
        streaming: bool,
    ) -> Result<reqwest::Response, UpstreamError> {
        let body = ChatRequest {
            model: &model.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt,
                },
                ChatMessage {
                    role: "user",
                    content: msg,
                },
            ],
            stream: streaming,
            response_format: wants_json(model, prompt).then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(model = %model.name, upstream_model = %model.model, stream = streaming, "Querying upstream model");

        let res = self
            .http
            .post(format!("{}/chat/completions", model.base_url.trim_end_matches('/')))
            .bearer_auth(&model.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        Ok(res)
    }
}

/// Turn one SSE data payload into an NDJSON line holding the delta.
///
/// `[DONE]` and chunks without a delta yield nothing.
fn delta_line(data: &str) -> Option<Result<String, UpstreamError>> {
    if data == "[DONE]" {
        return None;
    }
    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(e.into())),
    };
    let delta = value.get("choices")?.get(0)?.get("delta")?;
    if delta.is_null() {
        return None;
    }
    Some(Ok(format!("{}\n", delta)))
}

/// Incremental `text/event-stream` decoder yielding `data:` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}
