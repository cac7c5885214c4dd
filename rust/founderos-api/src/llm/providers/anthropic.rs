//! Anthropic Messages API driver.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;

use crate::events::NormalizedEvent;
use crate::llm::{EventStream, LlmDriver, LlmRequest, LlmSettings, Message, MessageRole};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API driver.
#[derive(Debug, Clone)]
pub struct AnthropicDriver {
    settings: LlmSettings,
    client: Client,
}

impl AnthropicDriver {
    /// Create a new Anthropic driver.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self { settings, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/messages",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Build the request body. Client-supplied system messages are appended
    /// to the mode prompt since the API only accepts a top-level system field.
    fn request_body(&self, req: &LlmRequest) -> serde_json::Value {
        let mut system = req.system.clone().unwrap_or_default();
        let mut messages = Vec::with_capacity(req.messages.len());

        for Message { role, content } in &req.messages {
            match role {
                MessageRole::System => {
                    if !system.is_empty() {
                        system.push_str("\n\n");
                    }
                    system.push_str(content);
                }
                MessageRole::User => {
                    messages.push(serde_json::json!({ "role": "user", "content": content }));
                }
                MessageRole::Assistant => {
                    messages.push(serde_json::json!({ "role": "assistant", "content": content }));
                }
            }
        }

        let mut body = serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "stream": true
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system);
        }
        body
    }
}

#[async_trait]
impl LlmDriver for AnthropicDriver {
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<EventStream> {
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Anthropic API key required"))?;

        let body = self.request_body(&req);

        let response = self
            .client
            .post(self.api_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error ({status}): {text}");
        }

        let stream = response.bytes_stream();

        let event_stream = async_stream::stream! {
            let mut decoder = FrameDecoder::default();
            futures::pin_mut!(stream);

            while let Some(chunk_result) = stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(anyhow::anyhow!("Stream error: {e}"));
                        return;
                    }
                };

                for event in decoder.push(&chunk) {
                    let terminal = event.is_terminal();
                    yield Ok(event);
                    if terminal {
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(event_stream))
    }

    fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

/// Incremental decoder from Anthropic SSE bytes to normalized events.
///
/// Bytes are buffered until a full frame arrives, so multi-byte characters
/// split across network chunks decode intact.
#[derive(Debug, Default)]
struct FrameDecoder {
    buffer: Vec<u8>,
    input_tokens: u32,
    output_tokens: u32,
    stop_reason: Option<String>,
}

impl FrameDecoder {
    /// Feed a chunk and return every event completed by it.
    fn push(&mut self, chunk: &[u8]) -> Vec<NormalizedEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            let frame = match std::str::from_utf8(&frame) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping non-UTF-8 Anthropic frame");
                    continue;
                }
            };
            for data in frame.lines().filter_map(|l| l.strip_prefix("data: ")) {
                match serde_json::from_str::<AnthropicEvent>(data) {
                    Ok(event) => events.extend(self.apply(event)),
                    Err(e) => {
                        tracing::warn!(error = %e, data, "Failed to parse Anthropic event");
                    }
                }
            }
        }

        events
    }

    fn apply(&mut self, event: AnthropicEvent) -> Vec<NormalizedEvent> {
        match event.event_type.as_str() {
            "message_start" => {
                if let Some(usage) = event.message.and_then(|m| m.usage) {
                    self.input_tokens = usage.input_tokens.unwrap_or(0);
                }
                Vec::new()
            }
            "content_block_delta" => event
                .delta
                .filter(|d| d.delta_type.as_deref() == Some("text_delta"))
                .and_then(|d| d.text)
                .map(NormalizedEvent::message_delta)
                .into_iter()
                .collect(),
            "message_delta" => {
                if let Some(reason) = event.delta.and_then(|d| d.stop_reason) {
                    self.stop_reason = Some(reason);
                }
                if let Some(tokens) = event.usage.and_then(|u| u.output_tokens) {
                    self.output_tokens = tokens;
                }
                Vec::new()
            }
            "message_stop" => {
                let done = match self.stop_reason.take() {
                    Some(reason) => NormalizedEvent::done_with_reason(reason),
                    None => NormalizedEvent::done(),
                };
                vec![
                    NormalizedEvent::usage(self.input_tokens, self.output_tokens),
                    done,
                ]
            }
            "error" => {
                let message = event
                    .error
                    .map_or_else(|| "Unknown Anthropic error".to_string(), |e| e.message);
                vec![NormalizedEvent::error(message)]
            }
            _ => Vec::new(),
        }
    }
}

/// Anthropic SSE event.
#[derive(Debug, Deserialize)]
struct AnthropicEvent {
    #[serde(rename = "type")]
    event_type: String,
    message: Option<AnthropicMessage>,
    delta: Option<AnthropicDelta>,
    usage: Option<AnthropicUsage>,
    error: Option<AnthropicError>,
}

#[derive(Debug, Deserialize)]
struct AnthropicMessage {
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicDelta {
    #[serde(rename = "type")]
    delta_type: Option<String>,
    text: Option<String>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    message: String,
}
