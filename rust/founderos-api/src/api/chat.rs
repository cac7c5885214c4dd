//! Chat relay endpoint.
//!
//! Streams completions as SSE: `delta` events carry `{content}` chunks and a
//! final `done` or `error` event closes the stream.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::sse::{Event, Sse},
    routing::post,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::events::NormalizedEvent;
use crate::llm::{ChatMode, LlmRequest, Message};
use crate::logging::OpTimer;

/// Create the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/ai/chat", post(chat))
}

/// Chat request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Dashboard mode; unknown values use the general prompt.
    #[serde(default, rename = "type")]
    pub mode: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(req) = body?;
    let mode = ChatMode::parse_lenient(req.mode.as_deref());
    tracing::info!(mode = ?mode, messages = req.messages.len(), "Chat request");

    let request = LlmRequest::new(req.messages).with_system(mode.system_prompt());

    let timer = OpTimer::new("chat", "stream_start");
    let result = state.chat.stream(request).await;
    timer.finish_with_result(result.as_ref());
    let upstream = result.map_err(ApiError::Upstream)?;

    let events = upstream
        .map(|item| item.unwrap_or_else(|e| NormalizedEvent::error(e.to_string())))
        .filter_map(|event| async move {
            if let NormalizedEvent::Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            } = &event
            {
                tracing::info!(prompt_tokens, completion_tokens, total_tokens, "Chat usage");
                return None;
            }
            Some(event)
        })
        .scan(false, |finished, event| {
            let next = if *finished {
                None
            } else {
                *finished = event.is_terminal();
                Some(event)
            };
            futures::future::ready(next)
        })
        .map(|event| Ok(to_sse(&event)));

    Ok(Sse::new(events))
}

fn to_sse(event: &NormalizedEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(event.event_type()).data(data)
}
