//! LLM provider implementations.

mod anthropic;

pub use anthropic::AnthropicDriver;

use std::sync::Arc;

use super::{LlmDriver, LlmSettings};

/// Create the chat driver for the given settings.
pub fn create_driver(settings: LlmSettings) -> anyhow::Result<Arc<dyn LlmDriver>> {
    Ok(Arc::new(AnthropicDriver::new(settings)?))
}
