//! Chat modes and their system prompts.

use serde::{Deserialize, Serialize};

/// Dashboard feature a chat request comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// General co-founder assistant.
    #[default]
    General,
    /// Market intelligence.
    Market,
    /// Canadian funding discovery.
    Funding,
    /// Code health.
    Code,
}

impl ChatMode {
    /// Parse a mode name, falling back to [`ChatMode::General`].
    #[must_use]
    pub fn parse_lenient(name: Option<&str>) -> Self {
        match name {
            Some("market") => Self::Market,
            Some("funding") => Self::Funding,
            Some("code") => Self::Code,
            _ => Self::General,
        }
    }

    /// System prompt for this mode.
    #[must_use]
    pub const fn system_prompt(&self) -> &'static str {
        match self {
            Self::General => GENERAL_PROMPT,
            Self::Market => MARKET_PROMPT,
            Self::Funding => FUNDING_PROMPT,
            Self::Code => CODE_PROMPT,
        }
    }
}

const GENERAL_PROMPT: &str = "You are FounderOS, an ambient AI co-founder specifically designed for Canadian startups. You provide:
- Strategic insights for early-stage founders
- Canadian startup ecosystem knowledge
- Funding opportunity guidance
- Market intelligence analysis
- Technical recommendations

Always respond with actionable insights and Canadian context when relevant.";

const MARKET_PROMPT: &str = "You are the Market Intelligence module of FounderOS. Analyze competitor movements, market trends, and strategic implications for Canadian startups. Focus on:
- Competitor analysis and strategic positioning
- Market opportunity identification
- Trend analysis with business implications
- Strategic recommendations

Provide specific, actionable insights with Canadian market context.";

const FUNDING_PROMPT: &str = "You are the Canadian Funding Discovery module of FounderOS. You specialize in:
- Government grants and programs (federal and provincial)
- Canadian accelerators and incubators
- Venture capital landscape in Canada
- Funding strategy optimization

Always provide specific program names, eligibility criteria, and application strategies.";

const CODE_PROMPT: &str = "You are the Code Health module of FounderOS. Analyze technical aspects and provide:
- Technical debt assessment
- Performance optimization recommendations
- Security vulnerability insights
- Development productivity improvements

Focus on practical, implementable technical recommendations.";
