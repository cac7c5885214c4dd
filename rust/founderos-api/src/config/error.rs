//! Configuration error types with actionable messages.

use std::fmt;

/// Configuration errors. Each variant tells the operator what to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A value is out of range or malformed.
    Invalid {
        /// Offending setting, as its config key.
        setting: String,
        /// What is wrong.
        message: String,
        /// How to fix it.
        fix_hint: String,
    },
    /// An optional integration is not configured.
    MissingOptional {
        /// Feature that degrades.
        feature: String,
        /// What happens instead.
        fallback: String,
        /// Environment variable to set.
        env_var: String,
    },
    /// Several errors found in one pass.
    Multiple(Vec<ConfigurationError>),
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid {
                setting,
                message,
                fix_hint,
            } => {
                write!(
                    f,
                    "Invalid configuration for {setting}: {message}\n\nHow to fix: {fix_hint}"
                )
            }
            Self::MissingOptional {
                feature,
                fallback,
                env_var,
            } => {
                write!(
                    f,
                    "{feature} is not configured; {fallback}\n\
                    Set via: {env_var}"
                )
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple configuration errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "\n{}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl ConfigurationError {
    /// Create an invalid value error.
    #[must_use]
    pub fn invalid(
        setting: impl Into<String>,
        message: impl Into<String>,
        fix_hint: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            setting: setting.into(),
            message: message.into(),
            fix_hint: fix_hint.into(),
        }
    }

    /// Create a missing optional integration notice.
    #[must_use]
    pub fn missing_optional(
        feature: impl Into<String>,
        fallback: impl Into<String>,
        env_var: impl Into<String>,
    ) -> Self {
        Self::MissingOptional {
            feature: feature.into(),
            fallback: fallback.into(),
            env_var: env_var.into(),
        }
    }

    /// Collapse a list of errors: `None` when empty, the error itself when
    /// single, [`Self::Multiple`] otherwise.
    #[must_use]
    pub fn collect(mut errors: Vec<ConfigurationError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(Self::Multiple(errors)),
        }
    }

    /// Number of errors (1 for single errors, N for multiple).
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Multiple(errors) => errors.len(),
            _ => 1,
        }
    }
}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_error_display() {
        let err = ConfigurationError::invalid(
            "agent.history_capacity",
            "must be greater than zero",
            "Set FOUNDEROS__AGENT__HISTORY_CAPACITY to a positive number",
        );
        let msg = err.to_string();
        assert!(msg.contains("Invalid configuration for agent.history_capacity"));
        assert!(msg.contains("How to fix"));
    }

    #[test]
    fn test_missing_optional_display() {
        let err = ConfigurationError::missing_optional(
            "Tavily search",
            "competitor scans return demo data",
            "TAVILY_API_KEY",
        );
        let msg = err.to_string();
        assert!(msg.contains("Tavily search is not configured"));
        assert!(msg.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn test_collect() {
        assert!(ConfigurationError::collect(Vec::new()).is_none());

        let single = ConfigurationError::collect(vec![ConfigurationError::invalid("a", "b", "c")])
            .unwrap();
        assert_eq!(single.count(), 1);

        let many = ConfigurationError::collect(vec![
            ConfigurationError::invalid("a", "1", "fix"),
            ConfigurationError::invalid("b", "2", "fix"),
        ])
        .unwrap();
        assert_eq!(many.count(), 2);
        let msg = many.to_string();
        assert!(msg.contains("Multiple configuration errors"));
        assert!(msg.contains("1."));
        assert!(msg.contains("2."));
    }
}
