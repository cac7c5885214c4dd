//! Structured logging helpers: operation timings and startup step macros.

use std::time::Instant;

/// Measures an operation and logs its duration when finished.
///
/// ```rust,ignore
/// use founderos_api::logging::OpTimer;
///
/// let timer = OpTimer::new("agent", "cycle");
/// // ... run the cycle ...
/// timer.finish();
/// ```
#[derive(Debug)]
pub struct OpTimer {
    component: &'static str,
    operation: &'static str,
    start: Instant,
}

impl OpTimer {
    /// Start timing `operation` of `component`.
    #[must_use]
    pub fn new(component: &'static str, operation: &'static str) -> Self {
        tracing::debug!(component, operation, "Operation started");
        Self {
            component,
            operation,
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer started.
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Log the duration.
    pub fn finish(self) {
        tracing::info!(
            component = self.component,
            operation = self.operation,
            duration_ms = self.elapsed_ms(),
            "Operation completed"
        );
    }

    /// Log the duration, at error level with the cause when `result` failed.
    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: Result<&T, &E>) {
        let duration_ms = self.elapsed_ms();
        match result {
            Ok(_) => tracing::info!(
                component = self.component,
                operation = self.operation,
                duration_ms,
                "Operation completed successfully"
            ),
            Err(e) => tracing::error!(
                component = self.component,
                operation = self.operation,
                duration_ms,
                error = %e,
                "Operation failed"
            ),
        }
    }
}

/// Log a numbered startup step, e.g. `[2/4] Ambient Agent - 3 default tasks`.
#[macro_export]
macro_rules! log_init_step {
    ($step:expr, $total:expr, $name:expr, $detail:expr) => {
        tracing::info!(
            step = $step,
            total = $total,
            "[{}/{}] {} - {}",
            $step,
            $total,
            $name,
            $detail
        );
    };
}

/// Log a degraded-mode notice during startup.
#[macro_export]
macro_rules! log_init_warning {
    ($msg:expr) => {
        tracing::warn!("⚠️  {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        tracing::warn!("⚠️  {}", format!($msg, $($arg)*));
    };
}

/// Log completion of a major phase.
#[macro_export]
macro_rules! log_success {
    ($msg:expr) => {
        tracing::info!("✅ {}", $msg);
    };
}

/// Log a startup banner with a title and subtitle.
#[macro_export]
macro_rules! log_banner {
    ($title:expr, $subtitle:expr) => {
        tracing::info!("═══════════════════════════════════════════════════");
        tracing::info!("  {}", $title);
        tracing::info!("  {}", $subtitle);
        tracing::info!("═══════════════════════════════════════════════════");
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_keeps_labels() {
        let timer = OpTimer::new("agent", "cycle");
        assert_eq!(timer.component, "agent");
        assert_eq!(timer.operation, "cycle");
        timer.finish();
    }

    #[test]
    fn test_finish_with_result_both_arms() {
        let ok: Result<u8, String> = Ok(1);
        OpTimer::new("search", "scan").finish_with_result(ok.as_ref());

        let err: Result<u8, String> = Err("Tavily API error: 500".to_string());
        OpTimer::new("search", "scan").finish_with_result(err.as_ref());
    }
}
