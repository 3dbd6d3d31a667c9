//! Observability infrastructure for Berth.
//!
//! Structured logging with consistent spans: initialization helpers plus
//! span constructors so every component labels its work the same way.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `berth_registry=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for registry commands with standard fields.
#[must_use]
pub fn command_span(operation: &str, kind: &str) -> Span {
    tracing::info_span!("registry", op = operation, kind = kind)
}

/// Creates a span for actuator-facing orchestration operations.
#[must_use]
pub fn actuator_span(operation: &str, target: &str) -> Span {
    tracing::info_span!("actuator", op = operation, target = target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn span_helpers_create_spans() {
        let span = command_span("create", "Project");
        let _guard = span.enter();
        tracing::info!("test message in span");

        let span = actuator_span("build", "image_1");
        let _guard = span.enter();
        tracing::info!("actuator message");
    }
}
