//! Tracing and logging setup shared by every binary that embeds the engine.

/// Initialize process-wide observability with the default [`LogConfig`].
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&LogConfig::default());
}

/// Initialize process-wide observability with an explicit configuration.
pub fn init_with(config: &LogConfig) {
    tracing::init(config);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::LogConfig;
