//! Tracing/logging setup shared by SpareKeep binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
