//! Logging facilities for Horizon AX Bridge.
//!
//! The bridge is instrumented with the `tracing` crate and never installs a
//! subscriber itself. To see its logs, install one in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_axbridge=debug,horizon_axbridge_core::handoff=warn")
//!     .init();
//! ```
//!
//! Degraded queries (stale peers, out-of-range indices) log at `debug`;
//! context failures (timeouts, stopped or saturated queue) log at `warn`.

/// Span names used throughout the bridge.
pub mod span_names {
    /// One native query answered by an adapter.
    pub const QUERY: &str = "horizon_axbridge::query";
    /// One hand-off to the toolkit context.
    pub const HANDOFF: &str = "horizon_axbridge::handoff";
    /// A full tree update build.
    pub const TREE_UPDATE: &str = "horizon_axbridge::tree_update";
}

/// Target names for log filtering.
pub mod targets {
    /// Toolkit context lifecycle.
    pub const CONTEXT: &str = "horizon_axbridge_core::context";
    /// Cross-context hand-offs.
    pub const HANDOFF: &str = "horizon_axbridge_core::handoff";
    /// Adapter nodes and the accessibility bridge.
    pub const BRIDGE: &str = "horizon_axbridge";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for timing how long a query or tree build takes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_axbridge::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Wrappers around the `tracing` macros with the bridge target fixed.
#[macro_export]
macro_rules! axbridge_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_axbridge", $($arg)*)
    };
}

#[macro_export]
macro_rules! axbridge_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_axbridge", $($arg)*)
    };
}

#[macro_export]
macro_rules! axbridge_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_axbridge", $($arg)*)
    };
}

#[macro_export]
macro_rules! axbridge_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_axbridge", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_macros_expand() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        axbridge_debug!(column = 3, "column unavailable");
        axbridge_info!(tables = 1, "bridge root set");
        axbridge_warn!("hand-off timed out");
    }
}
