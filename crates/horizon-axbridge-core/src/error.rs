//! Error types for Horizon AX Bridge.
//!
//! None of these errors is meant to reach the native accessibility runtime.
//! Adapter accessors convert them into "unavailable" results at the boundary;
//! the typed errors exist so the bridge can log the reason and so callers
//! that care (tests, diagnostics) can use the `try_*` accessors.

use std::fmt;
use std::time::Duration;

/// What kind of index an [`BridgeError::IndexOutOfRange`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// A column index within a table.
    Column,
    /// A row index within a table.
    Row,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column => write!(f, "column"),
            Self::Row => write!(f, "row"),
        }
    }
}

/// The main error type for bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The accessible peer no longer resolves to a live toolkit object.
    #[error("accessible peer is stale (table dropped or disposed)")]
    StalePeer,

    /// A stored index no longer fits the live table.
    #[error("{kind} index {index} out of range (current count {count})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        count: usize,
    },

    /// The hand-off to the toolkit context did not complete in time.
    #[error("toolkit context did not answer within {timeout:?}")]
    CrossContextTimeout { timeout: Duration },

    /// The toolkit context has been stopped and accepts no more work.
    #[error("toolkit context has been stopped")]
    ContextStopped,

    /// The toolkit context's queue is at capacity.
    #[error("toolkit context queue is full")]
    QueueFull,

    /// The handed-off closure panicked, or was dropped without running.
    #[error("hand-off panicked on the toolkit thread")]
    HandoffPanicked,

    /// The toolkit context thread could not be spawned.
    #[error("failed to spawn toolkit context thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    /// Create a column out-of-range error.
    pub fn column_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Column,
            index,
            count,
        }
    }

    /// Create a row out-of-range error.
    pub fn row_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Row,
            index,
            count,
        }
    }

    /// Returns `true` if the error comes from the toolkit context being slow,
    /// stopped or saturated rather than from the table itself.
    pub fn is_context_failure(&self) -> bool {
        matches!(
            self,
            Self::CrossContextTimeout { .. }
                | Self::ContextStopped
                | Self::QueueFull
                | Self::HandoffPanicked
        )
    }
}

/// Errors from loading or validating a [`BridgeConfig`](crate::BridgeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML source could not be parsed.
    #[error("invalid bridge configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read bridge configuration '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field holds a value the bridge cannot work with.
    #[error("invalid value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// A specialized Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
