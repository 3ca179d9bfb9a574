//! Non-owning access to a toolkit table from any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_axbridge_core::logging::targets;
use horizon_axbridge_core::{BridgeError, Result, ToolkitContext};

use crate::model::AccessibleTable;

/// Shared accessor that every adapter of one table composes.
///
/// Holds a [`Weak`] reference to the toolkit table, never a strong one, and
/// routes every read through the toolkit context. Validity is detected
/// lazily on each query; the first time the table is found dropped or
/// disposed the accessor latches into the invalid state and stays there.
pub struct PeerAccessor {
    table: Weak<dyn AccessibleTable>,
    context: ToolkitContext,
    invalidated: AtomicBool,
}

static_assertions::assert_impl_all!(PeerAccessor: Send, Sync);

impl std::fmt::Debug for PeerAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerAccessor")
            .field("invalidated", &self.invalidated.load(Ordering::Acquire))
            .field("context", &self.context)
            .finish()
    }
}

impl PeerAccessor {
    /// Create an accessor for `table`, answering on `context`.
    pub fn new<T>(table: &Arc<T>, context: ToolkitContext) -> Self
    where
        T: AccessibleTable + 'static,
    {
        let table: Weak<T> = Arc::downgrade(table);
        let table: Weak<dyn AccessibleTable> = table;
        Self {
            table,
            context,
            invalidated: AtomicBool::new(false),
        }
    }

    /// The toolkit context queries run on.
    pub fn context(&self) -> &ToolkitContext {
        &self.context
    }

    /// Returns `true` if this accessor refers to `table`.
    pub fn refers_to<T>(&self, table: &Arc<T>) -> bool
    where
        T: AccessibleTable + 'static,
    {
        std::ptr::addr_eq(self.table.as_ptr(), Arc::as_ptr(table))
    }

    /// Returns `true` once the table has been observed dropped or disposed.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    /// Check whether the table still resolves.
    ///
    /// A toolkit context that fails to answer in time says nothing about the
    /// table, so the last known state is reported in that case.
    pub fn is_valid(&self) -> bool {
        if self.is_invalidated() {
            return false;
        }
        if self.table.strong_count() == 0 {
            self.invalidate();
            return false;
        }
        match self.query(|_| Ok(())) {
            Ok(()) => true,
            Err(BridgeError::StalePeer) => false,
            Err(_) => !self.is_invalidated(),
        }
    }

    /// Run `read` against the live table on the toolkit context.
    ///
    /// The liveness check and `read` execute inside the same hand-off, so
    /// `read` sees the table exactly as it was at that instant. Fails with
    /// [`BridgeError::StalePeer`] if the table is gone, and with a context
    /// error if the hand-off does not complete in time.
    pub fn query<R, F>(&self, read: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&dyn AccessibleTable) -> Result<R> + Send + 'static,
    {
        if self.is_invalidated() {
            return Err(BridgeError::StalePeer);
        }

        let table = self.table.clone();
        let outcome = self
            .context
            .invoke_and_wait(move || match table.upgrade() {
                Some(table) if !table.is_disposed() => read(table.as_ref()),
                _ => Err(BridgeError::StalePeer),
            })
            .and_then(|answer| answer);

        if let Err(BridgeError::StalePeer) = outcome {
            self.invalidate();
        }
        outcome
    }

    fn invalidate(&self) {
        if !self.invalidated.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: targets::BRIDGE, "accessible peer invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SimpleAccessibleTable;
    use horizon_axbridge_core::BridgeConfig;
    use std::time::Duration;

    fn context() -> ToolkitContext {
        let config = BridgeConfig::builder()
            .handoff_timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        ToolkitContext::with_config(&config).unwrap()
    }

    #[test]
    fn test_query_reads_live_table() {
        let context = context();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A", "B"]));
        table.bind_to(&context);
        let peer = PeerAccessor::new(&table, context.clone());

        assert!(peer.is_valid());
        assert!(peer.refers_to(&table));
        assert_eq!(peer.query(|t| Ok(t.column_count())).unwrap(), 2);
        context.stop_and_join();
    }

    #[test]
    fn test_dropped_table_latches_invalid() {
        let context = context();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A"]));
        let peer = PeerAccessor::new(&table, context.clone());
        assert!(peer.is_valid());

        drop(table);
        assert!(!peer.is_valid());
        assert!(peer.is_invalidated());
        assert!(matches!(
            peer.query(|t| Ok(t.column_count())),
            Err(BridgeError::StalePeer)
        ));
        context.stop_and_join();
    }

    #[test]
    fn test_disposed_table_is_stale() {
        let context = context();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A"]));
        let peer = PeerAccessor::new(&table, context.clone());

        table.dispose();
        assert!(matches!(peer.query(|_| Ok(())), Err(BridgeError::StalePeer)));
        assert!(!peer.is_valid());
        context.stop_and_join();
    }

    #[test]
    fn test_timeout_does_not_invalidate() {
        let context = context();
        let table = Arc::new(SimpleAccessibleTable::new("t", ["A"]));
        let peer = PeerAccessor::new(&table, context.clone());

        context
            .post(|| std::thread::sleep(Duration::from_millis(300)))
            .unwrap();
        assert!(matches!(
            peer.query(|t| Ok(t.column_count())),
            Err(BridgeError::CrossContextTimeout { .. })
        ));
        assert!(!peer.is_invalidated());

        context.stop_and_join();
    }
}
