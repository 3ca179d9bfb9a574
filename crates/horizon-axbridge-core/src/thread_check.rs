//! Thread affinity checks for toolkit-owned state.
//!
//! Live table state belongs to the toolkit context and may only be touched
//! from its thread. Toolkit-side types record a [`ThreadAffinity`] when they
//! are bound to a context and call [`ThreadAffinity::check`] on every access;
//! a read issued straight from an assistive-technology thread then fails
//! loudly in debug builds instead of racing silently.
//!
//! ```
//! use horizon_axbridge_core::thread_check::ThreadAffinity;
//!
//! struct Header {
//!     affinity: ThreadAffinity,
//!     text: String,
//! }
//!
//! impl Header {
//!     fn text(&self) -> &str {
//!         self.affinity.check("header read outside the toolkit context");
//!         &self.text
//!     }
//! }
//!
//! let header = Header { affinity: ThreadAffinity::current(), text: "Name".into() };
//! assert_eq!(header.text(), "Name");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable affinity checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable [`ThreadAffinity::check`].
///
/// Checks are on by default in debug builds and off in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if affinity checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread some toolkit state is bound to.
///
/// Cheap to copy; compare with [`is_same_thread`](Self::is_same_thread) or
/// enforce with [`check`](Self::check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self::for_thread(std::thread::current().id())
    }

    /// Bind to `owner`, e.g. a context thread that was just spawned.
    #[inline]
    pub fn for_thread(owner: ThreadId) -> Self {
        Self { owner }
    }

    /// The owning thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.owner
    }

    /// Returns `true` on the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panic off the owning thread, regardless of the global switch.
    pub fn assert_same_thread(&self, msg: &str) {
        if !self.is_same_thread() {
            violation(self.owner, msg);
        }
    }

    /// Panic off the owning thread while checks are enabled.
    #[inline]
    pub fn check(&self, msg: &str) {
        if are_thread_checks_enabled() {
            self.assert_same_thread(msg);
        }
    }
}

#[cold]
#[inline(never)]
fn violation(owner: ThreadId, msg: &str) -> ! {
    let current = std::thread::current();
    panic!(
        "toolkit thread affinity violation: {msg}\n  \
         owner: {owner:?}\n  \
         caller: {:?} ({:?})\n  \
         hint: read toolkit tables through ToolkitContext::invoke_and_wait or a PeerAccessor",
        current.name().unwrap_or("<unnamed>"),
        current.id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread("should not panic");
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();

        let result = Arc::new(AtomicBool::new(false));
        let result_clone = result.clone();

        std::thread::spawn(move || {
            result_clone.store(!affinity.is_same_thread(), Ordering::SeqCst);
        })
        .join()
        .unwrap();

        assert!(result.load(Ordering::SeqCst));
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();

        let result = std::thread::spawn(move || {
            affinity.assert_same_thread("wrong thread");
        })
        .join();

        assert!(result.is_err(), "expected affinity violation panic");
    }

    #[test]
    fn test_for_thread() {
        let handle = std::thread::spawn(|| ThreadAffinity::current());
        let spawned_id = handle.thread().id();
        let affinity = handle.join().unwrap();

        assert_eq!(affinity, ThreadAffinity::for_thread(spawned_id));
        assert!(!affinity.is_same_thread());
    }

    #[test]
    fn test_check_respects_switch() {
        let affinity = ThreadAffinity::current();
        let outcome = std::thread::spawn(move || {
            let before = are_thread_checks_enabled();
            set_thread_checks_enabled(false);
            affinity.check("ignored while disabled");
            set_thread_checks_enabled(before);
        })
        .join();
        assert!(outcome.is_ok());
    }
}
