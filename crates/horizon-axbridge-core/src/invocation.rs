//! Queued invocations and the reply channel used by blocking hand-offs.
//!
//! A [`QueuedInvocation`] is a type-erased closure destined for the toolkit
//! context. A caller that needs the closure's result creates a
//! [`reply_pair`], moves the [`ReplySender`] into the closure and waits on
//! the [`ReplyReceiver`] with a bound.
//!
//! If the closure panics, or the invocation is dropped without ever running,
//! the sender is dropped unsent and the receiver wakes with
//! [`ReplyError::Abandoned`] rather than waiting out its timeout.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A type-erased invocation that runs later on another thread.
pub struct QueuedInvocation {
    invoke: Box<dyn FnOnce() + Send>,
}

impl QueuedInvocation {
    /// Wrap `invoke` for the queue.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            invoke: Box::new(invoke),
        }
    }

    /// Run the invocation, catching a panic instead of unwinding into the
    /// queue's thread.
    pub fn execute(self) -> std::thread::Result<()> {
        panic::catch_unwind(AssertUnwindSafe(self.invoke))
    }
}

/// Why [`ReplyReceiver::recv_timeout`] returned without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyError {
    /// The bound elapsed first. The invocation may still run later.
    TimedOut,
    /// The sender was dropped without replying.
    Abandoned,
}

enum ReplyState<R> {
    Pending,
    Ready(R),
    Abandoned,
}

struct ReplySlot<R> {
    state: Mutex<ReplyState<R>>,
    changed: Condvar,
}

/// Sending half of a reply. Consumed by [`send`](Self::send).
pub struct ReplySender<R> {
    slot: Arc<ReplySlot<R>>,
}

impl<R> ReplySender<R> {
    /// Deliver the result and wake the receiver.
    pub fn send(self, value: R) {
        *self.slot.state.lock() = ReplyState::Ready(value);
        self.slot.changed.notify_all();
    }
}

impl<R> Drop for ReplySender<R> {
    fn drop(&mut self) {
        let mut state = self.slot.state.lock();
        if matches!(*state, ReplyState::Pending) {
            *state = ReplyState::Abandoned;
            self.slot.changed.notify_all();
        }
    }
}

/// Receiving half of a reply.
pub struct ReplyReceiver<R> {
    slot: Arc<ReplySlot<R>>,
}

impl<R> ReplyReceiver<R> {
    /// Wait at most `timeout` for the reply.
    pub fn recv_timeout(self, timeout: Duration) -> Result<R, ReplyError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.state.lock();
        loop {
            match std::mem::replace(&mut *state, ReplyState::Pending) {
                ReplyState::Ready(value) => return Ok(value),
                ReplyState::Abandoned => return Err(ReplyError::Abandoned),
                ReplyState::Pending => {}
            }
            // Spurious wakeups are possible, so loop against the deadline.
            if self.slot.changed.wait_until(&mut state, deadline).timed_out()
                && matches!(*state, ReplyState::Pending)
            {
                return Err(ReplyError::TimedOut);
            }
        }
    }

    /// Returns `true` once a reply (or abandonment) is waiting.
    pub fn is_ready(&self) -> bool {
        !matches!(*self.slot.state.lock(), ReplyState::Pending)
    }
}

/// Create a connected sender/receiver pair.
pub fn reply_pair<R>() -> (ReplySender<R>, ReplyReceiver<R>) {
    let slot = Arc::new(ReplySlot {
        state: Mutex::new(ReplyState::Pending),
        changed: Condvar::new(),
    });
    (ReplySender { slot: slot.clone() }, ReplyReceiver { slot })
}
