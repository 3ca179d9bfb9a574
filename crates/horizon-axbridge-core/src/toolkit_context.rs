//! The toolkit's serialized execution context.
//!
//! A [`ToolkitContext`] owns a dedicated thread with its own task queue. Every
//! read or mutation of live toolkit state (tables, headers, cells) runs there,
//! one task at a time, so each task observes a consistent snapshot.
//!
//! Assistive-technology threads never touch that state directly. They hand a
//! closure to the context with [`ToolkitContext::invoke_and_wait`], which
//! blocks for at most a bounded interval and reports
//! [`BridgeError::CrossContextTimeout`] instead of hanging when the toolkit is
//! busy.
//!
//! # Example
//!
//! ```no_run
//! use horizon_axbridge_core::ToolkitContext;
//! use std::time::Duration;
//!
//! let context = ToolkitContext::new()?;
//!
//! // Blocking hand-off with the configured timeout.
//! let answer = context.invoke_and_wait(|| 6 * 7)?;
//! assert_eq!(answer, 42);
//!
//! // Fire-and-forget mutation.
//! context.post(|| println!("runs on the toolkit thread"))?;
//!
//! // Explicit bound.
//! let quick = context.invoke_with_timeout(Duration::from_millis(10), || "hi");
//! # let _ = quick;
//!
//! context.stop_and_join();
//! # Ok::<(), horizon_axbridge_core::BridgeError>(())
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::{Condvar, Mutex};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::invocation::{QueuedInvocation, ReplyError, reply_pair};
use crate::logging::{PerfSpan, span_names, targets};
use crate::thread_check::ThreadAffinity;

/// Poll interval of the context loop while idle.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// State shared between the handles and the context thread.
struct ContextState {
    running: AtomicBool,
    pending_tasks: AtomicUsize,
    shutdown_condvar: Condvar,
    shutdown_mutex: Mutex<()>,
}

impl ContextState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            pending_tasks: AtomicUsize::new(0),
            shutdown_condvar: Condvar::new(),
            shutdown_mutex: Mutex::new(()),
        }
    }

    fn signal_shutdown(&self) {
        let _guard = self.shutdown_mutex.lock();
        self.shutdown_condvar.notify_all();
    }
}

enum ContextTask {
    Run(QueuedInvocation),
    Shutdown,
}

struct ContextInner {
    name: String,
    sender: Sender<ContextTask>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<ContextState>,
    affinity: ThreadAffinity,
    handoff_timeout: Duration,
}

impl ContextInner {
    fn stop(&self) {
        if self.state.running.swap(false, Ordering::AcqRel) {
            tracing::debug!(target: targets::CONTEXT, name = %self.name, "stopping toolkit context");
        }
        let _ = self.sender.try_send(ContextTask::Shutdown);
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        // Don't block in drop - just request shutdown.
        self.stop();
    }
}

/// Handle to the toolkit's serialized execution context.
///
/// Cloning is cheap; all clones refer to the same thread. The thread is asked
/// to stop when the last handle is dropped.
#[derive(Clone)]
pub struct ToolkitContext {
    inner: Arc<ContextInner>,
}

static_assertions::assert_impl_all!(ToolkitContext: Send, Sync);

impl std::fmt::Debug for ToolkitContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitContext")
            .field("name", &self.inner.name)
            .field("running", &self.is_running())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

impl ToolkitContext {
    /// Start a context with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&BridgeConfig::default())
    }

    /// Start a context with the given configuration.
    pub fn with_config(config: &BridgeConfig) -> Result<Self> {
        let (sender, receiver) = bounded(config.queue_capacity);
        let state = Arc::new(ContextState::new());

        let thread_state = state.clone();
        let handle = thread::Builder::new()
            .name(config.context_thread_name.clone())
            .spawn(move || {
                context_loop(receiver, &thread_state);
                thread_state.running.store(false, Ordering::Release);
                thread_state.signal_shutdown();
            })
            .map_err(|source| BridgeError::Spawn {
                name: config.context_thread_name.clone(),
                source,
            })?;

        let affinity = ThreadAffinity::for_thread(handle.thread().id());
        tracing::debug!(
            target: targets::CONTEXT,
            name = %config.context_thread_name,
            timeout = ?config.handoff_timeout,
            "toolkit context started"
        );

        Ok(Self {
            inner: Arc::new(ContextInner {
                name: config.context_thread_name.clone(),
                sender,
                handle: Mutex::new(Some(handle)),
                state,
                affinity,
                handoff_timeout: config.handoff_timeout,
            }),
        })
    }

    /// The context thread's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The default bound applied by [`invoke_and_wait`](Self::invoke_and_wait).
    pub fn handoff_timeout(&self) -> Duration {
        self.inner.handoff_timeout
    }

    /// Affinity of the context thread, for toolkit state to bind to.
    pub fn affinity(&self) -> ThreadAffinity {
        self.inner.affinity
    }

    /// Returns `true` when called from the context thread itself.
    pub fn is_toolkit_thread(&self) -> bool {
        self.inner.affinity.is_same_thread()
    }

    /// Check if the context still accepts work.
    pub fn is_running(&self) -> bool {
        self.inner.state.running.load(Ordering::Acquire)
    }

    /// Number of tasks queued but not yet finished.
    pub fn pending_tasks(&self) -> usize {
        self.inner.state.pending_tasks.load(Ordering::Acquire)
    }

    /// Queue `task` without waiting for it.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(QueuedInvocation::new(task))
    }

    /// Run `task` on the context and wait for its result, bounded by the
    /// configured hand-off timeout.
    pub fn invoke_and_wait<R, F>(&self, task: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.invoke_with_timeout(self.inner.handoff_timeout, task)
    }

    /// Run `task` on the context and wait at most `timeout` for its result.
    ///
    /// When called from the context thread the task runs inline, since
    /// queueing it would wait on ourselves. A panicking task reports
    /// [`BridgeError::HandoffPanicked`] on both paths.
    pub fn invoke_with_timeout<R, F>(&self, timeout: Duration, task: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let _span = PerfSpan::new(span_names::HANDOFF);
        if self.is_toolkit_thread() {
            return panic::catch_unwind(AssertUnwindSafe(task)).map_err(|_| {
                tracing::warn!(
                    target: targets::HANDOFF,
                    context = %self.inner.name,
                    "inline toolkit task panicked"
                );
                BridgeError::HandoffPanicked
            });
        }

        let (reply, receiver) = reply_pair();
        self.enqueue(QueuedInvocation::new(move || reply.send(task())))?;

        match receiver.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(ReplyError::TimedOut) => {
                tracing::warn!(
                    target: targets::HANDOFF,
                    context = %self.inner.name,
                    ?timeout,
                    pending = self.pending_tasks(),
                    "hand-off to toolkit context timed out"
                );
                Err(BridgeError::CrossContextTimeout { timeout })
            }
            Err(ReplyError::Abandoned) => Err(BridgeError::HandoffPanicked),
        }
    }

    fn enqueue(&self, invocation: QueuedInvocation) -> Result<()> {
        if !self.is_running() {
            return Err(BridgeError::ContextStopped);
        }

        self.inner
            .state
            .pending_tasks
            .fetch_add(1, Ordering::AcqRel);

        match self.inner.sender.try_send(ContextTask::Run(invocation)) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.inner
                    .state
                    .pending_tasks
                    .fetch_sub(1, Ordering::AcqRel);
                match err {
                    TrySendError::Full(_) => {
                        tracing::warn!(target: targets::HANDOFF, context = %self.inner.name, "toolkit queue full");
                        Err(BridgeError::QueueFull)
                    }
                    TrySendError::Disconnected(_) => Err(BridgeError::ContextStopped),
                }
            }
        }
    }

    /// Ask the context to stop after draining queued tasks. Non-blocking.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Wait for the context thread to exit.
    ///
    /// Returns `false` if already joined, if the thread panicked, or if called
    /// from the context thread itself.
    pub fn join(&self) -> bool {
        if self.is_toolkit_thread() {
            return false;
        }
        let mut handle = self.inner.handle.lock();
        if let Some(h) = handle.take() {
            h.join().is_ok()
        } else {
            false
        }
    }

    /// Stop the context and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }

    /// Wait for the context thread to exit, bounded by `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if !self.is_running() && self.pending_tasks() == 0 {
            return true;
        }

        let mut guard = self.inner.state.shutdown_mutex.lock();
        let result = self
            .inner
            .state
            .shutdown_condvar
            .wait_for(&mut guard, timeout);
        !result.timed_out() || !self.is_running()
    }
}

/// Drain the queue until shutdown.
fn context_loop(receiver: Receiver<ContextTask>, state: &ContextState) {
    loop {
        match receiver.recv_timeout(IDLE_POLL) {
            Ok(ContextTask::Run(invocation)) => run_task(invocation, state),
            Ok(ContextTask::Shutdown) => {
                // Blocked callers are still waiting on these; run them.
                while let Ok(task) = receiver.try_recv() {
                    if let ContextTask::Run(invocation) = task {
                        run_task(invocation, state);
                    }
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if !state.running.load(Ordering::Acquire)
                    && state.pending_tasks.load(Ordering::Acquire) == 0
                {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::trace!(target: targets::CONTEXT, "toolkit context loop exited");
}

fn run_task(invocation: QueuedInvocation, state: &ContextState) {
    if invocation.execute().is_err() {
        tracing::error!(target: targets::CONTEXT, "task panicked on the toolkit context");
    }
    state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    fn quick_config() -> BridgeConfig {
        BridgeConfig::builder()
            .handoff_timeout(Duration::from_millis(200))
            .context_thread_name("test-toolkit")
            .build()
            .unwrap()
    }

    #[test]
    fn test_context_creation() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        assert!(context.is_running());
        assert_eq!(context.name(), "test-toolkit");
        assert!(!context.is_toolkit_thread());
        assert!(context.stop_and_join());
    }

    #[test]
    fn test_invoke_and_wait_returns_value() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        assert_eq!(context.invoke_and_wait(|| 42).unwrap(), 42);
        context.stop_and_join();
    }

    #[test]
    fn test_task_runs_on_context_thread() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        let handle = context.clone();
        assert!(context.invoke_and_wait(move || handle.is_toolkit_thread()).unwrap());
        context.stop_and_join();
    }

    #[test]
    fn test_nested_invoke_runs_inline() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        let nested = context.clone();
        let value = context
            .invoke_and_wait(move || nested.invoke_and_wait(|| 7).unwrap())
            .unwrap();
        assert_eq!(value, 7);
        context.stop_and_join();
    }

    #[test]
    fn test_timeout_when_context_busy() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        context
            .post(|| thread::sleep(Duration::from_millis(300)))
            .unwrap();

        let started = std::time::Instant::now();
        let result = context.invoke_with_timeout(Duration::from_millis(20), || 1);
        assert!(matches!(result, Err(BridgeError::CrossContextTimeout { .. })));
        assert!(started.elapsed() < Duration::from_millis(250));

        context.stop_and_join();
    }

    #[test]
    fn test_sequential_processing() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order_clone = order.clone();
            context.post(move || order_clone.lock().push(i)).unwrap();
        }
        context.invoke_and_wait(|| ()).unwrap();

        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
        context.stop_and_join();
    }

    #[test]
    fn test_post_after_stop() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        context.stop();

        assert!(matches!(context.post(|| ()), Err(BridgeError::ContextStopped)));
        assert!(matches!(
            context.invoke_and_wait(|| 1),
            Err(BridgeError::ContextStopped)
        ));
        context.join();
    }

    #[test]
    fn test_graceful_shutdown_drains_queue() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        let counter = Arc::new(AtomicI32::new(0));

        for _ in 0..5 {
            let counter_clone = counter.clone();
            context
                .post(move || {
                    thread::sleep(Duration::from_millis(5));
                    counter_clone.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        context.stop_and_join();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_panicking_task_reported() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        let result: Result<i32> = context.invoke_and_wait(|| panic!("toolkit bug"));
        assert!(matches!(result, Err(BridgeError::HandoffPanicked)));

        // The context survives the panic.
        assert_eq!(context.invoke_and_wait(|| 5).unwrap(), 5);
        context.stop_and_join();
    }

    #[test]
    fn test_queue_full() {
        let config = BridgeConfig::builder()
            .queue_capacity(1)
            .build()
            .unwrap();
        let context = ToolkitContext::with_config(&config).unwrap();
        let (release_tx, release_rx) = bounded::<()>(1);

        // Occupy the thread, then fill the single queue slot.
        context
            .post(move || {
                let _ = release_rx.recv_timeout(Duration::from_secs(5));
            })
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        context.post(|| ()).unwrap();

        assert!(matches!(context.post(|| ()), Err(BridgeError::QueueFull)));

        release_tx.send(()).unwrap();
        context.stop_and_join();
    }

    #[test]
    fn test_wait_timeout() {
        let context = ToolkitContext::with_config(&quick_config()).unwrap();
        assert!(!context.wait_timeout(Duration::from_millis(50)));

        context.stop();
        assert!(context.wait_timeout(Duration::from_millis(500)));
    }
}
