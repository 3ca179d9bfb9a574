//! Core plumbing for Horizon AX Bridge.
//!
//! This crate provides the pieces the accessibility adapters are built on:
//!
//! - **Toolkit context**: the toolkit's single serialized execution context,
//!   a dedicated thread with a bounded task queue
//! - **Hand-off**: queued invocations with a typed reply channel, used for
//!   blocking calls into the toolkit context with a bounded wait
//! - **Thread affinity**: checks that toolkit state is only read on its thread
//! - **Errors**: the bridge error taxonomy
//! - **Logging**: `tracing` targets, span names and macros
//! - **Configuration**: hand-off timeout, queue size, thread name
//!
//! # Hand-off Example
//!
//! ```no_run
//! use horizon_axbridge_core::{BridgeConfig, BridgeError, ToolkitContext};
//! use std::time::Duration;
//!
//! let config = BridgeConfig::builder()
//!     .handoff_timeout(Duration::from_millis(250))
//!     .build()
//!     .expect("valid config");
//! let context = ToolkitContext::with_config(&config)?;
//!
//! // Runs on the toolkit thread; the caller blocks for at most 250 ms.
//! match context.invoke_and_wait(|| 3usize) {
//!     Ok(count) => println!("{count} columns"),
//!     Err(BridgeError::CrossContextTimeout { .. }) => println!("toolkit busy"),
//!     Err(err) => println!("unavailable: {err}"),
//! }
//! # Ok::<(), BridgeError>(())
//! ```

pub mod config;
mod error;
pub mod invocation;
pub mod logging;
pub mod thread_check;
mod toolkit_context;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::{BridgeError, ConfigError, IndexKind, Result};
pub use logging::PerfSpan;
pub use thread_check::ThreadAffinity;
pub use toolkit_context::ToolkitContext;
