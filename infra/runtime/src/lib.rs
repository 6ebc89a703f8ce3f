//! # Runtime
//!
//! Tokio runtime presets for DayQHI binaries.
//!
//! ```rust,ignore
//! #[dayqhi_runtime::main(high_performance)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use dayqhi_derive::main;

use anyhow::anyhow;
use std::num::NonZero;
use std::sync::OnceLock;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const FALLBACK_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
/// 3 `MiB`
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_THREAD_NAME: &str = "dayqhi-worker";

static DETECTED_WORKERS: OnceLock<usize> = OnceLock::new();

/// Worker count from `TOKIO_WORKER_THREADS`, falling back to available parallelism.
fn detected_workers() -> usize {
    *DETECTED_WORKERS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|n| (1..=MAX_WORKER_THREADS).contains(n))
            .unwrap_or_else(|| {
                available_parallelism().map_or(FALLBACK_WORKER_THREADS, NonZero::get)
            })
    })
}

fn thread_name_or_default(name: String) -> String {
    if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name }
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detected_workers(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Preset for the HTTP server.
    #[must_use]
    pub fn high_performance() -> Self {
        Self {
            stack_size: 4 * 1024 * 1024,
            thread_name: "dayqhi-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            ..Self::default()
        }
    }

    /// Preset for tools and constrained hosts.
    #[must_use]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (detected_workers() / 2).max(1),
            stack_size: 2 * 1024 * 1024,
            thread_name: "dayqhi-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = thread_name_or_default(name.into());
        self
    }

    #[must_use]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    /// Re-applies the builder bounds to a config that may have been assembled by hand.
    fn normalized(&self) -> Self {
        Self {
            worker_threads: self.worker_threads.clamp(1, MAX_WORKER_THREADS),
            stack_size: self.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE),
            thread_name: thread_name_or_default(self.thread_name.clone()),
            thread_keep_alive: self.thread_keep_alive,
        }
    }
}

/// Builds a multi-threaded runtime with I/O and timers enabled.
///
/// # Errors
///
/// Returns an error if the OS refuses to create the worker threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}
