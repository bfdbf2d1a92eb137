//! # Runtime
//!
//! [Tokio](https://tokio.rs) runtime profiles for the scene host.
//!
//! * [`RuntimeConfig::client`]: multi-threaded and sized for many concurrently running scene
//!   sandboxes. Sandboxes are parked most of the time, so idle threads are kept warm.
//! * [`RuntimeConfig::single_threaded`]: everything on the calling thread; used by tools and
//!   deterministic replays.
//!
//! `TOKIO_WORKER_THREADS` overrides the detected worker count.
//!
//! ```rust,ignore
//! #[plaza_runtime::main(client)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use plaza_derive::main;

use anyhow::Context;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const MIB: usize = 1024 * 1024;
const STACK_SIZES: RangeInclusive<usize> = MIB..=16 * MIB;
const WORKER_THREADS: RangeInclusive<usize> = 1..=1024;
const FALLBACK_WORKER_THREADS: usize = 4;
const DEFAULT_THREAD_NAME: &str = "plaza-worker";

/// Worker count from `TOKIO_WORKER_THREADS`, else the available parallelism.
fn detected_worker_threads() -> usize {
    static DETECTED: OnceLock<usize> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|threads| WORKER_THREADS.contains(threads))
            .unwrap_or_else(|| {
                available_parallelism().map_or(FALLBACK_WORKER_THREADS, std::num::NonZero::get)
            })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    MultiThread,
    CurrentThread,
}

/// Settings of a tokio runtime. Out-of-range values are clamped when the runtime is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub flavor: Flavor,
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::MultiThread,
            worker_threads: detected_worker_threads(),
            stack_size: 2 * MIB,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(10),
        }
    }
}

impl RuntimeConfig {
    /// Scene host client: at least two workers, so the scene engine never shares its only
    /// thread with a busy sandbox.
    #[must_use]
    pub fn client() -> Self {
        Self {
            worker_threads: detected_worker_threads().max(2),
            stack_size: 4 * MIB,
            thread_name: "plaza-client".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn single_threaded() -> Self {
        Self {
            flavor: Flavor::CurrentThread,
            worker_threads: 1,
            thread_name: "plaza-main".to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    #[must_use]
    pub const fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Copy with every value inside its supported range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let name = self.thread_name.trim();
        Self {
            flavor: self.flavor,
            worker_threads: self.worker_threads.clamp(*WORKER_THREADS.start(), *WORKER_THREADS.end()),
            stack_size: self.stack_size.clamp(*STACK_SIZES.start(), *STACK_SIZES.end()),
            thread_name: if name.is_empty() { DEFAULT_THREAD_NAME } else { name }.to_owned(),
            thread_keep_alive: self.thread_keep_alive,
        }
    }

    /// Builds the runtime with every driver enabled.
    ///
    /// # Errors
    /// Returns an error if the OS refuses to create the runtime threads.
    pub fn build(&self) -> Result<Runtime> {
        let config = self.normalized();
        debug!(?config, "Building tokio runtime");

        let mut builder = match config.flavor {
            Flavor::MultiThread => {
                let mut builder = Builder::new_multi_thread();
                builder.worker_threads(config.worker_threads);
                builder
            },
            Flavor::CurrentThread => Builder::new_current_thread(),
        };
        builder
            .thread_name(config.thread_name)
            .thread_stack_size(config.stack_size)
            .thread_keep_alive(config.thread_keep_alive)
            .enable_all()
            .build()
            .context("Failed to initialize runtime")
    }
}

/// Entry point used by `#[plaza_runtime::main]`.
///
/// # Errors
/// See [`RuntimeConfig::build`].
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    config.build()
}
