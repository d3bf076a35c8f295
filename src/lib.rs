// imframe - per-frame mutation scheduler and async callback runtime
//
// This is the library crate containing the frame scheduler, the item tree
// and the worker pool lifecycle. The binary crate (main.rs) runs a small
// headless demo loop.

pub mod app;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pool;
pub mod queues;
pub mod tree;

// Re-export commonly used types for convenience
pub use app::{App, AppError, ROOT_WINDOW};
pub use backend::{Clock, ManualClock, NullRenderer, RenderBackend, StyleTable, SystemClock, Theme};
pub use config::{ConfigManager, RuntimeConfig};
pub use dispatch::{CallbackDispatcher, DispatchError, HostEnv, Invocable, Resolved, ScriptRegistry};
pub use input::{InputFrame, InputRouter};
pub use metrics::Metrics;
pub use models::{AsyncJob, AsyncResult, Item, ItemKind, Payload, PendingAdd};
pub use pool::{PoolSize, WorkerPool};
pub use queues::MutationQueues;
pub use tree::{ItemTree, TreeError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
