// Data model for the runtime
//
// Plain data types shared across the tree, queues, pool and dispatcher:
// items, callback payloads, and the deferred-mutation records.

pub mod item;
pub mod payload;
pub mod requests;

pub use item::{EventCallbacks, FrameState, Item, ItemKind};
pub use payload::Payload;
pub use requests::{AsyncJob, AsyncResult, PendingAdd};
