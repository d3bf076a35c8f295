use super::{Item, Payload};

/// A runtime item addition waiting for the post-frame drain.
///
/// Created on whichever thread requested the add, consumed exactly once on
/// the render thread. Either the item attaches fully or the request fails
/// atomically and is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdd {
    /// Name of the parent to attach under. Ignored for window items.
    pub parent: String,
    /// Sibling to insert before; `None` appends.
    pub before: Option<String>,
    pub item: Item,
}

impl PendingAdd {
    pub fn new(parent: impl Into<String>, before: Option<String>, item: Item) -> Self {
        Self {
            parent: parent.into(),
            before,
            item,
        }
    }
}

/// A callback invocation to execute on a worker thread.
///
/// The payload is owned by the job; after submission the requesting thread
/// holds nothing of it. An empty handler name makes the job a no-op, an
/// empty return handler discards the result.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncJob {
    pub handler: String,
    pub payload: Payload,
    pub return_handler: String,
}

impl AsyncJob {
    pub fn new(
        handler: impl Into<String>,
        payload: Payload,
        return_handler: impl Into<String>,
    ) -> Self {
        Self {
            handler: handler.into(),
            payload,
            return_handler: return_handler.into(),
        }
    }
}

/// The outcome of a completed async job, produced by a worker and consumed
/// exactly once by the render thread during render-prep.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncResult {
    pub return_handler: String,
    pub payload: Payload,
}
