// Callback dispatch
//
// Resolves callback names against the host scripting environment and
// invokes them without ever taking the frame down with a bad callback.
// Resolution order is an observable contract: the primary namespace is
// checked first, then every loaded namespace in order, first match wins
// even when the match turns out not to be callable.

use crate::metrics::Metrics;
use crate::models::{AsyncResult, Payload};
use crate::queues::MutationQueues;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Sender tag for async job bodies running on worker threads.
pub const ASYNC_SENDER: &str = "Async";

/// Sender tag for drained async results dispatched on the render thread.
pub const ASYNC_RETURN_SENDER: &str = "Asynchronous Callback";

/// Sender tag for the root window's render callback.
pub const MAIN_APP_SENDER: &str = "Main Application";

/// Callback resolution and invocation failures. Reported to the host error
/// channel; never fatal to the frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0}: callback doesn't exist")]
    HandlerNotFound(String),

    #[error("{0}: callback not callable")]
    NotInvocable(String),

    #[error("{0}: callback failed: {1}")]
    CallbackFailed(String, String),
}

/// An invocable handler resolved from the host environment.
#[derive(Clone)]
pub struct Invocable {
    func: Arc<dyn Fn(&str, Payload) -> Result<Payload, String> + Send + Sync>,
}

impl Invocable {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, Payload) -> Result<Payload, String> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    pub fn call(&self, sender: &str, payload: Payload) -> Result<Payload, String> {
        (self.func)(sender, payload)
    }
}

impl std::fmt::Debug for Invocable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invocable")
    }
}

/// What a namespace lookup produced.
#[derive(Debug, Clone)]
pub enum Resolved {
    Callable(Invocable),
    /// The name exists but is data, not a handler.
    NotCallable,
}

/// The host scripting environment seen by the dispatcher.
///
/// Implementations expose named namespaces of handlers and an error channel
/// for diagnostics the runtime wants the host to see. The dispatcher owns
/// the resolution policy; the host only answers per-namespace lookups.
pub trait HostEnv: Send + Sync {
    fn primary_namespace(&self) -> String;

    /// Every loaded namespace, in load order. Scanned linearly on fallback.
    fn namespaces(&self) -> Vec<String>;

    fn resolve(&self, namespace: &str, handler: &str) -> Option<Resolved>;

    /// Surface a diagnostic to the host. Must not panic.
    fn report_error(&self, message: &str);
}

/// Routes named callbacks into the host environment.
///
/// One dispatcher is shared between the render thread (synchronous and
/// drained-result invocations) and the worker threads (job bodies). Every
/// host call happens under the host lock, acquired per invocation and never
/// held across frames, mirroring a global-interpreter-lock discipline.
pub struct CallbackDispatcher {
    host: Arc<dyn HostEnv>,
    host_lock: Mutex<()>,
    queues: MutationQueues,
    metrics: Arc<Metrics>,
}

impl CallbackDispatcher {
    pub fn new(host: Arc<dyn HostEnv>, queues: MutationQueues, metrics: Arc<Metrics>) -> Self {
        Self {
            host,
            host_lock: Mutex::new(()),
            queues,
            metrics,
        }
    }

    /// Invoke a handler by name. An empty name is a silent no-op; every
    /// failure is reported and swallowed.
    pub fn invoke(&self, name: &str, sender: &str, payload: Payload) {
        if name.is_empty() {
            return;
        }
        if let Err(error) = self.call(name, sender, payload) {
            self.report_dispatch_error(&error);
        }
    }

    /// Like [`invoke`](Self::invoke), but a successful call's result is
    /// enqueued for the named return handler, to be dispatched during a
    /// later frame's render-prep.
    pub fn invoke_with_return(
        &self,
        name: &str,
        sender: &str,
        payload: Payload,
        return_handler: &str,
    ) {
        if name.is_empty() {
            return;
        }
        match self.call(name, sender, payload) {
            Ok(result) => self.queue_return(return_handler, result),
            Err(error) => self.report_dispatch_error(&error),
        }
    }

    /// Execute an async job body. Runs on worker threads with the
    /// [`ASYNC_SENDER`] tag.
    pub fn run_job(&self, job: crate::models::AsyncJob) {
        if job.handler.is_empty() {
            return;
        }
        match self.call(&job.handler, ASYNC_SENDER, job.payload) {
            Ok(result) => self.queue_return(&job.return_handler, result),
            Err(error) => self.report_dispatch_error(&error),
        }
    }

    /// Surface a structural or callback diagnostic to the host.
    pub fn report_error(&self, message: &str) {
        tracing::error!("{message}");
        self.host.report_error(message);
    }

    fn report_dispatch_error(&self, error: &DispatchError) {
        self.metrics.record_callback_error();
        self.report_error(&error.to_string());
    }

    fn queue_return(&self, return_handler: &str, result: Payload) {
        if return_handler.is_empty() {
            return;
        }
        self.queues.push_result(AsyncResult {
            return_handler: return_handler.to_string(),
            payload: result,
        });
    }

    fn call(&self, name: &str, sender: &str, payload: Payload) -> Result<Payload, DispatchError> {
        // Interpreter-style lock: resolution and invocation are one
        // critical section per call.
        let _host = self.host_lock.lock().unwrap();

        let handler = self.resolve(name)?;
        self.metrics.record_callback_invoked();
        handler
            .call(sender, payload)
            .map_err(|message| DispatchError::CallbackFailed(name.to_string(), message))
    }

    /// Primary namespace first, then a linear scan of all loaded namespaces.
    /// The first name match wins, callable or not.
    fn resolve(&self, name: &str) -> Result<Invocable, DispatchError> {
        let primary = self.host.primary_namespace();

        let mut found = self.host.resolve(&primary, name);
        if found.is_none() {
            for namespace in self.host.namespaces() {
                if namespace == primary {
                    continue;
                }
                found = self.host.resolve(&namespace, name);
                if found.is_some() {
                    break;
                }
            }
        }

        match found {
            Some(Resolved::Callable(handler)) => Ok(handler),
            Some(Resolved::NotCallable) => Err(DispatchError::NotInvocable(name.to_string())),
            None => Err(DispatchError::HandlerNotFound(name.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Handler(Invocable),
    Value(#[allow(dead_code)] Payload),
}

/// In-crate [`HostEnv`] backed by insertion-ordered namespaces of Rust
/// closures. Serves the demo binary and the tests; a real scripting host
/// replaces it behind the same trait.
#[derive(Default)]
pub struct ScriptRegistry {
    namespaces: RwLock<IndexMap<String, IndexMap<String, Slot>>>,
    errors: Mutex<Vec<String>>,
}

impl ScriptRegistry {
    /// Name of the namespace checked first during resolution.
    pub const PRIMARY: &'static str = "main";

    pub fn new() -> Self {
        let registry = Self::default();
        registry
            .namespaces
            .write()
            .unwrap()
            .insert(Self::PRIMARY.to_string(), IndexMap::new());
        registry
    }

    /// Register a handler. The namespace is created on first use.
    pub fn register<F>(&self, namespace: &str, handler: &str, func: F)
    where
        F: Fn(&str, Payload) -> Result<Payload, String> + Send + Sync + 'static,
    {
        self.namespaces
            .write()
            .unwrap()
            .entry(namespace.to_string())
            .or_default()
            .insert(handler.to_string(), Slot::Handler(Invocable::new(func)));
    }

    /// Register a plain value under a name; resolving it yields
    /// [`Resolved::NotCallable`].
    pub fn register_value(&self, namespace: &str, name: &str, value: Payload) {
        self.namespaces
            .write()
            .unwrap()
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), Slot::Value(value));
    }

    /// Diagnostics reported so far, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn clear_errors(&self) {
        self.errors.lock().unwrap().clear();
    }
}

impl HostEnv for ScriptRegistry {
    fn primary_namespace(&self) -> String {
        Self::PRIMARY.to_string()
    }

    fn namespaces(&self) -> Vec<String> {
        self.namespaces.read().unwrap().keys().cloned().collect()
    }

    fn resolve(&self, namespace: &str, handler: &str) -> Option<Resolved> {
        let namespaces = self.namespaces.read().unwrap();
        match namespaces.get(namespace)?.get(handler)? {
            Slot::Handler(invocable) => Some(Resolved::Callable(invocable.clone())),
            Slot::Value(_) => Some(Resolved::NotCallable),
        }
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
