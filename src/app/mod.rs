// Application context and frame scheduler
//
// `App` owns the item tree and runs the per-frame pipeline. The tree is
// only ever touched between draws, on the thread that created the App;
// everything arriving from elsewhere goes through the mutation queues
// and is applied during the post-frame drain in a fixed order.

use crate::backend::{Clock, RenderBackend, Theme};
use crate::config::RuntimeConfig;
use crate::dispatch::{
    ASYNC_RETURN_SENDER, CallbackDispatcher, HostEnv, MAIN_APP_SENDER,
};
use crate::input::{InputFrame, InputRouter};
use crate::metrics::Metrics;
use crate::models::{AsyncJob, Item, ItemKind, Payload, PendingAdd};
use crate::pool::{PoolSize, WorkerPool};
use crate::queues::MutationQueues;
use crate::tree::{ItemTree, TreeError};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;
use thiserror::Error;

/// Name of the root window, created at startup and used as the input
/// target when no other window is active.
pub const ROOT_WINDOW: &str = "MainWindow";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("structural operations must run on the render thread")]
    WrongThread,

    #[error("parent stack is empty")]
    EmptyParentStack,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// The application context.
///
/// Owns the item tree, timing, the render backend and the worker pool
/// lifecycle. Not a singleton: callers construct one and keep it on the
/// render thread. Queue handles from [`queues`](Self::queues) and the
/// job submission path are the only pieces other threads may use.
pub struct App {
    tree: ItemTree,
    queues: MutationQueues,
    dispatcher: Arc<CallbackDispatcher>,
    renderer: Box<dyn RenderBackend>,
    clock: Box<dyn Clock>,
    metrics: Arc<Metrics>,
    router: InputRouter,
    config: RuntimeConfig,

    pool: Option<WorkerPool>,
    /// When the pool's queue was last observed empty, while it stays empty.
    pool_idle_since: Option<Duration>,

    parent_stack: Vec<String>,
    started: bool,
    first_frame_done: bool,

    active_window: String,
    style: crate::backend::StyleTable,
    style_changed: bool,
    global_scale: f32,

    time: f64,
    delta: f64,
    last_frame_at: Option<Duration>,
    frame_count: u64,

    render_thread: ThreadId,
}

impl App {
    /// Build an application context on the current thread. The root window
    /// is attached and pushed as the implicit parent scope.
    pub fn new(
        config: RuntimeConfig,
        host: Arc<dyn HostEnv>,
        renderer: Box<dyn RenderBackend>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let queues = MutationQueues::new();
        let metrics = Arc::new(Metrics::new());
        let dispatcher = Arc::new(CallbackDispatcher::new(
            host,
            queues.clone(),
            Arc::clone(&metrics),
        ));

        let mut tree = ItemTree::new();
        let root = Item::window(ROOT_WINDOW, config.root_width, config.root_height);
        // The root name is fresh in an empty tree.
        let _ = tree.attach_window(root);

        let style = Theme::from_name(&config.theme)
            .unwrap_or(Theme::Dark)
            .style();

        Self {
            tree,
            queues,
            dispatcher,
            renderer,
            clock,
            metrics,
            router: InputRouter::new(config.mouse_drag_threshold),
            global_scale: config.global_scale,
            config,
            pool: None,
            pool_idle_since: None,
            parent_stack: vec![ROOT_WINDOW.to_string()],
            started: false,
            first_frame_done: false,
            active_window: ROOT_WINDOW.to_string(),
            style,
            style_changed: false,
            time: 0.0,
            delta: 0.0,
            last_frame_at: None,
            frame_count: 0,
            render_thread: thread::current().id(),
        }
    }

    // ---- build phase -------------------------------------------------

    /// Add an item under the current parent scope. Before [`start`](Self::start)
    /// this attaches directly; afterwards it is queued for the next
    /// post-frame drain.
    pub fn add_item(&mut self, item: Item) -> Result<(), AppError> {
        self.ensure_render_thread()?;

        if self.started {
            let parent = self
                .parent_stack
                .last()
                .cloned()
                .unwrap_or_else(|| self.active_window.clone());
            self.queues.queue_add(PendingAdd::new(parent, None, item));
            return Ok(());
        }

        if item.kind == ItemKind::Window {
            self.tree.attach_window(item)?;
            return Ok(());
        }

        let parent = self
            .parent_stack
            .last()
            .ok_or(AppError::EmptyParentStack)?
            .clone();
        self.tree.insert(&parent, None, item)?;
        Ok(())
    }

    /// Open a parent scope; subsequent build-phase adds land under `name`.
    pub fn push_parent(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.parent_stack.push(name.into());
        Ok(())
    }

    /// Close the innermost parent scope.
    pub fn pop_parent(&mut self) -> Result<String, AppError> {
        self.ensure_render_thread()?;
        self.parent_stack.pop().ok_or(AppError::EmptyParentStack)
    }

    /// End the build phase. Structural changes made after this point are
    /// queued instead of applied directly.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            tracing::info!("runtime phase started");
        }
    }

    // ---- runtime mutation producers ----------------------------------

    /// Queue a runtime item addition for the next post-frame drain.
    pub fn add_runtime_item(
        &mut self,
        parent: impl Into<String>,
        before: Option<String>,
        item: Item,
    ) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.queues.queue_add(PendingAdd::new(parent, before, item));
        Ok(())
    }

    /// Queue an item (or whole window) deletion.
    pub fn delete_item(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.queues.queue_delete(name);
        Ok(())
    }

    /// Queue removal of an item's children, keeping the item itself.
    pub fn delete_children(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.queues.queue_delete_children(name);
        Ok(())
    }

    /// Queue a swap with the previous sibling.
    pub fn move_item_up(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.queues.queue_move_up(name);
        Ok(())
    }

    /// Queue a swap with the next sibling.
    pub fn move_item_down(&mut self, name: impl Into<String>) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        self.queues.queue_move_down(name);
        Ok(())
    }

    /// Submit a handler to run on the worker pool. Safe from any thread
    /// via a cloned [`queues`](Self::queues) handle; provided here for the
    /// render thread's own use.
    pub fn run_async(
        &self,
        handler: impl Into<String>,
        payload: Payload,
        return_handler: impl Into<String>,
    ) {
        self.queues.submit_job(AsyncJob::new(handler, payload, return_handler));
    }

    // ---- appearance and windows --------------------------------------

    /// Switch to a theme preset. Before the first frame this is recorded
    /// and applied during frame one; afterwards it takes effect on the
    /// next frame's render-prep.
    pub fn set_theme(&mut self, theme: Theme) {
        self.style = theme.style();
        if self.first_frame_done {
            self.style.fill_defaults();
            self.style_changed = true;
        }
    }

    /// Override a single style color slot.
    pub fn set_style_color(&mut self, slot: &str, color: crate::backend::Color) {
        self.style.set(slot, color);
        if self.first_frame_done {
            self.style_changed = true;
        }
    }

    pub fn set_global_scale(&mut self, scale: f32) {
        self.global_scale = scale;
    }

    pub fn set_active_window(&mut self, name: impl Into<String>) {
        self.active_window = name.into();
    }

    pub fn active_window(&self) -> &str {
        &self.active_window
    }

    /// Attach a per-frame render callback to a window.
    pub fn set_render_callback(
        &mut self,
        window: &str,
        callback: impl Into<String>,
    ) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        let item = self.tree.find_mut(window).ok_or(TreeError::NotFound {
            name: window.to_string(),
        })?;
        item.render_callback = Some(callback.into());
        Ok(())
    }

    // ---- queries -----------------------------------------------------

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.tree.find(name)
    }

    pub fn item_mut(&mut self, name: &str) -> Result<Option<&mut Item>, AppError> {
        self.ensure_render_thread()?;
        Ok(self.tree.find_mut(name))
    }

    /// Whether `name` sits in the pending-add queue, visible between
    /// enqueue and drain.
    pub fn find_pending(&self, name: &str) -> bool {
        self.queues.pending_contains(name)
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    /// Cheap handle other threads may use to queue mutations and jobs.
    pub fn queues(&self) -> MutationQueues {
        self.queues.clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn pool_active(&self) -> bool {
        self.pool.is_some()
    }

    /// Whether the pool exists with nothing queued or running.
    pub fn pool_idle(&self) -> bool {
        self.pool.as_ref().is_some_and(WorkerPool::is_idle)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn delta_time(&self) -> f64 {
        self.delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ---- frame pipeline ----------------------------------------------

    /// Run one frame: render-prep, draw, then the post-frame drain.
    pub fn frame(&mut self, input: &InputFrame) -> Result<(), AppError> {
        self.ensure_render_thread()?;
        let frame_start = self.clock.now();

        if !self.first_frame_done {
            self.first_render_frame();
        }

        self.maybe_teardown_pool(frame_start);
        self.render_prep(frame_start, input);

        self.renderer.draw_frame(&self.tree);
        self.tree.reset_frame_state();

        self.post_frame_drain();

        self.frame_count += 1;
        self.metrics
            .record_frame(self.clock.now().saturating_sub(frame_start));
        Ok(())
    }

    /// Gracefully stop background work and log the run's metrics.
    pub fn shutdown(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
            self.metrics.record_pool_destroyed();
        }
        self.pool_idle_since = None;
        self.metrics.log_summary();
    }

    fn ensure_render_thread(&self) -> Result<(), AppError> {
        if thread::current().id() != self.render_thread {
            return Err(AppError::WrongThread);
        }
        Ok(())
    }

    /// One-time setup folded into frame one: complete the style table,
    /// apply it, and close the implicit root parent scope if the caller
    /// never did.
    fn first_render_frame(&mut self) {
        self.first_frame_done = true;
        self.started = true;

        self.style.fill_defaults();
        self.style_changed = true;

        if self.tree.window_count() == 1 && self.parent_stack.len() == 1 {
            self.parent_stack.pop();
        }
    }

    fn maybe_teardown_pool(&mut self, now: Duration) {
        let timeout = Duration::from_secs_f64(self.config.pool_timeout_secs);
        let expired = matches!(
            self.pool_idle_since,
            Some(since) if now.saturating_sub(since) > timeout
        );
        if !expired {
            return;
        }

        if let Some(mut pool) = self.pool.take() {
            if pool.is_idle() {
                pool.shutdown();
                self.pool_idle_since = None;
                self.metrics.record_pool_destroyed();
                tracing::info!("worker pool destroyed after idle timeout");
            } else {
                // A handle submitted work since the timer was last
                // refreshed; keep the pool and let the drain re-arm it.
                self.pool = Some(pool);
                self.pool_idle_since = None;
            }
        }
    }

    fn render_prep(&mut self, now: Duration, input: &InputFrame) {
        let last = self.last_frame_at.unwrap_or(now);
        self.delta = now.saturating_sub(last).as_secs_f64();
        self.time = now.as_secs_f64();
        self.last_frame_at = Some(now);

        self.renderer.set_global_scale(self.global_scale);

        for result in self.queues.drain_results() {
            self.dispatcher
                .invoke(&result.return_handler, ASYNC_RETURN_SENDER, result.payload);
        }

        if self.style_changed {
            self.renderer.apply_style(&self.style);
            self.style_changed = false;
        }

        // A vanished active window falls back to the root.
        if self.tree.find(&self.active_window).is_none() {
            self.active_window = ROOT_WINDOW.to_string();
        }
        let window_name = self.active_window.clone();

        if let Some(handler) = self.tree.find(&window_name) {
            self.router
                .route(handler, &window_name, input, &self.dispatcher);

            if let Some(callback) = handler.render_callback.clone() {
                let sender = if window_name == ROOT_WINDOW {
                    MAIN_APP_SENDER
                } else {
                    window_name.as_str()
                };
                self.dispatcher.invoke(&callback, sender, Payload::Empty);
            }
        }
    }

    /// Apply every queued structural mutation, then hand queued jobs to
    /// the pool. The order across queue kinds is fixed: children
    /// deletions, deletions, adds, moves up, moves down, job submission,
    /// idle-timer refresh.
    fn post_frame_drain(&mut self) {
        for name in self.queues.drain_delete_children() {
            if self.tree.remove_children_of(&name) {
                self.metrics.record_mutation_applied();
            } else {
                self.metrics.record_mutation_rejected();
                tracing::debug!("children of {name} not deleted, item not found");
            }
        }

        for name in self.queues.drain_deletes() {
            if self.tree.remove(&name) {
                self.metrics.record_mutation_applied();
            } else {
                self.metrics.record_mutation_rejected();
                self.dispatcher
                    .report_error(&format!("{name} not deleted because it was not found"));
            }
        }

        for pending in self.queues.drain_adds() {
            let name = pending.item.name.clone();
            let result = if pending.item.kind == ItemKind::Window {
                self.tree.attach_window(pending.item)
            } else {
                self.tree
                    .insert(&pending.parent, pending.before.as_deref(), pending.item)
            };
            match result {
                Ok(()) => self.metrics.record_mutation_applied(),
                Err(error @ TreeError::DuplicateName { .. }) => {
                    self.metrics.record_mutation_rejected();
                    self.dispatcher.report_error(&error.to_string());
                }
                Err(TreeError::NotFound { .. }) => {
                    self.metrics.record_mutation_rejected();
                    self.dispatcher.report_error(&format!(
                        "{name} not added because its parent was not found"
                    ));
                }
            }
        }

        for name in self.queues.drain_moves_up() {
            self.apply_move(&name, true);
        }
        for name in self.queues.drain_moves_down() {
            self.apply_move(&name, false);
        }

        let jobs = self.queues.drain_jobs();
        if !jobs.is_empty() {
            if self.pool.is_none() {
                let size = if self.config.high_performance {
                    PoolSize::HighPerformance
                } else {
                    PoolSize::Fixed(self.config.threads)
                };
                self.pool = Some(WorkerPool::new(size));
                self.metrics.record_pool_created();
            }

            if let Some(pool) = &self.pool {
                for job in jobs {
                    self.metrics.record_job_submitted();
                    let dispatcher = Arc::clone(&self.dispatcher);
                    pool.submit(move || dispatcher.run_job(job));
                }
            }
        }

        // Idle time counts from the moment the pool was last seen with
        // nothing queued or running.
        if let Some(pool) = &self.pool {
            if pool.is_idle() {
                if self.pool_idle_since.is_none() {
                    self.pool_idle_since = Some(self.clock.now());
                }
            } else {
                self.pool_idle_since = None;
            }
        }
    }

    fn apply_move(&mut self, name: &str, up: bool) {
        let moved = if up {
            self.tree.move_up(name)
        } else {
            self.tree.move_down(name)
        };

        if moved {
            self.metrics.record_mutation_applied();
        } else if self.tree.find(name).is_none() {
            self.metrics.record_mutation_rejected();
            self.dispatcher
                .report_error(&format!("{name} not moved because it was not found"));
        }
        // Present but at the boundary: silent no-op.
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}
