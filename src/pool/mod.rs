// Worker pool
//
// Fixed set of OS threads pulling boxed tasks from a shared queue. The pool
// itself is lifecycle-agnostic: lazy creation and idle-based teardown are
// the frame scheduler's decisions, the pool only exposes the idleness
// accounting those decisions need.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A unit of work for a pool thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// How many threads the pool spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolSize {
    Fixed(usize),
    /// Size to the hardware's available concurrency.
    HighPerformance,
}

impl PoolSize {
    fn thread_count(self) -> usize {
        match self {
            PoolSize::Fixed(count) => count.max(1),
            PoolSize::HighPerformance => thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
        }
    }
}

/// Shared task queue with a condvar for idle workers.
struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    ready: Condvar,
    shutdown: AtomicBool,
}

impl TaskQueue {
    fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    fn push(&self, task: Task) {
        self.tasks.lock().unwrap().push_back(task);
        self.ready.notify_one();
    }

    /// Block until a task arrives or shutdown is signalled.
    fn next_task(&self) -> Option<Task> {
        let mut tasks = self.tasks.lock().unwrap();
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                return None;
            }
            if let Some(task) = tasks.pop_front() {
                return Some(task);
            }
            // Timed wait so a missed notify cannot strand a worker during
            // shutdown.
            let (guard, _) = self
                .ready
                .wait_timeout(tasks, Duration::from_millis(100))
                .unwrap();
            tasks = guard;
        }
    }

    fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.ready.notify_all();
    }
}

/// Pool of worker threads executing submitted callback work.
///
/// `submit` never blocks the caller beyond the queue's mutex. Workers count
/// in-flight tasks so [`is_idle`](Self::is_idle) can answer "no pending and
/// no running work", the condition the scheduler requires before teardown.
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    workers: Vec<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("pending", &self.pending_tasks())
            .field("active", &self.active_tasks())
            .finish()
    }
}

impl WorkerPool {
    pub fn new(size: PoolSize) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let active = Arc::new(AtomicUsize::new(0));
        let count = size.thread_count();

        let workers = (0..count)
            .map(|index| {
                let queue = Arc::clone(&queue);
                let active = Arc::clone(&active);
                thread::Builder::new()
                    .name(format!("imframe-worker-{index}"))
                    .spawn(move || {
                        while let Some(task) = queue.next_task() {
                            active.fetch_add(1, Ordering::SeqCst);
                            task();
                            active.fetch_sub(1, Ordering::SeqCst);
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        tracing::info!("worker pool created with {} threads", count);

        Self {
            queue,
            workers,
            active,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a task for the next available worker. Never blocks.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(task));
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn active_tasks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// No queued work and nothing running.
    pub fn is_idle(&self) -> bool {
        self.pending_tasks() == 0 && self.active_tasks() == 0
    }

    /// Signal workers and join them. Running tasks finish first.
    pub fn shutdown(&mut self) {
        self.queue.signal_shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
