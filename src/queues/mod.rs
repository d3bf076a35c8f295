// Mutation queues
//
// The only cross-thread shared resources in the runtime. Every structural
// change and every async submission/result lands in one of these FIFO queues
// and is consumed exactly once per frame by the scheduler on the render
// thread. Each queue has its own mutex; critical sections are O(1)
// enqueue/dequeue work, so producers never wait long and the render thread
// never blocks on a slow producer.

use crate::models::{AsyncJob, AsyncResult, PendingAdd};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct QueuesInner {
    delete_children: Mutex<VecDeque<String>>,
    deletes: Mutex<VecDeque<String>>,
    adds: Mutex<VecDeque<PendingAdd>>,
    moves_up: Mutex<VecDeque<String>>,
    moves_down: Mutex<VecDeque<String>>,
    jobs: Mutex<VecDeque<AsyncJob>>,
    results: Mutex<VecDeque<AsyncResult>>,
}

/// Cloneable producer/consumer handle over the shared queues.
///
/// Clones share the same interior, so any thread holding a clone can enqueue.
/// Draining is meant to happen on the render thread only; the type does not
/// enforce that, the scheduler's ownership of the drain calls does.
///
/// Two requests enqueued by the same thread keep their relative order within
/// a queue. Requests enqueued from different threads carry no cross-queue
/// ordering guarantee.
#[derive(Debug, Clone, Default)]
pub struct MutationQueues {
    inner: Arc<QueuesInner>,
}

impl MutationQueues {
    pub fn new() -> Self {
        Self::default()
    }

    // Producer side

    pub fn queue_delete(&self, name: impl Into<String>) {
        self.inner.deletes.lock().unwrap().push_back(name.into());
    }

    pub fn queue_delete_children(&self, name: impl Into<String>) {
        self.inner
            .delete_children
            .lock()
            .unwrap()
            .push_back(name.into());
    }

    pub fn queue_add(&self, add: PendingAdd) {
        self.inner.adds.lock().unwrap().push_back(add);
    }

    pub fn queue_move_up(&self, name: impl Into<String>) {
        self.inner.moves_up.lock().unwrap().push_back(name.into());
    }

    pub fn queue_move_down(&self, name: impl Into<String>) {
        self.inner.moves_down.lock().unwrap().push_back(name.into());
    }

    pub fn submit_job(&self, job: AsyncJob) {
        self.inner.jobs.lock().unwrap().push_back(job);
    }

    pub fn push_result(&self, result: AsyncResult) {
        self.inner.results.lock().unwrap().push_back(result);
    }

    /// Whether a runtime add with this name is waiting to be drained.
    ///
    /// Lookups issued between enqueue and drain use this to see items that
    /// are requested but not yet attached.
    pub fn pending_contains(&self, name: &str) -> bool {
        self.inner
            .adds
            .lock()
            .unwrap()
            .iter()
            .any(|add| add.item.name == name)
    }

    pub fn pending_results(&self) -> usize {
        self.inner.results.lock().unwrap().len()
    }

    // Consumer side (render thread, once per frame)

    pub fn drain_delete_children(&self) -> Vec<String> {
        Self::drain(&self.inner.delete_children)
    }

    pub fn drain_deletes(&self) -> Vec<String> {
        Self::drain(&self.inner.deletes)
    }

    pub fn drain_adds(&self) -> Vec<PendingAdd> {
        Self::drain(&self.inner.adds)
    }

    pub fn drain_moves_up(&self) -> Vec<String> {
        Self::drain(&self.inner.moves_up)
    }

    pub fn drain_moves_down(&self) -> Vec<String> {
        Self::drain(&self.inner.moves_down)
    }

    pub fn drain_jobs(&self) -> Vec<AsyncJob> {
        Self::drain(&self.inner.jobs)
    }

    pub fn drain_results(&self) -> Vec<AsyncResult> {
        Self::drain(&self.inner.results)
    }

    fn drain<T>(queue: &Mutex<VecDeque<T>>) -> Vec<T> {
        // Take the whole queue in one short critical section; the caller
        // iterates outside the lock.
        std::mem::take(&mut *queue.lock().unwrap()).into()
    }
}
