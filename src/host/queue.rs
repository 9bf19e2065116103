//! In-process task queue drained by the host's frame loop.
//!
//! Background workers push tasks from any thread; the main thread calls
//! [`LocalTaskQueue::run_pending`] once per frame, which never blocks.
//! Tasks run outside the queue lock so a task may post further tasks.

use super::{HostTask, TaskQueue};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A FIFO [`TaskQueue`] owned by the host thread.
#[derive(Default)]
pub struct LocalTaskQueue {
    tasks: Mutex<VecDeque<HostTask>>,
    available: Condvar,
}

impl fmt::Debug for LocalTaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl LocalTaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HostTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Runs every task queued at the time of the call. Returns how many ran.
    ///
    /// Tasks posted while draining wait for the next call, so one frame
    /// cannot be held up indefinitely.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<HostTask> = self.lock().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Blocks until at least `count` tasks are queued or `timeout` elapses.
    /// Returns true if the tasks arrived.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut tasks = self.lock();
        while tasks.len() < count {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tasks = match self.available.wait_timeout(tasks, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }

    /// Waits up to `timeout` for one task and runs it. Returns true if a
    /// task ran.
    pub fn run_next(&self, timeout: Duration) -> bool {
        if !self.wait_for(1, timeout) {
            return false;
        }
        let task = self.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl TaskQueue for LocalTaskQueue {
    fn add_task(&self, task: HostTask) {
        self.lock().push_back(task);
        self.available.notify_all();
    }
}
