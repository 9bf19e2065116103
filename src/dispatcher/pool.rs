//! Bounded pool of background request workers.
//!
//! A fixed number of named threads pull jobs from one channel. Jobs queue
//! in the channel while every worker is busy, which bounds thread usage
//! under request storms.

use crate::error::BridgeError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often `shutdown_timeout` checks for finished workers.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size worker pool.
#[derive(Debug)]
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Starts `size` workers named `{name}-{index}`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Configuration` if `size` is zero, or
    /// `BridgeError::WorkerSpawn` if a thread cannot be started. Workers
    /// started before the failure exit once the pool is dropped.
    pub fn new(size: usize, name: &str) -> Result<Self, BridgeError> {
        if size == 0 {
            return Err(BridgeError::configuration(
                "worker_threads",
                "must be greater than 0",
            ));
        }

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let receiver = Arc::clone(&receiver);
            let worker = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || worker_loop(&receiver))
                .map_err(|e| BridgeError::worker_spawn(e.to_string()))?;
            workers.push(worker);
        }

        tracing::debug!(workers = size, "request worker pool started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size,
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues `job` for the next free worker. Returns false if the pool has
    /// been shut down, in which case the job is dropped unrun.
    pub fn execute(&self, job: Job) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        }
    }

    /// Stops accepting jobs without waiting for the workers. Jobs already
    /// queued still run; each worker exits once the channel drains.
    /// Returns false if the pool was already closed.
    pub fn close(&self) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let was_open = sender.is_some();
        drop(sender);
        if was_open {
            tracing::debug!("request worker pool closed");
        }
        was_open
    }

    /// Closes the pool and waits up to `timeout` for every worker to exit.
    ///
    /// Returns true if all workers finished in time. Workers still blocked
    /// on the network are left to exit on their own.
    pub fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.close();
        let deadline = Instant::now() + timeout;
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                workers.drain(..).partition(JoinHandle::is_finished);
            *workers = running;
            for worker in finished {
                if worker.join().is_err() {
                    tracing::warn!("request worker panicked before shutdown");
                }
            }

            if workers.is_empty() {
                tracing::debug!("request worker pool stopped");
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    running = workers.len(),
                    "request workers still busy at shutdown deadline"
                );
                return false;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers are detached, not joined, so dropping never blocks on the
        // network.
        self.close();
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let receiver = receiver.lock().unwrap_or_else(PoisonError::into_inner);
            receiver.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn zero_workers_is_rejected() {
        let error = WorkerPool::new(0, "test").unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn runs_queued_jobs() {
        let pool = WorkerPool::new(2, "test").unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let done = Arc::clone(&done);
            assert!(pool.execute(Box::new(move || {
                done.fetch_add(1, Ordering::SeqCst);
            })));
        }
        assert!(pool.shutdown_timeout(WAIT));
        assert_eq!(done.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn jobs_run_concurrently_up_to_pool_size() {
        let pool = WorkerPool::new(3, "test").unwrap();
        let barrier = Arc::new(Barrier::new(4));
        for _ in 0..3 {
            let barrier = Arc::clone(&barrier);
            pool.execute(Box::new(move || {
                barrier.wait();
            }));
        }
        // Returns only if all three jobs are running at once.
        barrier.wait();
        assert!(pool.shutdown_timeout(WAIT));
    }

    #[test]
    fn workers_are_named() {
        let pool = WorkerPool::new(1, "script-http").unwrap();
        let (tx, rx) = mpsc::channel();
        pool.execute(Box::new(move || {
            let name = thread::current().name().map(str::to_string);
            let _ = tx.send(name);
        }));
        let name = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(name.as_deref(), Some("script-http-0"));
    }

    #[test]
    fn execute_after_close_is_refused() {
        let pool = WorkerPool::new(1, "test").unwrap();
        assert!(pool.close());
        assert!(!pool.close());
        assert!(!pool.execute(Box::new(|| {})));
    }

    #[test]
    fn close_does_not_wait_for_busy_workers() {
        let pool = WorkerPool::new(1, "test").unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel();
        pool.execute(Box::new(move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }));
        started_rx.recv_timeout(WAIT).unwrap();

        let begun = Instant::now();
        pool.close();
        drop(pool);
        assert!(begun.elapsed() < Duration::from_secs(1));
        release_tx.send(()).unwrap();
    }

    #[test]
    fn shutdown_timeout_reports_busy_workers() {
        let pool = WorkerPool::new(1, "test").unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel();
        pool.execute(Box::new(move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }));
        started_rx.recv_timeout(WAIT).unwrap();

        assert!(!pool.shutdown_timeout(Duration::from_millis(50)));
        release_tx.send(()).unwrap();
        assert!(pool.shutdown_timeout(WAIT));
    }
}
