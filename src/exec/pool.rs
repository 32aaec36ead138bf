//! A bounded, condition-variable-woken worker pool.
//!
//! Direct port of `AssetForge/util.py::ThreadPool`: a FIFO job queue and
//! the shutdown flag behind one lock, one `Condvar` workers wait on, a
//! fixed set of worker threads spawned once at construction. Not a
//! work-stealing pool like `rayon` — that isn't what the reference
//! implementation does, and the spec pins this shape down explicitly (§5).
//! The job queue and the shutdown flag share a single mutex (`Queue`)
//! rather than two separate locks, matching the original's one
//! `threading.Condition` guarding both `job_queue` and `_shutdown` — a
//! worker's check-then-wait and `shutdown()`'s set-then-notify have to
//! serialize through the same lock or a wakeup can be lost.
//!
//! Threads are spawned through [`std::thread::scope`] rather than
//! `std::thread::spawn`, so jobs can safely borrow the registry/plan/log
//! sink of the enclosing `run_parallel` call instead of requiring an
//! `Arc`-wrapped or `'static` registry.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::Scope;

use parking_lot::{Condvar, Mutex};

type Job<'scope> = Box<dyn FnOnce() + Send + 'scope>;

struct Queue<'scope> {
    jobs: VecDeque<Job<'scope>>,
    shutdown: bool,
}

struct Shared<'scope> {
    queue: Mutex<Queue<'scope>>,
    condvar: Condvar,
    in_flight: AtomicUsize,
    idle_condvar: Condvar,
}

/// A fixed-size pool of worker threads draining a bounded FIFO queue,
/// scoped to the lifetime of one [`std::thread::scope`] call.
pub struct WorkerPool<'scope> {
    shared: Arc<Shared<'scope>>,
}

impl<'scope> WorkerPool<'scope> {
    /// Spawns `num_threads` worker threads onto `scope`. The reference
    /// implementation sizes `num_threads` to the widest job-layer in the
    /// plan (§5), not to available hardware parallelism.
    pub fn new<'env>(scope: &'scope Scope<'scope, 'env>, num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
            in_flight: AtomicUsize::new(0),
            idle_condvar: Condvar::new(),
        });

        for _ in 0..num_threads {
            let shared = Arc::clone(&shared);
            scope.spawn(move || Self::worker_loop(shared));
        }

        Self { shared }
    }

    fn worker_loop(shared: Arc<Shared<'scope>>) {
        loop {
            let job = {
                let mut queue = shared.queue.lock();
                loop {
                    if let Some(job) = queue.jobs.pop_front() {
                        break Some(job);
                    }
                    if queue.shutdown {
                        return;
                    }
                    shared.condvar.wait(&mut queue);
                }
            };

            if let Some(job) = job {
                job();
                // Decrement under the queue lock so `wait_all`'s
                // check-then-wait on the same mutex can't race a
                // notification sent between its predicate check and the
                // `Condvar::wait` call (a lost wakeup would hang it
                // forever once the queue is empty and no further jobs are
                // submitted).
                let _queue = shared.queue.lock();
                if shared.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                    shared.idle_condvar.notify_all();
                }
            }
        }
    }

    /// Submits a job to the queue and wakes one waiting worker.
    pub fn submit(&self, job: impl FnOnce() + Send + 'scope) {
        self.shared.in_flight.fetch_add(1, Ordering::SeqCst);
        self.shared.queue.lock().jobs.push_back(Box::new(job));
        self.shared.condvar.notify_one();
    }

    /// Blocks until the queue is empty and every submitted job has
    /// finished running.
    pub fn wait_all(&self) {
        let mut queue = self.shared.queue.lock();
        while self.shared.in_flight.load(Ordering::SeqCst) > 0 {
            self.shared.idle_condvar.wait(&mut queue);
        }
    }

    /// Signals every worker to stop once the queue drains. Idempotent.
    /// The worker threads themselves are joined automatically when the
    /// enclosing [`std::thread::scope`] call returns.
    pub fn shutdown(&self) {
        // Set the flag under the same lock the worker's check-then-wait
        // uses, so a worker that just saw an empty queue can't miss this
        // notification between its check and `Condvar::wait`.
        let mut queue = self.shared.queue.lock();
        if queue.shutdown {
            return;
        }
        queue.shutdown = true;
        drop(queue);
        self.shared.condvar.notify_all();
    }
}

impl Drop for WorkerPool<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as Counter;

    #[test]
    fn runs_every_submitted_job() {
        let counter = Counter::new(0);
        std::thread::scope(|scope| {
            let pool = WorkerPool::new(scope, 4);
            for _ in 0..100 {
                pool.submit(|| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait_all();
            pool.shutdown();
        });
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn wait_all_can_be_called_across_multiple_rounds() {
        let counter = Counter::new(0);
        std::thread::scope(|scope| {
            let pool = WorkerPool::new(scope, 2);
            for round in 0..3 {
                for _ in 0..5 {
                    pool.submit(|| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                }
                pool.wait_all();
                assert_eq!(counter.load(Ordering::SeqCst), (round + 1) * 5);
            }
            pool.shutdown();
        });
    }
}
