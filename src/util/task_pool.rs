use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::log;

/// A queued unit of work; receives the worker's persistent state.
pub(crate) type Task = Box<dyn FnOnce(&mut WorkerState) + Send>;

/// Per-worker buffers, allocated once and reused for every connection the
/// worker serves.
pub(crate) struct WorkerState {
    pub(crate) request_buffer: Vec<u8>,
    pub(crate) response_buffer: Vec<u8>,
}

/// Manages a fixed collection of worker threads.
///
/// One mutex-guarded queue feeds all workers; a condition variable wakes
/// them. Dropping the pool stops the workers and joins them; a task that is
/// already running completes first.
pub(crate) struct WorkerPool {
    sharing: Arc<Sharing>,
    workers: Vec<thread::JoinHandle<()>>,
}

struct Sharing {
    // queued tasks to be done by worker threads
    queue: Mutex<VecDeque<Task>>,

    // notified whenever a task is added to `queue`
    condvar: Condvar,

    // flag to decide to run or exit
    stopped: AtomicBool,
}

impl WorkerPool {
    /// Spawns `worker_count` workers, each owning a request and a response
    /// buffer of the given lengths. `None` when `worker_count` is 0 or a
    /// thread cannot be spawned.
    pub(crate) fn new(
        worker_count: usize,
        request_buffer_length: usize,
        response_buffer_length: usize,
    ) -> Option<WorkerPool> {
        if worker_count == 0 {
            return None;
        }

        let sharing = Arc::new(Sharing {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            stopped: AtomicBool::new(false),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let sharing = Arc::clone(&sharing);

            let spawned = thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || {
                    let mut state = WorkerState {
                        request_buffer: vec![0; request_buffer_length],
                        response_buffer: vec![0; response_buffer_length],
                    };

                    loop {
                        let task = {
                            let mut queue = match sharing.queue.lock() {
                                Ok(queue) => queue,
                                Err(_) => return,
                            };

                            loop {
                                if sharing.stopped.load(Ordering::Acquire) {
                                    return;
                                }

                                if let Some(task) = queue.pop_front() {
                                    break task;
                                }

                                queue = match sharing.condvar.wait(queue) {
                                    Ok(queue) => queue,
                                    Err(_) => return,
                                };
                            }
                        };

                        // a faulted task must not take the worker with it
                        if panic::catch_unwind(AssertUnwindSafe(|| task(&mut state))).is_err() {
                            log::error!("worker task panicked");
                        }
                    }
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    log::error!("spawning worker {index} failed: {err}");
                    let _ = err;
                    // partially built pool: Drop joins the spawned workers
                    return None;
                }
            }
        }

        Some(WorkerPool { sharing, workers })
    }

    /// Queues a task for the next idle worker.
    pub(crate) fn post(&self, task: Task) {
        if let Ok(mut queue) = self.sharing.queue.lock() {
            queue.push_back(task);
        }
        self.sharing.condvar.notify_one();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sharing.stopped.store(true, Ordering::Release);
        self.sharing.condvar.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
