//! Background thread pool for off-thread image decoding.
//!
//! Uses work-stealing deques:
//! - External jobs go to a shared injector
//! - Idle workers steal from each other
//!
//! Every job is tagged with the decode epoch it was submitted under. A layout
//! rebuild advances the epoch, and jobs still queued from an older epoch are
//! dropped by the worker before they start.

use crossbeam::deque::{Injector, Stealer, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool shared by the decode pipeline.
///
/// # Example
/// ```ignore
/// let epoch = Arc::new(AtomicU64::new(0));
/// let workers = Workers::new(4, Arc::clone(&epoch));
/// workers.execute_with_epoch(0, move || decode_and_send());
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    current_epoch: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workers")
            .field("threads", &self.handles.len())
            .field("epoch", &self.current_epoch())
            .finish()
    }
}

impl Workers {
    /// Spawn `num_threads` workers (at least one) sharing `epoch`.
    ///
    /// Recommended: `num_cpus::get() * 3 / 4` so the presentation thread keeps a core.
    pub fn new(num_threads: usize, epoch: Arc<AtomicU64>) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Vec<Worker<Job>> = (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<Job>> = locals.iter().map(Worker::stealer).collect();

        let mut handles = Vec::with_capacity(num_threads);
        for (worker_id, local) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("strip-decode-{}", worker_id))
                .spawn(move || {
                    trace!("Decode worker {} started", worker_id);
                    loop {
                        if let Some(job) = find_job(&local, &injector, &stealers) {
                            job();
                            continue;
                        }
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        // Idle: short sleep instead of a hot spin
                        thread::sleep(Duration::from_millis(1));
                    }
                    trace!("Decode worker {} stopped", worker_id);
                })
                .expect("Failed to spawn decode worker thread");
            handles.push(handle);
        }

        trace!("Workers initialized: {} threads (work-stealing)", num_threads);

        Self {
            injector,
            handles,
            current_epoch: epoch,
            shutdown,
        }
    }

    /// Number of worker threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Run closure on a worker thread, unconditionally.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }

    /// Current epoch value.
    pub fn current_epoch(&self) -> u64 {
        self.current_epoch.load(Ordering::Relaxed)
    }

    /// Run closure only if the epoch still equals `epoch` when a worker picks it up.
    ///
    /// The check happens at execution time, so a rebuild between enqueue and
    /// pickup turns the job into a no-op.
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current_epoch = Arc::clone(&self.current_epoch);
        self.injector.push(Box::new(move || {
            if current_epoch.load(Ordering::Relaxed) == epoch {
                f();
            } else {
                trace!("Skipping stale decode job (epoch {})", epoch);
            }
        }));
    }
}

/// Own queue first, then the injector, then steal from siblings.
fn find_job(local: &Worker<Job>, injector: &Injector<Job>, stealers: &[Stealer<Job>]) -> Option<Job> {
    if let Some(job) = local.pop() {
        return Some(job);
    }
    if let Some(job) = injector.steal_batch_and_pop(local).success() {
        return Some(job);
    }
    stealers.iter().find_map(|s| s.steal().success())
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);
        self.shutdown.store(true, Ordering::SeqCst);

        // Decodes are not interruptible; give them 500ms total, then detach.
        let deadline = Instant::now() + Duration::from_millis(500);
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }
        trace!("All {} workers stopped", num_threads);
    }
}
