//! Worker pool for CPU-bound analysis
//!
//! A fixed set of OS threads, sized once at startup, pulls jobs from a shared
//! queue. Callers get a future per job and only suspend at its await point,
//! so tree walking and YAML formatting never run on the async runtime threads.

use crate::analyzer::analyze_tree;
use crate::normalizer::normalize_content;
use parking_lot::Mutex;
use repolens_core::{ErrorContext, RepoLensError, RepoLensResult, TreeAnalysisResult, TreeEntry};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Work accepted by the pool, together with the channel its result goes back on
enum Job {
    AnalyzeTree {
        entries: Vec<TreeEntry>,
        reply: oneshot::Sender<TreeAnalysisResult>,
    },
    NormalizeContent {
        encoded: String,
        reply: oneshot::Sender<Option<String>>,
    },
}

impl Job {
    fn kind(&self) -> &'static str {
        match self {
            Job::AnalyzeTree { .. } => "analyze_tree",
            Job::NormalizeContent { .. } => "normalize_content",
        }
    }

    /// Run the job and hand the result back; `completed` is bumped before the
    /// reply so a caller that sees the result also sees the count.
    fn run(self, completed: &AtomicU64) {
        // A dropped receiver means the caller stopped waiting; nothing to do.
        match self {
            Job::AnalyzeTree { entries, reply } => {
                let result = analyze_tree(&entries);
                completed.fetch_add(1, Ordering::SeqCst);
                let _ = reply.send(result);
            }
            Job::NormalizeContent { encoded, reply } => {
                let result = normalize_content(&encoded);
                completed.fetch_add(1, Ordering::SeqCst);
                let _ = reply.send(result);
            }
        }
    }
}

/// Snapshot of pool activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerPoolStats {
    /// Configured number of workers
    pub workers: usize,
    /// Workers whose thread is still running
    pub live_workers: usize,
    /// Jobs accepted since startup
    pub submitted: u64,
    /// Jobs that ran to completion
    pub completed: u64,
}

struct Shared {
    queue: Mutex<mpsc::UnboundedReceiver<Job>>,
    closing: AtomicBool,
    live_workers: AtomicUsize,
    submitted: AtomicU64,
    completed: AtomicU64,
}

/// Fixed-size pool of analysis workers
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    shared: Arc<Shared>,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with one worker per logical CPU (at least one)
    pub fn with_available_parallelism() -> RepoLensResult<Self> {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(1);
        Self::new(workers)
    }

    /// Create a pool with exactly `workers` threads (at least one)
    pub fn new(workers: usize) -> RepoLensResult<Self> {
        let workers = workers.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            queue: Mutex::new(receiver),
            closing: AtomicBool::new(false),
            live_workers: AtomicUsize::new(0),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        });

        let pool = Self {
            sender: Mutex::new(Some(sender)),
            shared,
            workers,
        };

        for index in 0..workers {
            let shared = Arc::clone(&pool.shared);
            pool.shared.live_workers.fetch_add(1, Ordering::SeqCst);

            let spawned = thread::Builder::new()
                .name(format!("repolens-worker-{}", index))
                .spawn(move || worker_loop(index, shared));

            if let Err(e) = spawned {
                pool.shared.live_workers.fetch_sub(1, Ordering::SeqCst);
                // Dropping `pool` here stops the workers already started.
                return Err(RepoLensError::Internal {
                    message: format!("Failed to start worker thread {}: {}", index, e),
                    source: Some(Arc::new(e)),
                    context: ErrorContext::new("worker_pool").with_operation("new"),
                });
            }
        }

        info!(workers, "Started analysis worker pool");

        Ok(pool)
    }

    /// Compute size, file count and configuration file of a tree listing
    pub async fn analyze_tree(
        &self,
        entries: Vec<TreeEntry>,
    ) -> RepoLensResult<TreeAnalysisResult> {
        self.submit(|reply| Job::AnalyzeTree { entries, reply }).await
    }

    /// Decode and canonicalize base64 configuration content
    pub async fn normalize_content(&self, encoded: String) -> RepoLensResult<Option<String>> {
        self.submit(|reply| Job::NormalizeContent { encoded, reply }).await
    }

    async fn submit<T>(
        &self,
        make_job: impl FnOnce(oneshot::Sender<T>) -> Job,
    ) -> RepoLensResult<T> {
        let (reply, result) = oneshot::channel();
        let job = make_job(reply);
        let kind = job.kind();

        {
            let sender = self.sender.lock();
            let sender = sender
                .as_ref()
                .ok_or_else(|| pool_error("Worker pool is shut down", kind))?;

            self.shared.submitted.fetch_add(1, Ordering::SeqCst);
            if sender.send(job).is_err() {
                self.shared.submitted.fetch_sub(1, Ordering::SeqCst);
                return Err(pool_error("Worker pool is shut down", kind));
            }
        }

        debug!(job = kind, "Submitted job to worker pool");

        result
            .await
            .map_err(|_| pool_error("Worker dropped the job before completing it", kind))
    }

    /// Stop accepting jobs and let the workers exit
    ///
    /// Jobs still queued are abandoned and their callers receive an internal
    /// error. A job already running finishes on its thread but nobody waits
    /// for it here.
    pub fn shutdown(&self) {
        if self.shared.closing.swap(true, Ordering::SeqCst) {
            return;
        }

        // Closing the channel wakes every idle worker.
        self.sender.lock().take();
        info!(workers = self.workers, "Shutting down analysis worker pool");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.closing.load(Ordering::SeqCst)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn stats(&self) -> WorkerPoolStats {
        WorkerPoolStats {
            workers: self.workers,
            live_workers: self.shared.live_workers.load(Ordering::SeqCst),
            submitted: self.shared.submitted.load(Ordering::SeqCst),
            completed: self.shared.completed.load(Ordering::SeqCst),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("stats", &self.stats())
            .field("closing", &self.is_shut_down())
            .finish()
    }
}

fn worker_loop(index: usize, shared: Arc<Shared>) {
    debug!(worker = index, "Worker started");

    loop {
        // One idle worker parks on the queue; the rest wait on the lock.
        let next = shared.queue.lock().blocking_recv();

        let Some(job) = next else {
            break;
        };

        if shared.closing.load(Ordering::SeqCst) {
            debug!(worker = index, job = job.kind(), "Abandoning queued job");
            continue;
        }

        let kind = job.kind();
        if panic::catch_unwind(AssertUnwindSafe(|| job.run(&shared.completed))).is_err() {
            error!(worker = index, job = kind, "Job panicked");
        }
    }

    shared.live_workers.fetch_sub(1, Ordering::SeqCst);
    debug!(worker = index, "Worker stopped");
}

fn pool_error(message: &str, job: &str) -> RepoLensError {
    warn!(job, "{}", message);
    RepoLensError::Internal {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("worker_pool").with_operation(job),
    }
}
