//! MutationQueue - serializes render-surface updates through one worker.
//!
//! Size calculation and network responses finish out of order. Rather than
//! letting each result touch the render surface directly, every update is
//! enqueued as a [`MutationJob`] and applied by a single worker task, one at
//! a time, in enqueue order:
//!
//! 1. the surface's authoritative item list is set to the job's snapshot
//!    (the visible projection captured when the job was enqueued);
//! 2. the job's operation runs against the surface.
//!
//! The worker owns the surface. Each job resolves its [`JobHandle`] when it
//! finishes, successfully or not; a failing or panicking job never stalls
//! the jobs behind it.

use super::diff::Diff;
use super::item::VisualItem;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Failure of a single job. The queue keeps running after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Render surface rejected update: {0}")]
    Surface(String),

    #[error("Job panicked: {0}")]
    Panicked(String),

    #[error("Mutation queue worker is not running")]
    WorkerStopped,
}

/// Platform list/grid view that displays the visible projection.
///
/// All methods run on the queue's worker, one job at a time.
pub trait RenderSurface: Send + 'static {
    /// Replace the authoritative item list without animating.
    fn set_items(&mut self, items: Vec<VisualItem>);

    /// Redraw everything from the authoritative list.
    fn reload(&mut self) -> Result<(), JobError>;

    /// Animate the given incremental change.
    fn apply_diff(&mut self, diff: &Diff) -> Result<(), JobError>;

    /// Open a batch transaction. No-op by default.
    fn begin_batch(&mut self) {}

    /// Close the batch opened by [`begin_batch`](Self::begin_batch).
    fn end_batch(&mut self) {}

    /// Run `updates` inside one batch transaction.
    ///
    /// The batch is closed when `updates` returns an error or panics.
    fn perform_batch_updates(&mut self, updates: SurfaceBlock<Self>) -> Result<(), JobError>
    where
        Self: Sized,
    {
        self.begin_batch();
        let mut surface = scopeguard::guard(self, |surface| surface.end_batch());
        updates(&mut **surface)
    }
}

/// Arbitrary update run against the surface.
pub type SurfaceBlock<S> = Box<dyn FnOnce(&mut S) -> Result<(), JobError> + Send>;

/// Operation of a job.
pub enum JobKind<S> {
    /// Redraw from the snapshot.
    Reload,
    /// Animate an incremental change against the snapshot.
    ApplyDiff(Diff),
    /// Run a closure against the surface.
    Block(SurfaceBlock<S>),
    /// Run a closure inside [`RenderSurface::perform_batch_updates`].
    Batch(SurfaceBlock<S>),
}

impl<S> JobKind<S> {
    /// Short label used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Reload => "reload",
            JobKind::ApplyDiff(_) => "apply-diff",
            JobKind::Block(_) => "block",
            JobKind::Batch(_) => "batch",
        }
    }
}

impl<S> std::fmt::Debug for JobKind<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::ApplyDiff(diff) => f.debug_tuple("ApplyDiff").field(diff).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// One queued update. Immutable once enqueued.
pub struct MutationJob<S> {
    kind: JobKind<S>,
    snapshot: Vec<VisualItem>,
}

impl<S> std::fmt::Debug for MutationJob<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationJob")
            .field("kind", &self.kind)
            .field("snapshot_len", &self.snapshot.len())
            .finish()
    }
}

impl<S> MutationJob<S> {
    /// Job running `kind` after the surface is set to `snapshot`.
    pub fn new(kind: JobKind<S>, snapshot: Vec<VisualItem>) -> Self {
        Self { kind, snapshot }
    }

    /// Full redraw.
    pub fn reload(snapshot: Vec<VisualItem>) -> Self {
        Self::new(JobKind::Reload, snapshot)
    }

    /// Animated change from the surface's previous list to `snapshot`.
    pub fn apply_diff(snapshot: Vec<VisualItem>, diff: Diff) -> Self {
        Self::new(JobKind::ApplyDiff(diff), snapshot)
    }

    /// Arbitrary surface update.
    pub fn block(
        snapshot: Vec<VisualItem>,
        block: impl FnOnce(&mut S) -> Result<(), JobError> + Send + 'static,
    ) -> Self {
        Self::new(JobKind::Block(Box::new(block)), snapshot)
    }

    /// Arbitrary surface update wrapped in one batch transaction.
    pub fn batch(
        snapshot: Vec<VisualItem>,
        block: impl FnOnce(&mut S) -> Result<(), JobError> + Send + 'static,
    ) -> Self {
        Self::new(JobKind::Batch(Box::new(block)), snapshot)
    }

    /// Operation this job runs.
    pub fn kind(&self) -> &JobKind<S> {
        &self.kind
    }

    /// Item list the surface is set to before the operation.
    pub fn snapshot(&self) -> &[VisualItem] {
        &self.snapshot
    }
}

/// Resolves when the job has been applied (or has failed).
#[derive(Debug)]
pub struct JobHandle {
    done: oneshot::Receiver<Result<(), JobError>>,
}

impl Future for JobHandle {
    type Output = Result<(), JobError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.done)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(JobError::WorkerStopped)))
    }
}

struct Envelope<S> {
    job: MutationJob<S>,
    done: oneshot::Sender<Result<(), JobError>>,
}

/// Cloneable enqueue side of a [`MutationQueue`].
pub struct QueueSender<S> {
    sender: mpsc::UnboundedSender<Envelope<S>>,
}

impl<S> Clone for QueueSender<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: RenderSurface> QueueSender<S> {
    /// Append a job. The handle resolves after the job runs.
    ///
    /// If the worker has stopped the handle resolves to
    /// [`JobError::WorkerStopped`].
    pub fn enqueue(&self, job: MutationJob<S>) -> JobHandle {
        let (done, receiver) = oneshot::channel();
        debug!(kind = job.kind.name(), "Enqueuing job");
        if let Err(mpsc::error::SendError(envelope)) = self.sender.send(Envelope { job, done }) {
            let _ = envelope.done.send(Err(JobError::WorkerStopped));
        }
        JobHandle { done: receiver }
    }
}

/// FIFO actor owning the render surface.
pub struct MutationQueue<S: RenderSurface> {
    sender: QueueSender<S>,
    worker: JoinHandle<S>,
}

impl<S: RenderSurface> MutationQueue<S> {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(surface: S) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(surface, receiver));
        info!("Mutation queue started");
        Self {
            sender: QueueSender { sender },
            worker,
        }
    }

    /// See [`QueueSender::enqueue`].
    pub fn enqueue(&self, job: MutationJob<S>) -> JobHandle {
        self.sender.enqueue(job)
    }

    /// Enqueue side usable from other tasks.
    pub fn sender(&self) -> QueueSender<S> {
        self.sender.clone()
    }

    /// Stop accepting jobs, drain the ones already queued, and return the surface.
    ///
    /// Jobs enqueued through outstanding [`QueueSender`]s keep the worker
    /// alive until those senders are dropped.
    pub async fn shutdown(self) -> Result<S, JobError> {
        drop(self.sender);
        self.worker.await.map_err(|_| JobError::WorkerStopped)
    }
}

async fn run_worker<S: RenderSurface>(
    mut surface: S,
    mut receiver: mpsc::UnboundedReceiver<Envelope<S>>,
) -> S {
    // Numbered at dequeue, so log order matches application order.
    let mut sequence: u64 = 0;
    while let Some(Envelope { job, done }) = receiver.recv().await {
        sequence += 1;
        let kind = job.kind.name();
        let result = run_job(&mut surface, job);
        match &result {
            Ok(()) => debug!(sequence, kind, "Job applied"),
            Err(error) => warn!(sequence, kind, %error, "Job failed"),
        }
        // Callers may have dropped their handle.
        let _ = done.send(result);
    }
    info!("Mutation queue stopped");
    surface
}

fn run_job<S: RenderSurface>(surface: &mut S, job: MutationJob<S>) -> Result<(), JobError> {
    let MutationJob { kind, snapshot } = job;
    panic::catch_unwind(AssertUnwindSafe(|| {
        surface.set_items(snapshot);
        match kind {
            JobKind::Reload => surface.reload(),
            JobKind::ApplyDiff(diff) => surface.apply_diff(&diff),
            JobKind::Block(block) => block(surface),
            JobKind::Batch(block) => surface.perform_batch_updates(block),
        }
    }))
    .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
