//! Pairing score aggregation queue.
//!
//! Rating submissions enqueue a recompute and return immediately. A single
//! worker drains the queue, resolves game-mode dish names to recipe ids and
//! rebuilds `pairing_scores` from scratch. The channel holds at most one
//! pending job: a request arriving while one is already queued is coalesced
//! into it, since every run recomputes everything anyway.

use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use galley_db::repositories::{PairingRatingRepo, PairingScoreRepo};

/// Why a recompute was requested. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationTrigger {
    Submission,
    Manual,
}

/// Handle for enqueuing aggregation jobs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AggregationQueue {
    tx: mpsc::Sender<AggregationTrigger>,
}

/// Receiving half, consumed by [`AggregationWorker::run`].
#[derive(Debug)]
pub struct AggregationWorker {
    rx: mpsc::Receiver<AggregationTrigger>,
}

/// Counts from one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOutcome {
    pub resolved: u64,
    pub scored_pairings: usize,
}

impl AggregationQueue {
    pub fn new() -> (Self, AggregationWorker) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, AggregationWorker { rx })
    }

    /// Request a recompute without waiting for it.
    ///
    /// Returns `true` if a job was queued, `false` if it was coalesced into
    /// one already pending or the worker is gone.
    pub fn enqueue(&self, trigger: AggregationTrigger) -> bool {
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(?trigger, "Aggregation already pending, coalesced");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(?trigger, "Aggregation worker is not running");
                false
            }
        }
    }
}

impl AggregationWorker {
    /// Process queued jobs until `cancel` is triggered or every queue handle
    /// is dropped. Failures are logged and never stop the loop.
    pub async fn run(mut self, pool: PgPool, cancel: CancellationToken) {
        tracing::info!("Aggregation worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Aggregation worker stopping");
                    break;
                }
                job = self.rx.recv() => {
                    let Some(trigger) = job else {
                        tracing::info!("Aggregation queue closed, worker stopping");
                        break;
                    };
                    match aggregate(&pool).await {
                        Ok(outcome) => tracing::info!(
                            ?trigger,
                            resolved = outcome.resolved,
                            scored_pairings = outcome.scored_pairings,
                            "Pairing scores rebuilt"
                        ),
                        Err(e) => tracing::error!(
                            ?trigger,
                            error = %e,
                            "Pairing score aggregation failed"
                        ),
                    }
                }
            }
        }
    }
}

/// One full aggregation pass. Idempotent and safe to run concurrently.
pub async fn aggregate(pool: &PgPool) -> Result<AggregationOutcome, sqlx::Error> {
    let resolved = PairingRatingRepo::resolve_names(pool).await?;
    let scored_pairings = PairingScoreRepo::rebuild(pool).await?;
    Ok(AggregationOutcome {
        resolved,
        scored_pairings,
    })
}
