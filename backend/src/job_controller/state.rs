//! Tracks background ranking imports.
//!
//! - `JobsState`: clonable, shared state injected into the Actix app in `main.rs`.
//!   Holds the status of every job and the rounds that currently have an import
//!   running.
//! - `JobUpdate`: status change sent by a job over the MPSC channel.
//! - `start_job_updater`: long-running task applying `JobUpdate`s to `JobsState`.

use common::jobs::JobStatus;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};

/// Shared container for the state of every background import.
///
/// Built once in `main.rs` and handed to Actix as `web::Data`, so the upload
/// handler, the status endpoint and the updater task all see the same maps.
#[derive(Clone)]
pub struct JobsState {
    /// Job id → latest status. Read by the status endpoint, written by the updater.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Rounds with an import in flight. At most one import per round runs at a
    /// time within this process.
    rounds_in_flight: Arc<Mutex<HashSet<String>>>,

    /// Background jobs push their progress here.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status change for one job.
///
/// Sent by the blocking import worker through `JobsState.tx` and applied by
/// `start_job_updater`.
#[derive(Debug)]
pub struct JobUpdate {
    /// The job being updated, as returned by `POST /api/rankings/import`.
    pub(crate) job_id: String,
    /// Replaces whatever status the job had before.
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Empty state whose workers report through `tx`. The matching receiver
    /// belongs to `start_job_updater`.
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            rounds_in_flight: Arc::new(Mutex::new(HashSet::new())),
            tx,
        }
    }

    /// Marks `round_id` busy. Returns `false` if an import already holds it.
    pub async fn try_claim_round(&self, round_id: &str) -> bool {
        self.rounds_in_flight
            .lock()
            .await
            .insert(round_id.to_string())
    }

    /// Frees `round_id` once its import has finished, successfully or not.
    pub async fn release_round(&self, round_id: &str) {
        self.rounds_in_flight.lock().await.remove(round_id);
    }
}

/// Applies every received `JobUpdate` to the shared job map. Spawned once in `main.rs`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn round_can_only_be_claimed_once() {
        let (tx, _rx) = mpsc::channel(1);
        let state = JobsState::new(tx);

        assert!(state.try_claim_round("r1").await);
        assert!(!state.try_claim_round("r1").await);
        assert!(state.try_claim_round("r2").await);

        state.release_round("r1").await;
        assert!(state.try_claim_round("r1").await);
    }

    #[actix_web::test]
    async fn updater_applies_updates_in_order() {
        let (unused_tx, _unused_rx) = mpsc::channel(1);
        let state = JobsState::new(unused_tx);
        let (tx, rx) = mpsc::channel(4);

        tx.send(JobUpdate {
            job_id: "job".into(),
            status: JobStatus::InProgress(3),
        })
        .await
        .unwrap();
        tx.send(JobUpdate {
            job_id: "job".into(),
            status: JobStatus::Failed {
                kind: "decode".into(),
                message: "bad file".into(),
            },
        })
        .await
        .unwrap();
        drop(tx);
        start_job_updater(state.clone(), rx).await;

        assert!(matches!(
            state.jobs.read().await.get("job"),
            Some(JobStatus::Failed { .. })
        ));
    }
}
