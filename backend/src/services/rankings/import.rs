use super::upload::{read_upload, UploadedFile};
use crate::db::Database;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::reconciler::{import_rankings, HeaderSynonyms, ImportError};
use crate::services::{run_blocking, AppState, ServiceError};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::model::import::ImportSummary;
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// `POST /api/rankings/import`
///
/// Accepts a multipart body with a `round_id` (or a `json` part carrying
/// `{"round_id": ...}`) and a `file` part. Answers `{"job_id": ...}` right away;
/// the import itself runs in the background.
pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    match schedule_import_job(jobs, state, payload).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(err) => err.error_response(),
    }
}

/// Validates the upload, claims the round and spawns the import.
///
/// A missing round is rejected here, before any job exists or storage is
/// touched. The returned `job_id` can be polled at `/api/rankings/status/{job_id}`.
///
/// # Arguments
/// * `jobs` - Shared job map and the sender the worker reports through.
/// * `state` - Database handle, header synonyms and the upload size limit.
/// * `payload` - The raw multipart stream of the request.
///
/// # Errors
/// * `ServiceError::Import` when no round was given.
/// * `ServiceError::Store` when the round does not exist.
/// * `ServiceError::ImportInProgress` when another import holds the round.
async fn schedule_import_job(
    jobs: web::Data<JobsState>,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<String, ServiceError> {
    let upload = read_upload(payload, state.max_upload_bytes).await?;
    let round_id = upload
        .round_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ImportError::Validation)?;
    let file = upload
        .file
        .ok_or_else(|| ServiceError::Upload("missing file part".to_string()))?;

    let database = state.database.clone();
    let lookup_id = round_id.clone();
    run_blocking(move || database.get_round(&lookup_id)).await?;

    if !jobs.try_claim_round(&round_id).await {
        return Err(ServiceError::ImportInProgress(round_id));
    }

    let job_id = Uuid::new_v4().to_string();
    jobs.jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);
    info!("Import job {} queued for round {}", job_id, round_id);

    let js = jobs.get_ref().clone();
    let database = state.database.clone();
    let synonyms = Arc::clone(&state.synonyms);
    let value = job_id.clone();

    tokio::spawn(async move {
        let tx_block = js.tx.clone();
        let job_for_blocking = value.clone();
        let round_for_blocking = round_id.clone();

        let handle = tokio::task::spawn_blocking(move || {
            run_import(
                &database,
                tx_block,
                &job_for_blocking,
                &round_for_blocking,
                &file,
                &synonyms,
            )
        });

        let status = match handle.await {
            Ok(Ok(summary)) => JobStatus::Completed(summary),
            Ok(Err(e)) => JobStatus::Failed {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
            Err(join_err) => JobStatus::Failed {
                kind: "internal".to_string(),
                message: format!("join error: {}", join_err),
            },
        };
        let _ = js
            .tx
            .send(JobUpdate {
                job_id: value,
                status,
            })
            .await;
        js.release_round(&round_id).await;
    });

    Ok(job_id)
}

/// The blocking part of an import job. Reports the decoded row count and
/// records the outcome in the operation log.
fn run_import(
    database: &Database,
    tx: mpsc::Sender<JobUpdate>,
    job_id: &str,
    round_id: &str,
    file: &UploadedFile,
    synonyms: &HeaderSynonyms,
) -> Result<ImportSummary, ImportError> {
    let result = import_rankings(
        database,
        Some(round_id),
        &file.bytes,
        &file.name,
        synonyms,
        |rows| {
            let _ = tx.blocking_send(JobUpdate {
                job_id: job_id.to_string(),
                status: JobStatus::InProgress(rows as u32),
            });
        },
    );

    let (action, detail) = match &result {
        Ok(summary) => (
            "import_rankings",
            format!(
                "{}: {} rankings, {} renamed, md5 {}",
                file.name, summary.inserted, summary.renamed, summary.checksum
            ),
        ),
        Err(e) => ("import_rankings_failed", format!("{}: {}", file.name, e)),
    };
    database.record_operation_quietly(action, Some(round_id), Some(detail.as_str()));
    result
}
