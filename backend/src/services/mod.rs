//! HTTP API of the rankings backend.
//!
//! - `rankings`: spreadsheet import (as a background job), preview, job status,
//!   the rendered ranking table of a round and its CSV export.
//! - `series`: create/list/delete tournaments and their rounds.
//! - `logs`: the operation log.
//!
//! Handlers follow one shape: a thin `process` function turns the `Result` of an
//! inner function into an `HttpResponse`. Database work runs in
//! `tokio::task::spawn_blocking`.

pub mod logs;
pub mod rankings;
pub mod series;

use crate::db::{Database, StoreError};
use crate::reconciler::{HeaderSynonyms, ImportError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Everything a handler needs besides the job state.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub synonyms: Arc<HeaderSynonyms>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("an import is already running for round {0}")]
    ImportInProgress(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Import(e) => e.kind(),
            ServiceError::Store(StoreError::NotFound(_)) => "not_found",
            ServiceError::Store(_) => "persistence",
            ServiceError::Upload(_) => "upload",
            ServiceError::InvalidRequest(_) => "invalid_request",
            ServiceError::ImportInProgress(_) => "conflict",
            ServiceError::Task(_) => "internal",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Import(ImportError::Persistence(StoreError::NotFound(_)))
            | ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Import(ImportError::Persistence(_))
            | ServiceError::Store(_)
            | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Import(_)
            | ServiceError::Upload(_)
            | ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::ImportInProgress(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(json!({ "kind": self.kind(), "message": self.to_string() }))
    }
}

/// Runs synchronous database work off the async runtime.
pub(crate) async fn run_blocking<T, E, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
        .map_err(Into::into)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::AppState;
    use crate::db::testing::temp_database;
    use crate::job_controller::state::{start_job_updater, JobsState};
    use crate::reconciler::HeaderSynonyms;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    pub const BOUNDARY: &str = "rankings-test-boundary";

    /// App state over a throwaway database, with the job updater running.
    pub fn test_states() -> (TempDir, AppState, JobsState) {
        let (dir, database) = temp_database();
        let (tx, rx) = mpsc::channel(100);
        let jobs = JobsState::new(tx);
        tokio::spawn(start_job_updater(jobs.clone(), rx));
        let state = AppState {
            database,
            synonyms: Arc::new(HeaderSynonyms::default()),
            max_upload_bytes: 1024 * 1024,
        };
        (dir, state, jobs)
    }

    /// A multipart/form-data body; parts are `(field name, file name, content)`.
    pub fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    pub fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}
