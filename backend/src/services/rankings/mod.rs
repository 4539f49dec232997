//! Ranking import and read-back endpoints.
//!
//! - `POST /api/rankings/import`: multipart upload (`json` or `round_id` part plus
//!   `file`). Validates the target round, registers a background job and returns
//!   its `job_id` immediately. The job replaces the round's rankings and writes an
//!   operation-log entry whatever the outcome.
//! - `POST /api/rankings/preview`: decodes an uploaded `file` and returns its
//!   headers with the first rows, without storing anything.
//! - `GET /api/rankings/status/{job_id}`: current `JobStatus` of an import job.
//! - `GET /api/rankings/{round_id}`: the round's rankings laid out by its stored schema.
//! - `GET /api/rankings/{round_id}/export`: the same table as a CSV download.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod export;
mod get_status;
mod import;
mod preview;
mod table;
mod upload;

const API_PATH: &str = "/api/rankings";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/import", post().to(import::process))
        .route("/preview", post().to(preview::process))
        .route("/status/{job_id}", get().to(get_status::process))
        .route("/{round_id}/export", get().to(export::process))
        .route("/{round_id}", get().to(table::process))
}
