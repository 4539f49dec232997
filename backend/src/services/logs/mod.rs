//! `GET /api/logs?limit=N`: newest operation-log entries first.

use crate::services::{run_blocking, AppState};
use actix_web::web::{get, scope, Data, Query};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use serde::Deserialize;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u32>,
}

pub fn configure_routes() -> Scope {
    scope("/api/logs").route("", get().to(process))
}

async fn process(state: Data<AppState>, query: Query<LogsQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let database = state.database.clone();
    match run_blocking(move || database.recent_operations(limit)).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(err) => err.error_response(),
    }
}
