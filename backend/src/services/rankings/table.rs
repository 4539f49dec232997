use crate::db::{Database, RankingStore, StoreError};
use crate::reconciler::build_table;
use crate::services::{run_blocking, AppState};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::ranking::RankingTable;

pub(crate) async fn process(round_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let round_id = round_id.into_inner();
    match run_blocking(move || load_table(&database, &round_id)).await {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(err) => err.error_response(),
    }
}

/// The round's rankings laid out by its schema descriptor; `NotFound` for an
/// unknown round, an empty table for a round never imported.
pub(crate) fn load_table(database: &Database, round_id: &str) -> Result<RankingTable, StoreError> {
    database.get_round(round_id)?;
    let records = database.load_rankings(round_id)?;
    Ok(build_table(round_id, &records)?)
}
