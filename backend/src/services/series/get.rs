use crate::services::{run_blocking, AppState};
use actix_web::{web, HttpResponse, Responder, ResponseError};

pub async fn list_series(state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    match run_blocking(move || database.list_series()).await {
        Ok(series) => HttpResponse::Ok().json(series),
        Err(err) => err.error_response(),
    }
}

pub async fn list_rounds(series_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let series_id = series_id.into_inner();
    match run_blocking(move || database.list_rounds(&series_id)).await {
        Ok(rounds) => HttpResponse::Ok().json(rounds),
        Err(err) => err.error_response(),
    }
}

pub async fn get_round(round_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let round_id = round_id.into_inner();
    match run_blocking(move || database.get_round(&round_id)).await {
        Ok(round) => HttpResponse::Ok().json(round),
        Err(err) => err.error_response(),
    }
}
