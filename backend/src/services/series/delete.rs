use crate::services::{run_blocking, AppState};
use actix_web::{web, HttpResponse, Responder, ResponseError};

pub async fn delete_series(series_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let series_id = series_id.into_inner();
    let deleted = run_blocking(move || {
        database.delete_series(&series_id)?;
        database.record_operation_quietly("delete_series", Some(series_id.as_str()), None);
        Ok::<_, crate::db::StoreError>(())
    })
    .await;

    match deleted {
        Ok(()) => HttpResponse::Ok().body("Series deleted"),
        Err(err) => err.error_response(),
    }
}

/// Removes the round together with its rankings and schema descriptor.
pub async fn delete_round(round_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let round_id = round_id.into_inner();
    let deleted = run_blocking(move || {
        database.delete_round(&round_id)?;
        database.record_operation_quietly("delete_round", Some(round_id.as_str()), None);
        Ok::<_, crate::db::StoreError>(())
    })
    .await;

    match deleted {
        Ok(()) => HttpResponse::Ok().body("Round deleted"),
        Err(err) => err.error_response(),
    }
}
