use crate::services::{run_blocking, AppState, ServiceError};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{CreateRoundRequest, CreateSeriesRequest};

fn required_name(name: &str, what: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidRequest(format!("{} name must not be empty", what)));
    }
    Ok(name.to_string())
}

pub async fn create_series(
    state: web::Data<AppState>,
    payload: web::Json<CreateSeriesRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let name = match required_name(&request.name, "series") {
        Ok(name) => name,
        Err(err) => return err.error_response(),
    };
    let database = state.database.clone();

    let created = run_blocking(move || {
        let series = database.create_series(&name, request.season.as_deref())?;
        database.record_operation_quietly(
            "create_series",
            Some(series.id.as_str()),
            Some(series.name.as_str()),
        );
        Ok::<_, ServiceError>(series)
    })
    .await;

    match created {
        Ok(series) => HttpResponse::Ok().json(series),
        Err(err) => err.error_response(),
    }
}

pub async fn create_round(
    series_id: web::Path<String>,
    state: web::Data<AppState>,
    payload: web::Json<CreateRoundRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let name = match required_name(&request.name, "round") {
        Ok(name) => name,
        Err(err) => return err.error_response(),
    };
    let database = state.database.clone();
    let series_id = series_id.into_inner();

    let created = run_blocking(move || {
        let round = database.create_round(
            &series_id,
            &name,
            request.round_number,
            request.race_date.as_deref(),
        )?;
        database.record_operation_quietly(
            "create_round",
            Some(round.id.as_str()),
            Some(round.name.as_str()),
        );
        Ok::<_, ServiceError>(round)
    })
    .await;

    match created {
        Ok(round) => HttpResponse::Ok().json(round),
        Err(err) => err.error_response(),
    }
}
