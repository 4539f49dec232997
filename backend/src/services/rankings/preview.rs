use super::upload::read_upload;
use crate::reconciler::{decode_workbook, PREVIEW_ROWS};
use crate::services::{run_blocking, AppState, ServiceError};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::import::ImportPreview;

/// Decodes the uploaded `file` exactly as an import would and returns the
/// headers with up to `PREVIEW_ROWS` rows. Nothing is stored.
pub(crate) async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match preview_upload(state, payload).await {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(err) => err.error_response(),
    }
}

async fn preview_upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<ImportPreview, ServiceError> {
    let upload = read_upload(payload, state.max_upload_bytes).await?;
    let file = upload
        .file
        .ok_or_else(|| ServiceError::Upload("missing file part".to_string()))?;

    run_blocking(move || {
        decode_workbook(&file.bytes, &file.name).map(|sheet| sheet.preview(PREVIEW_ROWS))
    })
    .await
}
