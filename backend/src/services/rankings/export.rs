use super::table::load_table;
use crate::services::{run_blocking, AppState, ServiceError};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::ranking::RankingTable;

pub(crate) async fn process(round_id: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let database = state.database.clone();
    let round_id = round_id.into_inner();
    let file_name = format!("rankings_{}.csv", round_id);

    let rendered = run_blocking(move || {
        let table = load_table(&database, &round_id)?;
        render_csv(&table).map_err(|e| ServiceError::Task(e.to_string()))
    })
    .await;

    match rendered {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file_name)],
            })
            .body(bytes),
        Err(err) => err.error_response(),
    }
}

/// Header row of schema columns, then one line per ranking in table order.
fn render_csv(table: &RankingTable) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.cells.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
