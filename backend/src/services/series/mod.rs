//! # Series and round management
//!
//! Tournaments ("series") own rounds; rankings are imported per round. Deleting
//! a series or round cascades to everything below it. Every create and delete is
//! recorded in the operation log.
//!
//! ## Routes
//! - `POST /api/series` (`CreateSeriesRequest`) and `GET /api/series`
//! - `DELETE /api/series/{series_id}`
//! - `POST /api/series/{series_id}/rounds` (`CreateRoundRequest`) and
//!   `GET /api/series/{series_id}/rounds`
//! - `GET /api/rounds/{round_id}` and `DELETE /api/rounds/{round_id}`

mod delete;
mod get;
mod save;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

pub fn configure_series_routes() -> Scope {
    scope("/api/series")
        .route("", post().to(save::create_series))
        .route("", get().to(get::list_series))
        .route("/{series_id}", delete().to(delete::delete_series))
        .route("/{series_id}/rounds", post().to(save::create_round))
        .route("/{series_id}/rounds", get().to(get::list_rounds))
}

pub fn configure_round_routes() -> Scope {
    scope("/api/rounds")
        .route("/{round_id}", get().to(get::get_round))
        .route("/{round_id}", delete().to(delete::delete_round))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_states;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::model::series::{Round, Series};
    use serde_json::json;

    #[actix_web::test]
    async fn series_and_rounds_lifecycle() {
        let (_dir, state, _jobs) = test_states();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_series_routes())
                .service(configure_round_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/series")
            .set_json(json!({ "name": "Spring Cup", "season": "2025" }))
            .to_request();
        let series: Series = test::call_and_read_body_json(&app, req).await;
        assert_eq!(series.name, "Spring Cup");

        let req = test::TestRequest::post()
            .uri(&format!("/api/series/{}/rounds", series.id))
            .set_json(json!({ "name": "Round 1", "round_number": 1 }))
            .to_request();
        let round: Round = test::call_and_read_body_json(&app, req).await;
        assert_eq!(round.series_id, series.id);

        let req = test::TestRequest::get()
            .uri(&format!("/api/series/{}/rounds", series.id))
            .to_request();
        let rounds: Vec<Round> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rounds, vec![round.clone()]);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/rounds/{}", round.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/rounds/{}", round.id))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let actions: Vec<_> = state
            .database
            .recent_operations(10)
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(actions, vec!["delete_round", "create_round", "create_series"]);
    }

    #[actix_web::test]
    async fn blank_names_are_rejected() {
        let (_dir, state, _jobs) = test_states();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_series_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/series")
            .set_json(json!({ "name": "   " }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn round_for_unknown_series_is_not_found() {
        let (_dir, state, _jobs) = test_states();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_series_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/series/missing/rounds")
            .set_json(json!({ "name": "Round 1" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
