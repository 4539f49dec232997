mod config;
mod db;
mod job_controller;
mod reconciler;
mod services;

use crate::config::AppConfig;
use crate::db::Database;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::services::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let database = Database::new(&config.database_path);
    database.init().map_err(|e| {
        error!(
            "Cannot initialise database {}: {}",
            config.database_path.display(),
            e
        );
        io::Error::other(e.to_string())
    })?;

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let app_state = AppState {
        database,
        synonyms: Arc::new(config.synonyms.clone()),
        max_upload_bytes: config.max_upload_bytes,
    };
    let json_limit = config.max_upload_bytes;

    info!(
        "Rankings service running at http://{}:{} (database {})",
        config.host,
        config.port,
        config.database_path.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(app_state.clone()))
            .service(services::rankings::configure_routes())
            .service(services::series::configure_series_routes())
            .service(services::series::configure_round_routes())
            .service(services::logs::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
