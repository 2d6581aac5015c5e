#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for nephro coach.
//!
//! Accepts uploaded lab report PDFs, extracts a normalized patient record
//! from each and stores it, and stores and serves BMI calculations. Both
//! record kinds live in one `SQLite` database (default
//! `data/nephro_coach.db`); uploaded PDFs are kept in the upload directory.

pub mod config;
pub mod error;
mod handlers;
pub mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use nephro_coach_database::db::open_db;
use nephro_coach_server_models::ApiError;
use switchy_database::Database;

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Records database, opened once at startup.
    pub db: Arc<dyn Database>,
    /// Directory uploaded PDFs are written to.
    pub upload_dir: PathBuf,
}

/// Registers every route and the JSON body configuration.
///
/// Used by [`run_server`] and by tests that build an `App` directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(handlers::health))
        .route("/save-bmi", web::post().to(handlers::save_bmi))
        .route("/get-bmi-records", web::get().to(handlers::get_bmi_records))
        .route("/latest-bmi", web::get().to(handlers::latest_bmi))
        .route("/latest-age", web::get().to(handlers::latest_age))
        .route("/latest-creatinine", web::get().to(handlers::latest_creatinine))
        .route("/process-pdf", web::post().to(handlers::process_pdf))
        .route("/patient-history", web::get().to(handlers::patient_history))
        .route("/latest-patient", web::get().to(handlers::latest_patient));
}

/// Answers unparseable JSON bodies with a 400 `{"error": ...}` body.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON body: {err}");
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// Starts the nephro coach API server.
///
/// Opens the records database, then serves the API until the server is
/// stopped. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened,
/// the HTTP server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Opening records database at {}...",
        config.database_path.display()
    );
    let db = open_db(&config.database_path)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        upload_dir: config.upload_dir.clone(),
    });

    log::info!(
        "Starting server on {}:{} (uploads in {})",
        config.bind_addr,
        config.port,
        config.upload_dir.display()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
