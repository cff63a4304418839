use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod mirror;
mod model;
mod recorder;
mod routes;
mod scanner;
mod store;

use config::Config;
use db::init_stores;

use crate::docs::ApiDoc;
use crate::mirror::LoggingSheetMirror;
use crate::recorder::AttendanceRecorder;
use crate::scanner::{QrDecoder, ScanLoop, ScannerService, SpoolCamera};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Management"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let stores = init_stores(&config).await?;
    let recorder = AttendanceRecorder::new(
        stores.directory,
        stores.log,
        Arc::new(LoggingSheetMirror::new(
            config.sheet_url.clone(),
            config.mirror_delay,
        )),
    );

    let camera = SpoolCamera::new(config.camera_rear_dir.clone(), config.camera_front_dir.clone());
    let scanner = ScannerService::new(
        ScanLoop::new(Arc::new(camera), Arc::new(QrDecoder)).with_facing(config.camera_facing),
        recorder.clone(),
        config.scan_interval,
    );

    let server_addr = config.server_addr.clone();
    let recorder_data = Data::new(recorder);
    let scanner_data = Data::new(scanner.clone());
    let config_data = Data::new(config);

    HttpServer::new(move || {
        let config = config_data.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(recorder_data.clone())
            .app_data(scanner_data.clone())
            .app_data(config_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    // Release the camera if the server stopped mid-session.
    scanner.stop();
    info!("Server stopped");
    Ok(())
}
