use crate::{
    error::ScanError,
    scanner::{ScannerService, StartOutcome},
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// Scanner state and the result of the last decoded badge
#[utoipa::path(
    get,
    path = "/api/scanner",
    responses(
        (status = 200, description = "Scanner status", body = crate::scanner::ScannerStatus)
    ),
    tag = "Scanner"
)]
pub async fn status(scanner: web::Data<ScannerService>) -> impl Responder {
    HttpResponse::Ok().json(scanner.status())
}

/// Start the camera and begin polling for a badge
#[utoipa::path(
    post,
    path = "/api/scanner/start",
    responses(
        (status = 200, description = "Scanning", body = Object, example = json!({
            "message": "Point camera at QR code",
            "session": 1
        })),
        (status = 503, description = "Camera access denied or not available", body = Object, example = json!({
            "title": "Scan Failed",
            "message": "Camera access denied or not available"
        }))
    ),
    tag = "Scanner"
)]
pub async fn start(scanner: web::Data<ScannerService>) -> Result<impl Responder, ScanError> {
    let outcome = scanner.start()?;
    let message = match outcome {
        StartOutcome::Started(_) => "Point camera at QR code",
        StartOutcome::AlreadyScanning(_) => "Already scanning",
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "session": outcome.session()
    })))
}

/// Stop the camera. Safe to call when not scanning.
#[utoipa::path(
    post,
    path = "/api/scanner/stop",
    responses(
        (status = 200, description = "Camera stopped", body = crate::scanner::ScannerStatus)
    ),
    tag = "Scanner"
)]
pub async fn stop(scanner: web::Data<ScannerService>) -> impl Responder {
    scanner.stop();
    HttpResponse::Ok().json(scanner.status())
}
