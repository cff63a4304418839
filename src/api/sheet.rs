use crate::config::Config;
use actix_web::{HttpResponse, Responder, http::header, web};
use serde_json::json;

/// Open the mirrored attendance spreadsheet
#[utoipa::path(
    get,
    path = "/api/sheet",
    responses(
        (status = 307, description = "Redirect to the spreadsheet"),
        (status = 404, description = "No spreadsheet configured", body = Object, example = json!({
            "message": "No spreadsheet configured"
        }))
    ),
    tag = "Attendance"
)]
pub async fn open_sheet(config: web::Data<Config>) -> impl Responder {
    match &config.sheet_url {
        Some(url) => HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, url.as_str()))
            .finish(),
        None => HttpResponse::NotFound().json(json!({
            "message": "No spreadsheet configured"
        })),
    }
}
