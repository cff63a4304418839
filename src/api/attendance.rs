use crate::{
    error::RecordError,
    model::outcome::{RosterResponse, ScanResponse},
    recorder::{AttendanceRecorder, today},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Badge payload as decoded from the QR code.
    #[schema(example = "EMP-001")]
    pub identifier: String,
}

/// Mark attendance for a decoded badge
#[utoipa::path(
    post,
    path = "/api/attendance/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan classified", body = ScanResponse),
        (status = 500, description = "Scan failed", body = Object, example = json!({
            "title": "Scan Failed",
            "message": "Something went wrong, please try scanning again"
        }))
    ),
    tag = "Attendance"
)]
pub async fn scan(
    recorder: web::Data<AttendanceRecorder>,
    payload: web::Json<ScanRequest>,
) -> Result<impl Responder, RecordError> {
    let outcome = recorder.mark_attendance(&payload.identifier, today()).await?;
    Ok(HttpResponse::Ok().json(ScanResponse::from(&outcome)))
}

/// Today's present and absent lists
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Roster for the current date", body = RosterResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today_roster(
    recorder: web::Data<AttendanceRecorder>,
) -> Result<impl Responder, RecordError> {
    let roster = recorder.fetch_daily_roster(today()).await?;
    Ok(HttpResponse::Ok().json(RosterResponse::from(roster)))
}
