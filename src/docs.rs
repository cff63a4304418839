use crate::api::attendance::ScanRequest;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::outcome::{DailyRoster, OutcomeKind, RosterResponse, ScanResponse};
use crate::scanner::{ScanPhase, ScanReport, ScannerStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Scanner API",
        version = "0.1.0",
        description = r#"
## QR Attendance

Marks employees present for the day from the QR code on their badge and
reports who has and has not checked in.

### Key Features
- **Scan** a badge payload: marked once per employee per day
- **Scanner** control for a camera attached to the service
- **Today's attendance**: present and absent lists
- **Spreadsheet**: every new record is mirrored to the shared sheet

### Outcomes
A scan is `newly_marked`, `already_marked` or `not_found`. None of these
are errors; only a failed write or an unavailable camera is.
"#,
    ),
    paths(
        crate::api::attendance::scan,
        crate::api::attendance::today_roster,
        crate::api::sheet::open_sheet,

        crate::api::scanner::status,
        crate::api::scanner::start,
        crate::api::scanner::stop
    ),
    components(
        schemas(
            ScanRequest,
            ScanResponse,
            OutcomeKind,
            Employee,
            AttendanceRecord,
            AttendanceStatus,
            DailyRoster,
            RosterResponse,
            ScannerStatus,
            ScanReport,
            ScanPhase
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance marking and roster APIs"),
        (name = "Scanner", description = "Camera scanner control APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/attendance/scan",
            "/api/attendance/today",
            "/api/sheet",
            "/api/scanner",
            "/api/scanner/start",
            "/api/scanner/stop",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
