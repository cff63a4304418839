use crate::{
    api::{attendance, scanner, sheet},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Per-peer limiter allowing `requests_per_min` with an equal burst.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let scope = web::scope(&config.api_prefix)
        .service(
            web::scope("/attendance")
                // /attendance/scan
                .service(web::resource("/scan").route(web::post().to(attendance::scan)))
                // /attendance/today
                .service(web::resource("/today").route(web::get().to(attendance::today_roster))),
        )
        .service(
            web::scope("/scanner")
                // /scanner
                .service(web::resource("").route(web::get().to(scanner::status)))
                // /scanner/start
                .service(web::resource("/start").route(web::post().to(scanner::start)))
                // /scanner/stop
                .service(web::resource("/stop").route(web::post().to(scanner::stop))),
        )
        .service(web::resource("/sheet").route(web::get().to(sheet::open_sheet)));

    match build_limiter(config.rate_scan_per_min) {
        Some(limiter) => {
            cfg.service(scope.wrap(limiter));
        }
        None => {
            tracing::warn!(
                rate = config.rate_scan_per_min,
                "Invalid rate limit, serving without limiter"
            );
            cfg.service(scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::LoggingSheetMirror;
    use crate::model::employee::Employee;
    use crate::recorder::AttendanceRecorder;
    use crate::scanner::testing::{FakeCamera, FakeDecoder};
    use crate::scanner::{ScanLoop, ScannerService};
    use crate::store::MemoryStore;
    use actix_web::{App, http::StatusCode, test as actix_test, web::Data};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_config(sheet_url: Option<&str>) -> Config {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.sheet_url = sheet_url.map(str::to_string);
        config
    }

    fn recorder() -> AttendanceRecorder {
        let store = Arc::new(MemoryStore::with_employees(vec![
            Employee::new("E1", "Alice", "Eng"),
            Employee::new("E2", "Bob", "Sales"),
        ]));
        AttendanceRecorder::new(
            store.clone(),
            store,
            Arc::new(LoggingSheetMirror::new(None, Duration::ZERO)),
        )
    }

    fn scanner(recorder: &AttendanceRecorder, camera: Arc<FakeCamera>) -> ScannerService {
        ScannerService::new(
            ScanLoop::new(camera, FakeDecoder::never()),
            recorder.clone(),
            Duration::from_millis(5),
        )
    }

    macro_rules! app {
        ($config:expr, $recorder:expr, $scanner:expr) => {{
            let config = $config;
            actix_test::init_service(
                App::new()
                    .app_data(Data::new($recorder))
                    .app_data(Data::new($scanner))
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| configure(cfg, &config)),
            )
            .await
        }};
    }

    fn scan_req(identifier: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/attendance/scan")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_json(json!({ "identifier": identifier }))
    }

    fn get(uri: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::get()
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
    }

    fn post(uri: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
    }

    #[actix_web::test]
    async fn scan_then_roster() {
        let recorder = recorder();
        let scanner = scanner(&recorder, FakeCamera::ready());
        let app = app!(test_config(None), recorder, scanner);

        let body: Value = actix_test::call_and_read_body_json(&app, scan_req("E1").to_request()).await;
        assert_eq!(body["status"], "newly_marked");
        assert_eq!(body["title"], "Attendance Marked!");
        assert_eq!(body["employee"]["name"], "Alice");

        let body: Value = actix_test::call_and_read_body_json(&app, scan_req("E1").to_request()).await;
        assert_eq!(body["status"], "already_marked");

        let body: Value = actix_test::call_and_read_body_json(&app, scan_req("E9").to_request()).await;
        assert_eq!(body["status"], "not_found");
        assert!(body.get("employee").is_none());

        let body: Value =
            actix_test::call_and_read_body_json(&app, get("/api/attendance/today").to_request()).await;
        assert_eq!(body["present_count"], 1);
        assert_eq!(body["absent_count"], 1);
        assert_eq!(body["present"][0]["id"], "E1");
        assert_eq!(body["absent"][0]["id"], "E2");
    }

    #[actix_web::test]
    async fn scanner_start_stop_cycle() {
        let recorder = recorder();
        let camera = FakeCamera::ready();
        let scanner = scanner(&recorder, camera.clone());
        let app = app!(test_config(None), recorder, scanner);

        let body: Value =
            actix_test::call_and_read_body_json(&app, post("/api/scanner/start").to_request()).await;
        assert_eq!(body["session"], 1);

        let body: Value =
            actix_test::call_and_read_body_json(&app, post("/api/scanner/start").to_request()).await;
        assert_eq!(body["message"], "Already scanning");
        assert_eq!(camera.live_streams(), 1);

        let body: Value = actix_test::call_and_read_body_json(&app, get("/api/scanner").to_request()).await;
        assert_eq!(body["phase"], "scanning");

        let body: Value =
            actix_test::call_and_read_body_json(&app, post("/api/scanner/stop").to_request()).await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(camera.live_streams(), 0);

        let resp = actix_test::call_service(&app, post("/api/scanner/stop").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn denied_camera_is_service_unavailable() {
        let recorder = recorder();
        let scanner = scanner(&recorder, FakeCamera::denied());
        let app = app!(test_config(None), recorder, scanner);

        let resp = actix_test::call_service(&app, post("/api/scanner/start").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "Camera access denied or not available");
    }

    #[actix_web::test]
    async fn sheet_redirects_when_configured() {
        let recorder = recorder();
        let scanner = scanner(&recorder, FakeCamera::ready());
        let app = app!(
            test_config(Some("https://docs.example.com/sheet")),
            recorder,
            scanner
        );

        let resp = actix_test::call_service(&app, get("/api/sheet").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "https://docs.example.com/sheet"
        );

        let recorder = self::recorder();
        let scanner = self::scanner(&recorder, FakeCamera::ready());
        let app = app!(test_config(None), recorder, scanner);
        let resp = actix_test::call_service(&app, get("/api/sheet").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn limiter_handles_extreme_rates() {
        assert!(build_limiter(0).is_some());
        assert!(build_limiter(120).is_some());
        assert!(build_limiter(1_000_000).is_some());
    }
}
