#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardClient` using wiremock.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use visitgate_api::{AnalyticsQuery, CheckinReply, CheckinRequest, DashboardClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DashboardClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn january() -> AnalyticsQuery {
    AnalyticsQuery {
        days: None,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
    }
}

fn request(code: &str) -> CheckinRequest {
    CheckinRequest {
        qr_data: code.into(),
        purpose: None,
        destination: None,
    }
}

// ── Analytics tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_visitor_trend_sends_date_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/visitor_trend"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": "2024-01-02", "count": 4 },
            { "date": "2024-01-03", "count": 9 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let points = client.visitor_trend(&january()).await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[1].date, "2024-01-03");
    assert_eq!(points[1].count, 9);
}

#[tokio::test]
async fn test_days_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/top_visitors"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Ana Cruz", "count": 12 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = AnalyticsQuery {
        days: Some(30),
        ..AnalyticsQuery::default()
    };
    let top = client.top_visitors(&query).await.unwrap();

    assert_eq!(top[0].name, "Ana Cruz");
}

#[tokio::test]
async fn test_visit_durations_object_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/visit_durations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "durations": [
                { "name": "Ana", "duration_minutes": 12.5 },
                { "name": "Ben", "duration_minutes": 3.0 }
            ]
        })))
        .mount(&server)
        .await;

    let payload = client
        .visit_durations(&AnalyticsQuery::default())
        .await
        .unwrap();

    assert_eq!(payload.durations.len(), 2);
    assert!((payload.durations[0].duration_minutes - 12.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_null_purpose_is_tolerated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/purpose_distribution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "purpose": "Delivery", "count": 3 },
            { "purpose": null, "count": 1 }
        ])))
        .mount(&server)
        .await;

    let rows = client
        .purpose_distribution(&AnalyticsQuery::default())
        .await
        .unwrap();

    assert_eq!(rows[0].purpose.as_deref(), Some("Delivery"));
    assert_eq!(rows[1].purpose, None);
}

#[tokio::test]
async fn test_analytics_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/request_status_distribution"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client
        .request_status_distribution(&AnalyticsQuery::default())
        .await;

    let err = result.unwrap_err();
    assert!(err.is_transient());
    match err {
        Error::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, None);
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/destination_distribution"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = client
        .destination_distribution(&AnalyticsQuery::default())
        .await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Check-in tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_checkin_success_with_csrf_header() {
    let (server, client) = setup().await;
    client.set_csrf_token("tok-123".to_string().into());

    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .and(header("X-CSRFToken", "tok-123"))
        .and(body_json(json!({ "qr_data": "ABC1234" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Jane Checked-In." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = client.scan_checkin(&request("ABC1234")).await.unwrap();

    assert_eq!(
        reply,
        CheckinReply::Completed {
            message: "Jane Checked-In.".into(),
            details: Vec::new(),
        }
    );
}

#[tokio::test]
async fn test_checkin_sends_purpose_and_destination() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .and(body_json(json!({
            "qr_data": "ABC1234",
            "purpose": "Delivery",
            "destination": "Front Office"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let req = CheckinRequest {
        qr_data: "ABC1234".into(),
        purpose: Some("Delivery".into()),
        destination: Some("Front Office".into()),
    };
    client.scan_checkin(&req).await.unwrap();
}

#[tokio::test]
async fn test_checkin_show_modal() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "show_modal",
            "name": "Jane",
            "purpose": "Birthday Party"
        })))
        .mount(&server)
        .await;

    let reply = client.scan_checkin(&request("ABC1234")).await.unwrap();

    assert_eq!(
        reply,
        CheckinReply::NeedsConfirmation {
            name: "Jane".into(),
            purpose: Some("Birthday Party".into()),
            destination: None,
        }
    );
}

#[tokio::test]
async fn test_checkin_not_recognized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "QR code or unique code not recognized."
        })))
        .mount(&server)
        .await;

    let err = client.scan_checkin(&request("NOPE99")).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.server_message(),
        Some("QR code or unique code not recognized.")
    );
}

#[tokio::test]
async fn test_checkin_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Authentication required. Please log in."
        })))
        .mount(&server)
        .await;

    let result = client.scan_checkin(&request("ABC1234")).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("log in"), "unexpected message: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_cookie_requires_owned_jar() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();

    let shared = DashboardClient::with_client(reqwest::Client::new(), base_url.clone());
    assert!(!shared.set_session_cookie(&"session=abc".to_string().into()));

    let owned =
        DashboardClient::new(base_url, &visitgate_api::TransportConfig::default()).unwrap();
    assert!(owned.set_session_cookie(&"session=abc".to_string().into()));

    Mock::given(method("GET"))
        .and(path("/api/top_visitors"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = owned.top_visitors(&AnalyticsQuery::default()).await.unwrap();
    assert!(rows.is_empty());
}
