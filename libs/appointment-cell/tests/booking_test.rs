mod common;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::*;
use appointment_cell::AppointmentBookingService;
use holiday_cell::models::BlockKind;
use notification_cell::DispatchMode;
use shared_config::HolidayFetchPolicy;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

use common::{booking_request, config_for, day, RecordingDispatcher};

async fn mount_holidays(server: &MockServer, holidays: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_submit_persists_pending_snapshot_and_sends_request_notice() {
    let mock_server = MockServer::start().await;
    let date = day(2026, 11, 2);
    let appointment_id = Uuid::new_v4();

    mount_holidays(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "status": "pending",
            "specialty": "eyecare",
            "doctor": "Eye Care Specialist",
            "clinic": "Eye Care Clinic",
            "date": "2026-11-02",
            "time": "Morning (9 AM–12 PM)"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, "eyecare", date, "pending")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = RecordingDispatcher::new();
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), dispatcher.clone());

    let outcome = service
        .submit_on(booking_request(Specialty::Eyecare, date), day(2026, 10, 18))
        .await
        .unwrap();

    assert_eq!(outcome.appointment.id, appointment_id);
    assert_eq!(outcome.appointment.status, AppointmentStatus::Pending);
    assert!(outcome.notification.is_success());
    assert_eq!(dispatcher.modes(), vec![DispatchMode::Requested]);
    assert_eq!(dispatcher.sent()[0].1.appointment_id, appointment_id);
}

#[tokio::test]
async fn test_submit_on_clinic_holiday_is_rejected_without_persisting() {
    let mock_server = MockServer::start().await;
    let christmas = day(2025, 12, 25);

    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .and(query_param("date", "gte.2025-12-25"))
        .and(query_param("scope", "in.(all,gynecology)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::holiday_response(christmas, "Christmas", "all", "national")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dispatcher = RecordingDispatcher::new();
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), dispatcher.clone());

    let result = service
        .submit_on(booking_request(Specialty::Gynecology, christmas), day(2025, 12, 1))
        .await;

    let failure = match result {
        Err(AppointmentError::Validation(failure)) => failure,
        other => panic!("expected validation failure, got {:?}", other.map(|o| o.appointment.id)),
    };
    let block = failure.date_block().unwrap();
    assert_eq!(block.reason, "Christmas");
    assert_eq!(block.kind, BlockKind::ClinicWide);
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn test_unparseable_holiday_row_does_not_unblock_valid_holiday() {
    let mock_server = MockServer::start().await;
    let christmas = day(2025, 12, 25);

    mount_holidays(
        &mock_server,
        json!([
            MockSupabaseResponses::holiday_response(christmas, "Christmas", "all", "national"),
            MockSupabaseResponses::holiday_response(christmas, "Bank closure", "all", "public"),
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dispatcher = RecordingDispatcher::new();
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), dispatcher.clone());

    let result = service
        .submit_on(booking_request(Specialty::Eyecare, christmas), day(2025, 12, 1))
        .await;

    assert_matches!(
        result,
        Err(AppointmentError::Validation(ValidationFailure::DateBlocked(ref block))) if block.reason == "Christmas"
    );
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn test_submit_without_date_is_rejected_before_calendar_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), RecordingDispatcher::new());

    let mut request = booking_request(Specialty::Eyecare, day(2026, 11, 2));
    request.date = None;
    request.time = None;

    let result = service.submit_on(request, day(2026, 10, 18)).await;
    assert_matches!(result, Err(AppointmentError::Validation(ValidationFailure::DateRequired)));
}

#[tokio::test]
async fn test_submit_survives_notification_failure() {
    let mock_server = MockServer::start().await;
    let date = day(2026, 11, 3);
    let appointment_id = Uuid::new_v4();

    mount_holidays(&mock_server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, "eyecare", date, "pending")
        ])))
        .mount(&mock_server)
        .await;

    let dispatcher = RecordingDispatcher::failing();
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), dispatcher.clone());

    let outcome = service
        .submit_on(booking_request(Specialty::Eyecare, date), day(2026, 10, 18))
        .await
        .unwrap();

    assert_eq!(outcome.appointment.id, appointment_id);
    assert!(!outcome.notification.is_success());
    assert_eq!(outcome.notification.failures().count(), 2);
}

#[tokio::test]
async fn test_submit_store_failure_is_an_error_and_sends_nothing() {
    let mock_server = MockServer::start().await;

    mount_holidays(&mock_server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("duplicate key value", "23505"),
        ))
        .mount(&mock_server)
        .await;

    let dispatcher = RecordingDispatcher::new();
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), dispatcher.clone());

    let result = service
        .submit_on(booking_request(Specialty::Eyecare, day(2026, 11, 2)), day(2026, 10, 18))
        .await;

    assert_matches!(result, Err(AppointmentError::DatabaseError(_)));
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn test_holiday_outage_fails_open_by_default() {
    let mock_server = MockServer::start().await;
    let date = day(2026, 11, 4);

    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response(Uuid::new_v4(), "eyecare", date, "pending")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), RecordingDispatcher::new());
    let outcome = service
        .submit_on(booking_request(Specialty::Eyecare, date), day(2026, 10, 18))
        .await;

    assert!(outcome.is_ok());
}

#[tokio::test]
async fn test_holiday_outage_fails_closed_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let config = TestConfig {
        holiday_fetch_policy: HolidayFetchPolicy::FailClosed,
        ..TestConfig::with_mock_server(&mock_server.uri())
    }
    .to_app_config();
    let service = AppointmentBookingService::with_dispatcher(&config, RecordingDispatcher::new());

    let result = service
        .submit_on(booking_request(Specialty::Eyecare, day(2026, 11, 4)), day(2026, 10, 18))
        .await;

    assert_matches!(result, Err(AppointmentError::HolidayCalendarUnavailable(_)));
}

#[tokio::test]
async fn test_search_builds_store_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("specialty", "eq.gynecology"))
        .and(query_param("status", "eq.pending"))
        .and(query_param("date", "gte.2026-11-01"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(Uuid::new_v4(), "gynecology", day(2026, 11, 2), "pending")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), RecordingDispatcher::new());
    let query = AppointmentSearchQuery {
        specialty: Some(Specialty::Gynecology),
        status: Some(AppointmentStatus::Pending),
        from_date: Some(day(2026, 11, 1)),
        limit: Some(20),
        ..Default::default()
    };

    let appointments = service.search_appointments(query, "staff-token").await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].doctor, "Gynecology Specialist");
}

#[tokio::test]
async fn test_search_rejects_inverted_range() {
    let mock_server = MockServer::start().await;
    let service = AppointmentBookingService::with_dispatcher(&config_for(&mock_server), RecordingDispatcher::new());

    let query = AppointmentSearchQuery {
        from_date: Some(day(2026, 12, 1)),
        to_date: Some(day(2026, 11, 1)),
        ..Default::default()
    };
    let result = service.search_appointments(query, "staff-token").await;
    assert_matches!(result, Err(AppointmentError::InvalidQuery(_)));
}

#[test]
fn test_available_slots_are_the_fixed_labels() {
    let config = TestConfig::default().to_app_config();
    let service = AppointmentBookingService::with_dispatcher(&config, RecordingDispatcher::new());
    let labels: Vec<&str> = service.available_slots().iter().map(|s| s.label()).collect();
    assert_eq!(
        labels,
        vec!["Morning (9 AM–12 PM)", "Afternoon (12 PM–4 PM)", "Evening (4 PM–7 PM)"]
    );
}
