mod common;

use activity::api::{Client, Error};
use activity::jql::{self, Activity};
use common::{args, issue, page, JqlContains, SEARCH_PATH};
use jira_activity_app::{activity_report, build_client, Config};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn report_error(server: &MockServer) -> (Error, String) {
    let mut out = Vec::new();
    let err = activity_report(args(server.uri(), "2025-03-03", "2025-03-17"), &mut out)
        .await
        .unwrap_err();
    (err, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn rejected_credentials_are_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Client must be authenticated"))
        .expect(1)
        .mount(&server)
        .await;

    let (err, _) = report_error(&server).await;
    match err {
        Error::Auth(reason) => assert!(reason.contains("Client must be authenticated"), "{}", reason),
        err => panic!("expected auth error, got {:?}", err),
    }
}

#[tokio::test]
async fn forbidden_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (err, _) = report_error(&server).await;
    assert!(matches!(err, Error::Auth(_)), "{:?}", err);
}

#[tokio::test]
async fn server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let (err, _) = report_error(&server).await;
    match err {
        Error::Transport(reason) => {
            assert!(reason.contains("500"), "{}", reason);
            assert!(reason.contains("upstream exploded"), "{}", reason);
        }
        err => panic!("expected transport error, got {:?}", err),
    }
}

#[tokio::test]
async fn malformed_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (err, _) = report_error(&server).await;
    assert!(matches!(err, Error::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn issue_without_type_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "issues": [{ "key": "NAV-1", "fields": { "summary": "x" } }] })),
        )
        .mount(&server)
        .await;

    let (err, _) = report_error(&server).await;
    assert!(matches!(err, Error::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![issue("NAV-1", "Bug")], None, None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut args = args(server.uri(), "2025-03-03", "2025-03-17");
    args.timeout = 1;
    let config = Config::try_from(args).unwrap();
    let client = build_client(&config).unwrap();
    let query = jql::query(Activity::Created, config.start, config.end, &config.story_points_field, 100);

    let err = client.search_page(&query, None).await.unwrap_err();
    match err {
        Error::Transport(reason) => assert!(reason.contains("timed out"), "{}", reason),
        err => panic!("expected transport error, got {:?}", err),
    }
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // nothing listens on the discard port
    let mut out = Vec::new();
    let err = activity_report(args("http://127.0.0.1:9".to_string(), "2025-03-03", "2025-03-17"), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut args = args(server.uri(), "2025-03-03", "2025-03-17");
    args.token = None;
    let mut out = Vec::new();
    let err = activity_report(args, &mut out).await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)), "{:?}", err);
    assert!(out.is_empty());
}

#[tokio::test]
async fn invalid_dates_are_range_error() {
    let server = MockServer::start().await;
    let mut out = Vec::new();

    let err = activity_report(args(server.uri(), "2025-13-01", "2025-03-17"), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange(_)), "{:?}", err);

    let err = activity_report(args(server.uri(), "2025-03-17", "2025-03-03"), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange(_)), "{:?}", err);
    assert!(out.is_empty());
}

#[tokio::test]
async fn failure_keeps_completed_sections_whole() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(JqlContains("reporter = currentUser()"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![issue("NAV-1", "Story")], None, Some(1))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(JqlContains("assignee = currentUser()"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let (err, report) = report_error(&server).await;

    assert!(matches!(err, Error::Transport(_)), "{:?}", err);
    assert!(report.contains("📝 Tickets You Created"));
    assert!(report.ends_with("    • Story: 1 (100.0%)\n\n"), "{}", report);
    assert!(!report.contains("Tickets You Resolved"));
}
