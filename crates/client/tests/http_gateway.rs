// crates/client/tests/http_gateway.rs
//! Drives `PortalClient` against a mock backend.

use std::time::Duration;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;

use report_portal_client::{ClientConfig, PortalClient};
use report_portal_core::{AuthGateway, GatewayError, ReportGateway, UploadRequest};
use report_portal_types::{
    AccessToken, Category, ReportKey, SiteId, UploadFile, UploadMode,
};

fn client(url: &str) -> PortalClient {
    PortalClient::new(&ClientConfig::new(url, Duration::from_secs(5))).unwrap()
}

fn token() -> AccessToken {
    AccessToken::new("tok-123")
}

fn key() -> ReportKey {
    ReportKey::new(SiteId::Admin, Category::Macd, "2024-01-05".parse().unwrap())
}

#[tokio::test]
async fn test_login_posts_credentials_and_parses_sites() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/login")
        .match_body(Matcher::Json(json!({"email": "ana@example.com", "password": "pw"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "abc", "allowed_sites": "personal, admin"}"#)
        .create_async()
        .await;

    let resp = client(&server.url()).login("ana@example.com", "pw").await.unwrap();
    assert_eq!(resp.access_token.as_str(), "abc");
    assert_eq!(
        resp.allowed_sites.to_set().into_iter().collect::<Vec<_>>(),
        vec![SiteId::Personal, SiteId::Admin]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_rejection_carries_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/login")
        .with_status(401)
        .with_body(r#"{"detail": "Invalid credentials"}"#)
        .create_async()
        .await;

    let err = client(&server.url()).login("ana@example.com", "bad").await.unwrap_err();
    assert_eq!(err, GatewayError::Unauthorized("Invalid credentials".into()));
}

#[tokio::test]
async fn test_list_dates_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/report-dates/shared/RSI")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(r#"["2024-01-05", "2024-01-04T00:00:00"]"#)
        .create_async()
        .await;

    let dates = client(&server.url())
        .list_dates(&token(), SiteId::Shared, Category::Rsi)
        .await
        .unwrap();
    let labels: Vec<String> = dates.iter().map(ToString::to_string).collect();
    assert_eq!(labels, vec!["2024-01-05", "2024-01-04"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_reports_for_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/reports/admin/MACD/2024-01-05")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(r#"[{"id": 3, "file_name": "macd.pdf", "file_type": "pdf"}]"#)
        .create_async()
        .await;

    let reports = client(&server.url()).list_reports(&token(), &key()).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, 3);
    assert_eq!(reports[0].file_name, "macd.pdf");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_sends_exactly_one_mode_flag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/upload-report")
        .match_header("authorization", "Bearer tok-123")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="site_name"\r\n\r\nadmin"#.into()),
            Matcher::Regex(r#"name="category"\r\n\r\nMACD"#.into()),
            Matcher::Regex(r#"name="date"\r\n\r\n2024-01-05"#.into()),
            Matcher::Regex(r#"filename="macd.pdf""#.into()),
            Matcher::Regex(r#"name="override"\r\n\r\nfalse"#.into()),
            Matcher::Regex(r#"name="save_as_new"\r\n\r\ntrue"#.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"report": {"id": 9, "file_name": "macd.pdf", "file_type": "pdf"}}"#)
        .create_async()
        .await;

    let request = UploadRequest {
        key: key(),
        file: UploadFile::new("macd.pdf", b"%PDF-1.4".to_vec()),
        mode: UploadMode::SaveAsNew,
    };
    let uploaded = client(&server.url())
        .upload_report(&token(), &request)
        .await
        .unwrap();
    assert_eq!(uploaded.id, Some(9));
    assert_eq!(uploaded.file_name, "macd.pdf");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_server_error_keeps_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/upload-report")
        .with_status(500)
        .with_body(r#"{"detail": "disk full"}"#)
        .create_async()
        .await;

    let request = UploadRequest {
        key: key(),
        file: UploadFile::new("macd.pdf", b"%PDF".to_vec()),
        mode: UploadMode::Fresh,
    };
    let err = client(&server.url())
        .upload_report(&token(), &request)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Server {
            status: 500,
            detail: "disk full".into()
        }
    );
    assert_eq!(err.detail(), "disk full");
}

#[tokio::test]
async fn test_error_without_detail_is_unknown() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/reports/admin/MACD/2024-01-05")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let err = client(&server.url()).list_reports(&token(), &key()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.detail(), "Unknown error");
}

#[tokio::test]
async fn test_delete_report_by_id() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("DELETE", "/delete-report/7")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(r#"{"detail": "Report deleted"}"#)
        .create_async()
        .await;
    let missing = server
        .mock("DELETE", "/delete-report/8")
        .with_status(404)
        .with_body(r#"{"detail": "Report not found"}"#)
        .create_async()
        .await;

    let client = client(&server.url());
    client.delete_report(&token(), 7).await.unwrap();
    let err = client.delete_report(&token(), 8).await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound("Report not found".into()));
    ok.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/report-dates/admin/MACD")
        .with_status(200)
        .with_body(r#"{"dates": []}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .list_dates(&token(), SiteId::Admin, Category::Macd)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let err = client("http://127.0.0.1:1")
        .list_dates(&token(), SiteId::Admin, Category::Macd)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
