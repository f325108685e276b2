//! HTTP gateway integration tests
//!
//! Exercises `HttpGateway` against a `wiremock` mock server: routes, bearer
//! authentication, request bodies and failure mapping.

mod common;

use bytes::Bytes;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{documents_json, gateway_for};
use securedoc::gateway::{
    ActivityQuery, DocumentGateway, GatewayError, UploadFile, GENERIC_FAILURE,
};
use securedoc::secret::Secret;

#[tokio::test]
async fn test_list_sends_bearer_and_parses_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/list"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(documents_json(&[("1", "a.pdf", true), ("2", "b.png", false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let docs = gateway_for(&server.uri()).list_documents(None).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "1");
    assert_eq!(docs[0].file_name, "a.pdf");
    assert!(docs[0].encrypted);
    assert!(!docs[1].encrypted);
    assert_eq!(docs[1].path, "https://bucket.example.com/b.png");
}

#[tokio::test]
async fn test_search_passes_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/list"))
        .and(query_param("q", "invoice march"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(documents_json(&[("7", "Invoice-March.pdf", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let docs = gateway_for(&server.uri())
        .list_documents(Some("invoice march"))
        .await
        .unwrap();
    assert_eq!(docs[0].id, "7");
}

#[tokio::test]
async fn test_failure_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/missing/summary"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let err = gateway_for(&server.uri())
        .get_summary("missing")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Remote {
            status: 404,
            message: Some("not found".to_string())
        }
    );
    assert_eq!(err.user_message(), "not found");
}

#[tokio::test]
async fn test_non_json_failure_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/list"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let err = gateway_for(&server.uri())
        .list_documents(None)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Remote { status: 502, message: None }));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let gateway = gateway_for("http://127.0.0.1:9");
    let err = gateway.list_documents(None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn test_summary_present_and_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/d1/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Revenue grew."})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/d2/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": ""})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri());
    assert_eq!(
        gateway.get_summary("d1").await.unwrap().as_deref(),
        Some("Revenue grew.")
    );
    assert_eq!(gateway.get_summary("d2").await.unwrap(), None);
}

#[tokio::test]
async fn test_email_body_with_and_without_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/d1/email"))
        .and(body_json(json!({"password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/d2/email"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri());
    gateway
        .send_email("d1", Some(&Secret::new("pw")))
        .await
        .unwrap();
    gateway.send_email("d2", None).await.unwrap();
}

#[tokio::test]
async fn test_upload_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "doc": {
                    "_id": "new1",
                    "fileName": "report.pdf",
                    "encrypted": true,
                    "summary": "A short report."
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = UploadFile::new("report.pdf", Bytes::from_static(b"%PDF-1.7 body"));
    let docs = gateway_for(&server.uri())
        .upload(&file, &Secret::new("s3cret"))
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "new1");
    assert_eq!(docs[0].summary.as_deref(), Some("A short report."));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"pdf\""));
    assert!(body.contains("filename=\"report.pdf\""));
    assert!(body.contains("%PDF-1.7 body"));
    assert!(body.contains("name=\"uploadPassword\""));
    assert!(body.contains("s3cret"));
}

#[tokio::test]
async fn test_download_posts_password_and_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/files/download/d1"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"password": "123456"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = gateway_for(&server.uri())
        .download("d1", &Secret::new("123456"))
        .await
        .unwrap();
    assert_eq!(&payload[..], b"%PDF-1.7");
}

#[tokio::test]
async fn test_wrong_otp_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/files/download/d1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid OTP"})))
        .mount(&server)
        .await;

    let err = gateway_for(&server.uri())
        .download("d1", &Secret::new("000000"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid OTP");
}

#[tokio::test]
async fn test_activity_query_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("action", "email"))
        .and(query_param("from", "2024-03-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{
                "_id": "l1",
                "action": "email",
                "fileName": "a.pdf",
                "extra": "sent to ada@example.com",
                "userEmail": "ada@example.com",
                "createdAt": "2024-03-02T08:30:00Z"
            }],
            "meta": {"page": 2, "pages": 4, "total": 31}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ActivityQuery {
        page: 2,
        limit: 10,
        action: Some("email".to_string()),
        from: Some("2024-03-01".to_string()),
        ..ActivityQuery::default()
    };
    let page = gateway_for(&server.uri())
        .list_activity(&query)
        .await
        .unwrap();

    assert_eq!(page.meta.pages, 4);
    assert_eq!(page.meta.total, 31);
    assert_eq!(page.logs[0].details.as_deref(), Some("sent to ada@example.com"));
    assert!(page.logs[0].created_at.is_some());
}
