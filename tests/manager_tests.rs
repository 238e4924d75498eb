//! Resource manager behavior against a mock bucket service

use dui_bucket_sdk::{
    BucketClient, BucketSdk, Config, CreateBucketOptions, DynamicApiKeyProvider, Error,
    ErrorReport, NoopLogger, PayloadEncryptor, UploadOptions,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sdk(base_url: &str) -> BucketSdk {
    BucketSdk::with_components(
        Config::new(base_url).with_domain("https://cdn.example.com"),
        Arc::new(NoopLogger),
        Arc::new(DynamicApiKeyProvider::new().with_key("service-api-key")),
        PayloadEncryptor::new("manager-test-secret", "0123456789abcdef").unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn bucket_create_sends_required_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buckets"))
        .and(body_json(json!({
            "name": "reports",
            "access": "private",
            "groups": ["admins"],
            "quota": 1000,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "reports"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = sdk(&server.uri())
        .buckets()
        .create(
            "reports",
            CreateBucketOptions::new("private", vec!["admins".to_string()])
                .with_field("quota", json!(1000)),
        )
        .await
        .unwrap();
    assert_eq!(response, json!({"name": "reports"}));
}

#[tokio::test]
async fn bucket_update_rejects_empty_fields_without_a_call() {
    let server = MockServer::start().await;
    let err = sdk(&server.uri())
        .buckets()
        .update("reports", Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn bucket_delete_sends_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/buckets/reports"))
        .and(body_json(json!({"confirmation": "DELETE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    sdk(&server.uri())
        .buckets()
        .delete("reports", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn bucket_list_forwards_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let query = HashMap::from([("page".to_string(), "2".to_string())]);
    sdk(&server.uri()).buckets().list(query).await.unwrap();
}

#[tokio::test]
async fn bucket_stats_hits_the_stats_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let stats = sdk(&server.uri()).buckets().stats().await.unwrap();
    assert_eq!(stats, json!({"total": 5}));
}

#[tokio::test]
async fn file_upload_builds_a_multipart_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "bucket": "public",
                "uuid": "6f3c9a1e-9f0b-4c5d-8a2e-1b2c3d4e5f60",
                "name": "notes.txt",
                "size": 11,
                "mime_type": "text/plain"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
    file.write_all(b"hello world").unwrap();

    let record = sdk(&server.uri())
        .files()
        .upload(file.path(), "public", UploadOptions::new().with_path("docs"))
        .await
        .unwrap();
    assert_eq!(record.bucket, "public");
    assert_eq!(record.name, "notes.txt");

    let request = &server.received_requests().await.unwrap()[0];
    let content_type = request
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "boundary must be transport-assigned, got {content_type}"
    );

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"bucket\""));
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("name=\"encrypt\""));
    assert!(body.contains("name=\"path\""));
    assert!(body.contains("hello world"));
}

#[tokio::test]
async fn file_upload_rejects_missing_file() {
    let server = MockServer::start().await;
    let err = sdk(&server.uri())
        .files()
        .upload("/nonexistent/file.txt", "public", UploadOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_list_decodes_paginated_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets/public/files"))
        .and(query_param("perPage", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "bucket": "public",
                "uuid": "6f3c9a1e-9f0b-4c5d-8a2e-1b2c3d4e5f60",
                "name": "notes.txt",
                "size": 11
            }],
            "page": 1,
            "perPage": 10,
            "pageCount": 1,
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = HashMap::from([("perPage".to_string(), "10".to_string())]);
    let page = sdk(&server.uri())
        .files()
        .list("public", query)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.per_page, 10);
    assert_eq!(page.items[0].name, "notes.txt");
}

#[tokio::test]
async fn file_info_and_delete_target_the_bucket_scoped_path() {
    let server = MockServer::start().await;
    let uuid = "6f3c9a1e-9f0b-4c5d-8a2e-1b2c3d4e5f60";
    Mock::given(method("GET"))
        .and(path(format!("/buckets/public/files/{uuid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bucket": "public",
            "uuid": uuid,
            "name": "notes.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/buckets/public/files/{uuid}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let files = sdk(&server.uri()).files();
    let record = files.info("public", uuid).await.unwrap();
    assert_eq!(record.uuid.to_string(), uuid);
    files.delete("public", uuid).await.unwrap();
}

#[tokio::test]
async fn generate_link_returns_url_and_flags_missing_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/abc/link"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"url": "https://cdn/f/abc"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/bad/link"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let files = sdk(&server.uri()).files();
    assert_eq!(files.generate_link("abc").await.unwrap(), "https://cdn/f/abc");
    assert!(matches!(
        files.generate_link("bad").await.unwrap_err(),
        Error::Decode(_)
    ));
}

#[tokio::test]
async fn generate_links_reports_per_file_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/links"))
        .and(body_json(json!({"uuids": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": {
                "a": {"url": "https://cdn/f/a"},
                "b": {"error": "file deleted"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let links = sdk(&server.uri())
        .files()
        .generate_links(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(links["a"].url.as_deref(), Some("https://cdn/f/a"));
    assert_eq!(links["b"].error.as_deref(), Some("file deleted"));
}

#[tokio::test]
async fn download_returns_raw_bytes_with_signature_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/abc"))
        .and(query_param("signature", "sig-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("binary content", "application/octet-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let query = HashMap::from([("signature".to_string(), "sig-1".to_string())]);
    let bytes = sdk(&server.uri())
        .files()
        .download("abc", query)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"binary content");
}

#[tokio::test]
async fn local_link_uses_the_configured_domain() {
    let server = MockServer::start().await;
    let files = sdk(&server.uri()).files();
    assert_eq!(
        files.local_link("abc").unwrap(),
        "https://cdn.example.com/files/abc"
    );
}

#[tokio::test]
async fn log_save_posts_uid_action_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs"))
        .and(body_json(json!({
            "uid": "user-1",
            "action": "file.download",
            "metadata": {"uuid": "abc"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .expect(1)
        .mount(&server)
        .await;

    sdk(&server.uri())
        .logs()
        .save("user-1", "file.download", json!({"uuid": "abc"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn log_index_and_stats_use_expected_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .and(query_param("uid", "user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let logs = sdk(&server.uri()).logs();
    let filters = HashMap::from([("uid".to_string(), "user-1".to_string())]);
    logs.index(filters).await.unwrap();
    logs.stats().await.unwrap();
}

#[tokio::test]
async fn error_save_serializes_the_trace_to_a_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/errors"))
        .and(body_json(json!({
            "message": "boom",
            "level": "error",
            "trace_log": "[\"frame1\",\"frame2\"]",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .expect(1)
        .mount(&server)
        .await;

    sdk(&server.uri())
        .errors()
        .save(
            "boom",
            ErrorReport::new()
                .with_level("error")
                .with_trace(json!(["frame1", "frame2"])),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn error_delete_sends_filters_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/errors"))
        .and(body_json(json!({"level": "debug"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let response = sdk(&server.uri())
        .errors()
        .delete(json!({"level": "debug"}))
        .await
        .unwrap();
    assert_eq!(response, json!({"deleted": 3}));
}

#[tokio::test]
async fn fatal_reporter_escalates_through_the_errors_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/errors"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = sdk(&server.uri());
    sdk.fatal_reporter()
        .report("unhandled panic", "at worker.rs:42")
        .await;

    let request = &server.received_requests().await.unwrap()[0];
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["message"], "unhandled panic");
    assert_eq!(body["trace"], "at worker.rs:42");
}

#[tokio::test]
async fn manager_errors_propagate_http_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets/stats"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&server)
        .await;

    let err = sdk(&server.uri()).buckets().stats().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 403, .. }));
}

#[tokio::test]
async fn user_token_set_on_shared_client_reaches_manager_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets/stats"))
        .and(wiremock::matchers::header("Authorization", "Bearer jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = sdk(&server.uri());
    sdk.client().set_user_token(Some("jwt".to_string()));
    sdk.buckets().stats().await.unwrap();
}

// keep the shared client alive as a standalone value too
#[tokio::test]
async fn client_is_usable_outside_the_composition_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 2})))
        .mount(&server)
        .await;

    let client: Arc<BucketClient> = sdk(&server.uri()).client();
    let value = client
        .request(
            dui_bucket_sdk::Method::GET,
            "/logs/stats",
            dui_bucket_sdk::RequestBody::None,
        )
        .await
        .unwrap();
    assert_eq!(value, json!({"total": 2}));
}
