//! Tests for the raw fetch stage

use super::*;
use crate::error::ErrorKind;
use crate::storage::{ObjectReader, StoreReader};
use chrono::TimeZone;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: String) -> FetchRequest {
    FetchRequest {
        url,
        dataset_provider: "ea".to_string(),
        dataset_name: "floods".to_string(),
        dataset_type: "json".to_string(),
        raw_bucket: "raw".to_string(),
        data_lake_bucket: "lake".to_string(),
        data_lake_database_name: "lake_db".to_string(),
    }
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 4, 10, 21, 41).unwrap()
}

#[test]
fn test_raw_key_format() {
    let key = RawFetcher::raw_key(&request("http://x".into()), fixed_time());
    assert_eq!(key, "ea/floods/floods-2024-01-04T10:21:41.000000.json");
}

#[tokio::test]
async fn test_fetch_stores_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flood-monitoring/id/floods"))
        .and(header("user-agent", "lake-loader-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": []}"#))
        .expect(1)
        .mount(&server)
        .await;

    let stores = Arc::new(BucketStores::in_memory());
    let settings = FetchSettings {
        user_agent: "lake-loader-test".to_string(),
        ..FetchSettings::default()
    };
    let fetcher = RawFetcher::new(Arc::clone(&stores), &settings).unwrap();

    let output = fetcher
        .fetch_at(
            &request(format!("{}/flood-monitoring/id/floods", server.uri())),
            fixed_time(),
        )
        .await
        .unwrap();

    assert_eq!(
        output,
        InvocationInput {
            raw_bucket: "raw".to_string(),
            raw_key: "ea/floods/floods-2024-01-04T10:21:41.000000.json".to_string(),
            dataset_provider: "ea".to_string(),
            dataset_name: "floods".to_string(),
            data_lake_bucket: "lake".to_string(),
            data_lake_database_name: "lake_db".to_string(),
        }
    );

    let stored = StoreReader::new(stores).fetch(&output.raw_ref()).await.unwrap();
    assert_eq!(&stored[..], br#"{"items": []}"#);
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let stores = Arc::new(BucketStores::in_memory());
    let fetcher = RawFetcher::new(Arc::clone(&stores), &FetchSettings::default()).unwrap();

    let err = fetcher.fetch(&request(server.uri())).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FetchFailure);
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn test_fetch_truncates_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("x".repeat(5000)))
        .mount(&server)
        .await;

    let fetcher =
        RawFetcher::new(Arc::new(BucketStores::in_memory()), &FetchSettings::default()).unwrap();
    let err = fetcher.fetch(&request(server.uri())).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body.len(), BODY_EXCERPT_LEN);
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    let fetcher =
        RawFetcher::new(Arc::new(BucketStores::in_memory()), &FetchSettings::default()).unwrap();
    let err = fetcher
        .fetch(&request("not a url".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FetchFailure);
}

#[tokio::test]
async fn test_fetch_requires_dataset_type() {
    let fetcher =
        RawFetcher::new(Arc::new(BucketStores::in_memory()), &FetchSettings::default()).unwrap();
    let mut req = request("http://localhost/".to_string());
    req.dataset_type = String::new();

    let err = fetcher.fetch(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
