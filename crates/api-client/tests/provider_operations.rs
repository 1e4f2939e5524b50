//! CRUD provider integration tests against a mock origin
//!
//! Exercises the list query encoding, id normalization, the nested-create
//! shape, and both batch delete policies.

use carebase_api_client::prelude::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> DataProvider {
    let config = ClientConfig::development().with_base_url(server.uri());
    let transport = Transport::new(config, Arc::new(NoCredentials)).expect("transport");
    DataProvider::new(transport)
}

#[tokio::test]
async fn list_encodes_pagination_and_reads_total_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(query_param("_start", "10"))
        .and(query_param("_end", "20"))
        .and(query_param("_sort", "id"))
        .and(query_param("_order", "ASC"))
        .and(query_param("status", "active"))
        .and(query_param("q", ""))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "240")
                .set_body_json(json!([
                    {"_id": "pt-11", "name": "Okafor"},
                    {"_id": "pt-12", "name": "Silva"}
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let query = ListQuery::new()
        .with_page(2, 10)
        .with_filter("status", "active");
    let page = provider.list("patients", &query).await.expect("list");

    // Total is the origin's signal, not the page length.
    assert_eq!(page.total, 240);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0]["id"], json!("pt-11"));
    assert_eq!(page.data[0]["_id"], json!("pt-11"));
    server.verify().await;
}

#[tokio::test]
async fn list_total_defaults_to_zero_without_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"_id": 1}])))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let page = provider
        .list("patients", &ListQuery::new())
        .await
        .expect("list");
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn get_one_normalizes_and_404_classifies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients/pt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "pt-1", "name": "Okafor"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/patients/pt-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    let record = provider.get_one("patients", "pt-1").await.expect("get_one");
    assert_eq!(record["id"], json!("pt-1"));
    assert_eq!(record["name"], json!("Okafor"));

    let err = provider.get_one("patients", "pt-404").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "not found");
}

#[tokio::test]
async fn get_many_sends_one_id_param_per_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "b"}, {"_id": "a"}])),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let records = provider
        .get_many("patients", &["a".to_string(), "b".to_string()])
        .await
        .expect("get_many");

    // Ordering is the origin's contract; nothing is reordered client-side.
    assert_eq!(records[0]["id"], json!("b"));
    assert_eq!(records[1]["id"], json!("a"));

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default();
    assert_eq!(query, "id=a&id=b");
}

#[tokio::test]
async fn get_many_with_no_ids_skips_the_origin() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"_id": "a"}, {"_id": "b"}, {"_id": "c"}])),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let records = provider.get_many("patients", &[]).await.expect("get_many");

    assert!(records.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_many_reference_falls_back_to_page_length() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/encounters"))
        .and(query_param("patient_id", "pt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "e-1"}, {"_id": "e-2"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let page = provider
        .get_many_reference("encounters", "patient_id", "pt-1", &ListQuery::new())
        .await
        .expect("get_many_reference");

    assert_eq!(page.total, 2);
    assert_eq!(page.data.len(), 2);
    server.verify().await;
}

#[tokio::test]
async fn create_unwraps_nested_data_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/patients"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"_id": "pt-9", "name": "Nguyen"}})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let record = provider
        .create("patients", &json!({"name": "Nguyen"}))
        .await
        .expect("create");

    assert_eq!(record["id"], json!("pt-9"));
    assert_eq!(record["name"], json!("Nguyen"));
}

#[tokio::test]
async fn update_puts_to_the_id_scoped_url() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/patients/pt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "pt-1", "status": "discharged"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let record = provider
        .update("patients", "pt-1", &json!({"status": "discharged"}))
        .await
        .expect("update");

    assert_eq!(record["id"], json!("pt-1"));
    assert_eq!(record["status"], json!("discharged"));
    server.verify().await;
}

#[tokio::test]
async fn update_many_fails_fast_without_touching_the_origin() {
    let server = MockServer::start().await;

    let provider = provider_for(&server);
    let err = provider
        .update_many(
            "patients",
            &["a".to_string(), "b".to_string()],
            &json!({"ward": 3}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unsupported(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_returns_only_the_id() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/patients/pt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "pt-1", "name": "Okafor"})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let record = provider.delete("patients", "pt-1").await.expect("delete");

    assert_eq!(record.len(), 1);
    assert_eq!(record["id"], json!("pt-1"));
}

#[tokio::test]
async fn delete_tolerates_an_empty_json_response() {
    let server = MockServer::start().await;

    // Some origins answer DELETE with a JSON content type and no body.
    Mock::given(method("DELETE"))
        .and(path("/patients/pt-1"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let record = provider.delete("patients", "pt-1").await.expect("delete");

    assert_eq!(record.len(), 1);
    assert_eq!(record["id"], json!("pt-1"));
}

#[tokio::test]
async fn delete_many_reports_per_id_outcomes() {
    let server = MockServer::start().await;

    for id in ["a", "c"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/patients/{id}")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/patients/b"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let ids: Vec<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
    let outcomes = provider.delete_many("patients", &ids).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(!outcomes[1].is_ok());
    assert!(outcomes[2].is_ok());

    let err = outcomes[1].result.as_ref().unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "boom");

    // All three DELETEs went out despite b failing; the batch is non-atomic.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn delete_many_strict_propagates_the_first_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/patients/a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/patients/b"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "locked"})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let ids: Vec<String> = ["a", "b"].iter().map(ToString::to_string).collect();
    let err = provider
        .delete_many_strict("patients", &ids)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "locked");
}
