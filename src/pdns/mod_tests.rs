// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the control API client

use super::*;
use crate::records::{RRType, RRset, ResourceRecordValue};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE_PATH: &str = "/api/v1/servers/localhost/zones/example.com.";

fn client_for(server: &MockServer) -> PdnsClient {
    PdnsClient::new(&server.uri(), "localhost", "secret", Duration::from_secs(5)).unwrap()
}

#[test]
fn test_build_api_url() {
    assert_eq!(PdnsClient::build_api_url("pdns:8081"), "http://pdns:8081");
    assert_eq!(
        PdnsClient::build_api_url("https://pdns.example.com/"),
        "https://pdns.example.com"
    );
}

#[test]
fn test_invalid_url_is_rejected() {
    let err = PdnsClient::new("http://", "localhost", "k", Duration::from_secs(1)).unwrap_err();
    assert_eq!(err.category(), "connection");
}

#[tokio::test]
async fn test_fetch_zone_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .and(header("X-API-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "example.com.",
            "kind": "Native",
            "serial": 2024010101u32,
            "rrsets": [{
                "name": "www.example.com.",
                "type": "A",
                "ttl": 300,
                "records": [{"content": "192.0.2.1", "disabled": false}],
                "comments": [{"content": "web", "account": "ops", "modified_at": 1}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zone = client_for(&server).fetch_zone("example.com").await.unwrap();

    assert_eq!(zone.serial, 2_024_010_101);
    assert_eq!(zone.rrsets.len(), 1);
    assert_eq!(zone.rrsets[0].rtype, RRType::A);
    assert_eq!(zone.rrsets[0].comments[0].account, "ops");
}

#[tokio::test]
async fn test_patch_sends_wire_body() {
    let server = MockServer::start().await;
    let expected = json!({
        "rrsets": [
            {
                "name": "old.example.com.",
                "type": "A",
                "changetype": "DELETE",
                "records": []
            },
            {
                "name": "www.example.com.",
                "type": "A",
                "changetype": "REPLACE",
                "ttl": 300,
                "records": [{"content": "192.0.2.1", "disabled": false}],
                "comments": []
            }
        ]
    });
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(header("X-API-Key", "secret"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let changes = vec![
        ChangeOperation::delete("old.example.com.", RRType::A),
        ChangeOperation::replace(RRset {
            name: "www.example.com.".to_string(),
            rtype: RRType::A,
            ttl: 300,
            records: vec![ResourceRecordValue::new("192.0.2.1", false)],
            comments: Vec::new(),
        }),
    ];
    client_for(&server)
        .patch_rrsets("example.com.", &changes)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_carries_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"error": "RRset www.example.com. IN A: Conflicts with pre-existing RRset"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .patch_rrsets("example.com", &[ChangeOperation::delete("www.example.com.", RRType::A)])
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(422));
    assert!(err.to_string().contains("Conflicts with pre-existing RRset"));
}

#[tokio::test]
async fn test_failed_request_is_counted_by_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "Parsing record content"})))
        .mount(&server)
        .await;

    let counter = crate::metrics::API_ERRORS_TOTAL.with_label_values(&["http_status", "ApiUnprocessable"]);
    let before = counter.get();

    let err = client_for(&server)
        .patch_rrsets("example.com", &[ChangeOperation::delete("www.example.com.", RRType::A)])
        .await
        .unwrap_err();

    assert_eq!(err.reason(), "ApiUnprocessable");
    assert!(counter.get() - before >= 1.0);
}

#[tokio::test]
async fn test_embedded_error_on_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "backend down"})))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_zone("example.com").await.unwrap_err();
    assert!(matches!(err, ApiError::EmbeddedError { ref message, .. } if message == "backend down"));
}

#[tokio::test]
async fn test_undecodable_zone_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_zone("example.com").await.unwrap_err();
    assert_eq!(err.category(), "decode");
}

#[tokio::test]
async fn test_zone_exists_maps_not_found_to_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/0.0.10.in-addr.arpa."))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/10.in-addr.arpa."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "10.in-addr.arpa.", "serial": 1, "rrsets": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.zone_exists("0.0.10.in-addr.arpa").await.unwrap());
    assert!(client.zone_exists("10.in-addr.arpa").await.unwrap());
}

#[tokio::test]
async fn test_zone_exists_propagates_other_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/10.in-addr.arpa."))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .zone_exists("10.in-addr.arpa")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_create_zone_posts_kind_and_masters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(body_json(json!({
            "name": "0.0.10.in-addr.arpa.",
            "kind": "Master",
            "masters": [],
            "nameservers": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "0.0.10.in-addr.arpa."})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .create_zone("0.0.10.in-addr.arpa", "Master", &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_server_is_connection_failure() {
    let client = PdnsClient::new("127.0.0.1:1", "localhost", "k", Duration::from_secs(2)).unwrap();
    let err = client.fetch_zone("example.com").await.unwrap_err();
    assert_eq!(err.category(), "connection");
}
