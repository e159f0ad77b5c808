//! Integration tests for NIP-05 identity resolution.
//!
//! A local wiremock server stands in for each domain's
//! `/.well-known/nostr.json`.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gitnostr::identity::{IdentityError, IdentityResolver, Nip05Resolver};

const BOB_KEY: &str = "b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0";

async fn server_with_names(name: &str, names: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/nostr.json"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "names": names })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn resolves_named_identifier() {
    let server = server_with_names("bob", json!({ "bob": BOB_KEY })).await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let key = resolver.resolve("bob@example.com").await.unwrap();

    assert_eq!(key.as_str(), BOB_KEY);
}

#[tokio::test]
async fn name_is_lowercased_before_lookup() {
    let server = server_with_names("bob", json!({ "bob": BOB_KEY })).await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let key = resolver.resolve("Bob@example.com").await.unwrap();

    assert_eq!(key.as_str(), BOB_KEY);
}

#[tokio::test]
async fn bare_domain_uses_root_name() {
    let server = server_with_names("_", json!({ "_": BOB_KEY })).await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let key = resolver.resolve("example.com").await.unwrap();

    assert_eq!(key.as_str(), BOB_KEY);
}

#[tokio::test]
async fn missing_name_is_not_found() {
    let server = server_with_names("carol", json!({ "bob": BOB_KEY })).await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let result = resolver.resolve("carol@example.com").await;

    assert_eq!(
        result,
        Err(IdentityError::NotFound("carol@example.com".to_string()))
    );
}

#[tokio::test]
async fn http_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/nostr.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let result = resolver.resolve("dave@example.com").await;

    assert_eq!(
        result,
        Err(IdentityError::NotFound("dave@example.com".to_string()))
    );
}

#[tokio::test]
async fn server_error_is_a_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/nostr.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let result = resolver.resolve("bob@example.com").await;

    assert!(matches!(result, Err(IdentityError::Network(_))));
}

#[tokio::test]
async fn malformed_key_is_rejected() {
    let server = server_with_names("bob", json!({ "bob": "not-a-key" })).await;
    let resolver = Nip05Resolver::with_base_url(server.uri());

    let result = resolver.resolve("bob@example.com").await;

    assert!(matches!(result, Err(IdentityError::Network(_))));
}
