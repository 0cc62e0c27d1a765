//! Integration tests for the HTTP source — query shape, payload formats,
//! `$count`, authentication, and error mapping — against a mock server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use muninn::{CacheError, DataCache, MemoryStoreFactory, Prefetch, StoreFactory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: u64,
    name: String,
}

fn people(range: std::ops::Range<u64>) -> Vec<Person> {
    range
        .map(|id| Person {
            id,
            name: format!("person-{id}"),
        })
        .collect()
}

fn value_payload(records: &[Person]) -> serde_json::Value {
    serde_json::json!({ "value": records })
}

#[tokio::test]
async fn read_issues_skip_top_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(query_param("$skip", "0"))
        .and(query_param("$top", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(value_payload(&people(0..10))))
        .expect(1)
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .page_size(10)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    let records = cache.read_range(0, 10).await.unwrap();
    assert_eq!(records, people(0..10));
}

#[tokio::test]
async fn verbose_payload_shape_is_accepted() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "d": { "results": people(0..5) } });
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .page_size(10)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    let records = cache.read_range(0, 10).await.unwrap();
    assert_eq!(records, people(0..5));
}

#[tokio::test]
async fn count_reads_the_bare_integer_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people/$count"))
        .respond_with(ResponseTemplate::new(200).set_body_string("437"))
        .expect(1)
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    assert_eq!(cache.count().await.unwrap(), 437);
}

#[tokio::test]
async fn credentials_are_sent_as_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(basic_auth("reader", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(value_payload(&people(0..3))))
        .expect(1)
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .credentials("reader", "s3cret")
        .page_size(10)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    let records = cache.read_range(0, 10).await.unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn http_failure_maps_to_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .page_size(10)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    let err = cache.read_range(0, 10).await.unwrap_err();
    match err {
        CacheError::Transport { status, url, .. } => {
            assert_eq!(status, Some(503));
            assert!(url.unwrap().contains("/people"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unrecognized_payload_maps_to_a_payload_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&server)
        .await;

    let cache: DataCache<Person> = DataCache::builder("people")
        .uri(format!("{}/people", server.uri()))
        .page_size(10)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    assert!(matches!(
        cache.read_range(0, 10).await.unwrap_err(),
        CacheError::Payload(_)
    ));
}

#[tokio::test]
async fn equivalent_uri_spellings_share_one_cache_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(value_payload(&people(0..10))))
        .expect(1)
        .mount(&server)
        .await;

    let factory = Arc::new(MemoryStoreFactory::new());
    // Same resource, spelled three different ways.
    let spellings = [
        format!("{}/people", server.uri()),
        format!("  {}/people  ", server.uri()),
        format!("{}/people", server.uri()).replace("http://", "HTTP://"),
    ];

    for uri in spellings {
        let cache: DataCache<Person> = DataCache::builder("people")
            .uri(uri)
            .page_size(10)
            .store_factory(Arc::clone(&factory) as Arc<dyn StoreFactory>)
            .prefetch(Prefetch::Disabled)
            .build()
            .unwrap();
        let records = cache.read_range(0, 10).await.unwrap();
        assert_eq!(records, people(0..10));
    }
    // The mock's expect(1) verifies only the first spelling hit the wire.
}
