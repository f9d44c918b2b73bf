//! End-to-end cache-aside behaviour against a mocked scoring endpoint.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use irt_cache::{
    CacheAsideGateway, CacheEntry, CacheStatus, ErrorKind, HttpScoringClient,
    InMemorySubjectSource, MemoryStore, PayloadBuilder, ScoringError, ScoringResponse,
    SubjectRecord, TestId, cache_key,
};

const SCORE_PATH: &str = "/irt";

type Gateway = CacheAsideGateway<MemoryStore, HttpScoringClient, InMemorySubjectSource>;

fn id(raw: &str) -> TestId {
    TestId::parse(raw).unwrap()
}

fn t1_body() -> serde_json::Value {
    json!({
        "abilities": {"s1": 0.5},
        "difficult": {},
        "err": 0.1,
        "rejected_tasks": [],
        "rejected_subjects": []
    })
}

fn t1_response() -> ScoringResponse {
    ScoringResponse {
        abilities: BTreeMap::from([("s1".to_string(), 0.5)]),
        fit_error: 0.1,
        ..Default::default()
    }
}

fn gateway_for(server: &MockServer) -> Gateway {
    let source = InMemorySubjectSource::new();
    source.insert(id("t1"), [("s1", SubjectRecord::new(1, 0, 0))]);
    source.insert(id("t2"), [("s1", SubjectRecord::new(1, 0, 0))]);

    let client = HttpScoringClient::new(
        format!("{}{}", server.uri(), SCORE_PATH),
        Duration::from_secs(5),
    )
    .unwrap();

    CacheAsideGateway::new(MemoryStore::new(), client, PayloadBuilder::new(source))
}

async fn mount_t1(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(SCORE_PATH))
        .and(body_json(json!({
            "subjects": {"s1": {"task1": 1, "task2": 0, "task3": 0}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(t1_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_t1_scored_once_then_served_from_cache() {
    let server = MockServer::start().await;
    mount_t1(&server, 1).await;
    let gateway = gateway_for(&server);

    let first = gateway.resolve(&id("t1")).await.unwrap();
    assert_eq!(first.status, CacheStatus::Miss);
    assert_eq!(first.response, t1_response());

    let stored = gateway.store().raw(cache_key(&id("t1")).as_str()).unwrap();
    assert_eq!(CacheEntry::from_bytes(stored).decode().unwrap(), t1_response());

    let second = gateway.resolve(&id("t1")).await.unwrap();
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(second.response, first.response);
}

#[tokio::test]
async fn test_warm_entry_never_reaches_service() {
    let server = MockServer::start().await;
    mount_t1(&server, 0).await;
    let gateway = gateway_for(&server);

    let entry = CacheEntry::encode(&t1_response()).unwrap();
    gateway
        .store()
        .insert_raw(cache_key(&id("t1")).as_str(), entry.into_bytes());

    let resolution = gateway.resolve(&id("t1")).await.unwrap();

    assert_eq!(resolution.status, CacheStatus::Hit);
    assert_eq!(resolution.response, t1_response());
}

#[tokio::test]
async fn test_server_error_is_remote_rejected_and_nothing_stored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SCORE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let err = gateway.resolve(&id("t1")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteRejected);
    assert!(matches!(
        err,
        irt_cache::GatewayError::Scoring(ScoringError::RemoteRejected { status: 500, .. })
    ));
    assert!(gateway.store().is_empty());
}

#[tokio::test]
async fn test_corrupt_entry_is_recomputed_and_overwritten() {
    let server = MockServer::start().await;
    mount_t1(&server, 1).await;
    let gateway = gateway_for(&server);
    let key = cache_key(&id("t2"));
    gateway.store().insert_raw(key.as_str(), b"{\"abilities\": tru".to_vec());

    let resolution = gateway.resolve(&id("t2")).await.unwrap();

    assert_eq!(resolution.status, CacheStatus::Miss);
    assert_eq!(resolution.response, t1_response());
    let stored = gateway.store().raw(key.as_str()).unwrap();
    assert_eq!(CacheEntry::from_bytes(stored).decode().unwrap(), t1_response());
}

#[tokio::test]
async fn test_conflicting_reply_is_protocol_error_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SCORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "abilities": {"s1": 0.5},
            "difficult": {},
            "err": 0.1,
            "rejected_tasks": [],
            "rejected_subjects": ["s1"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let err = gateway.resolve(&id("t1")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProtocolError);
    assert!(gateway.store().is_empty());
}

#[tokio::test]
async fn test_store_read_outage_still_resolves() {
    let server = MockServer::start().await;
    mount_t1(&server, 1).await;
    let gateway = gateway_for(&server);
    gateway.store().set_fail_reads(true);

    let resolution = gateway.resolve(&id("t1")).await.unwrap();

    assert_eq!(resolution.response, t1_response());
    assert_eq!(resolution.status, CacheStatus::Miss);
}

#[tokio::test]
async fn test_store_write_outage_returns_uncached_response() {
    let server = MockServer::start().await;
    mount_t1(&server, 2).await;
    let gateway = gateway_for(&server);
    gateway.store().set_fail_writes(true);

    let first = gateway.resolve(&id("t1")).await.unwrap();
    assert_eq!(first.status, CacheStatus::MissNotStored);
    assert!(first.is_degraded());

    let second = gateway.resolve(&id("t1")).await.unwrap();
    assert_eq!(second.status, CacheStatus::MissNotStored);
    assert_eq!(second.response, first.response);
}

#[tokio::test]
async fn test_unknown_test_never_calls_service() {
    let server = MockServer::start().await;
    mount_t1(&server, 0).await;
    let gateway = gateway_for(&server);

    let err = gateway.resolve(&id("t404")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    assert_eq!(gateway.store().get_count(), 1);
}

#[tokio::test]
async fn test_slow_service_exceeds_deadline_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SCORE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(t1_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let err = gateway
        .resolve_with_deadline(&id("t1"), Duration::from_millis(100))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(gateway.store().is_empty());
}

#[tokio::test]
async fn test_seventeen_digit_ability_served_identically_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SCORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"abilities": {"s1": -3.87092258393119248}, "difficult": {"task1": 1.23456789012345678},
                "err": 0.1, "rejected_tasks": [], "rejected_subjects": []}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let miss = gateway.resolve(&id("t1")).await.unwrap();
    let hit = gateway.resolve(&id("t1")).await.unwrap();

    assert_eq!(miss.status, CacheStatus::Miss);
    assert_eq!(hit.status, CacheStatus::Hit);
    let expected = "-3.87092258393119248".parse::<f64>().unwrap();
    assert_eq!(miss.response.abilities["s1"].to_bits(), expected.to_bits());
    assert_eq!(
        hit.response.abilities["s1"].to_bits(),
        miss.response.abilities["s1"].to_bits()
    );
    assert_eq!(
        hit.response.difficulties["task1"].to_bits(),
        miss.response.difficulties["task1"].to_bits()
    );
}
