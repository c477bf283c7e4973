use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use govhub_api::{
    aggregation::{self, ActiveProposals},
    error::ApiError,
    routes::{AppState, router},
    store::PostStore,
    subsquid::SubsquidClient,
    summary::SummaryService,
};
use govhub_db::models::post;
use mockito::{Mock, Server, ServerGuard};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tower::ServiceExt;

struct StubPostStore {
    docs: Vec<post::Model>,
    calls: AtomicUsize,
}

impl StubPostStore {
    fn new(docs: Vec<post::Model>) -> Self {
        Self {
            docs,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostStore for StubPostStore {
    async fn posts_by_ids(&self, _collection: &str, ids: &[String]) -> Result<Vec<post::Model>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .docs
            .iter()
            .filter(|doc| ids.contains(&doc.id))
            .cloned()
            .collect())
    }
}

struct NoopSummary;

#[async_trait]
impl SummaryService for NoopSummary {
    async fn generate(&self, _: &post::Model, _: &str, _: bool) -> Result<()> {
        Ok(())
    }
}

struct FailingSummary {
    calls: AtomicUsize,
}

#[async_trait]
impl SummaryService for FailingSummary {
    async fn generate(&self, _: &post::Model, _: &str, _: bool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("summary backend unavailable")
    }
}

fn subsquid_for(url: String) -> SubsquidClient {
    let mut endpoints = HashMap::new();
    endpoints.insert("polkadot".to_string(), url);
    SubsquidClient::new(endpoints)
}

fn post_doc(id: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        proposal_type: "referendums_v2".to_string(),
        title: Some("Fund the tooling initiative".to_string()),
        summary: Some("A short summary".to_string()),
        content: Some("Full proposal text".to_string()),
        tags: Some(json!(["treasury", "tooling"])),
        topic: None,
        topic_id: Some(8),
        track_number: Some(30),
        last_edited_at: None,
        updated_at: None,
    }
}

async fn mock_proposals(server: &mut ServerGuard, proposals: Value) -> Mock {
    server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "proposals": proposals } }).to_string())
        .create_async()
        .await
}

fn sample_proposal() -> Value {
    json!({
        "index": 42,
        "type": "ReferendumV2",
        "status": "DecisionDepositPlaced",
        "createdAt": "2024-05-01T12:00:00.000Z",
        "proposer": "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY",
        "trackNumber": 30,
        "statusHistory": [
            { "status": "DecisionDepositPlaced", "block": 100 },
            { "status": "Submitted", "block": 90 },
            { "status": "Deciding", "block": 200 }
        ],
        "preimage": {
            "proposedCall": {
                "method": "batch",
                "section": "utility",
                "args": {
                    "calls": [
                        { "amount": "100", "beneficiary": "A" },
                        { "amount": "250", "beneficiary": "B" }
                    ]
                }
            }
        }
    })
}

#[tokio::test]
async fn invalid_network_fails_before_any_fetch() {
    let store = StubPostStore::new(vec![]);
    let subsquid = subsquid_for("http://localhost:1".to_string());

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "not-a-chain",
        "referendums_v2",
        None,
        false,
    )
    .await;

    assert!(matches!(result, Err(ApiError::InvalidNetwork)));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn invalid_proposal_type_is_rejected() {
    let store = StubPostStore::new(vec![]);
    let subsquid = subsquid_for("http://localhost:1".to_string());

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums",
        None,
        false,
    )
    .await;

    assert!(matches!(result, Err(ApiError::InvalidParams)));
}

#[tokio::test]
async fn non_numeric_track_number_is_rejected() {
    let store = StubPostStore::new(vec![]);
    let subsquid = subsquid_for("http://localhost:1".to_string());
    let track = json!("thirty");

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums_v2",
        Some(&track),
        false,
    )
    .await;

    assert!(matches!(result, Err(ApiError::InvalidParams)));
}

#[tokio::test]
async fn string_encoded_track_number_is_tolerated() {
    let mut server = Server::new_async().await;
    let mock = mock_proposals(&mut server, json!([])).await;
    let store = StubPostStore::new(vec![]);
    let subsquid = subsquid_for(server.url());
    let track = json!("30");

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums_v2",
        Some(&track),
        false,
    )
    .await
    .unwrap();

    assert!(result.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_indexer_result_short_circuits_the_store() {
    let mut server = Server::new_async().await;
    let mock = mock_proposals(&mut server, json!([])).await;
    let store = StubPostStore::new(vec![post_doc("42")]);
    let subsquid = subsquid_for(server.url());

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums_v2",
        None,
        false,
    )
    .await
    .unwrap();

    assert!(matches!(result, ActiveProposals::Aggregated(ref items) if items.is_empty()));
    assert_eq!(store.call_count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_documents_degrade_to_raw_indexer_data() {
    let mut server = Server::new_async().await;
    let mock = mock_proposals(&mut server, json!([sample_proposal()])).await;
    let store = StubPostStore::new(vec![]);
    let subsquid = subsquid_for(server.url());

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums_v2",
        None,
        false,
    )
    .await
    .unwrap();

    assert_eq!(store.call_count(), 1);

    let ActiveProposals::Raw(rows) = result else {
        panic!("expected the raw indexer records");
    };
    assert_eq!(rows.len(), 1);

    // The raw record round-trips with its untouched fields intact.
    let row = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(row["index"], json!(42));
    assert_eq!(row["status"], json!("DecisionDepositPlaced"));
    assert_eq!(row["proposer"], sample_proposal()["proposer"]);
    assert_eq!(row["preimage"]["proposedCall"]["method"], json!("batch"));
    mock.assert_async().await;
}

#[tokio::test]
async fn documents_and_indexer_rows_merge_into_payloads() {
    let mut server = Server::new_async().await;
    let mock = mock_proposals(&mut server, json!([sample_proposal()])).await;
    let store = StubPostStore::new(vec![post_doc("42")]);
    let subsquid = subsquid_for(server.url());
    let track = json!(30);

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &NoopSummary,
        "polkadot",
        "referendums_v2",
        Some(&track),
        false,
    )
    .await
    .unwrap();

    assert_eq!(store.call_count(), 1);

    let ActiveProposals::Aggregated(payloads) = result else {
        panic!("expected aggregated payloads");
    };
    assert_eq!(payloads.len(), 1);

    let payload = &payloads[0];
    assert_eq!(payload.index, Some(json!(42)));
    assert_eq!(payload.requested, "350");
    assert_eq!(payload.beneficiaries.len(), 2);
    assert_eq!(payload.beneficiaries[0].address, "A");
    assert_eq!(payload.beneficiaries[1].amount, "250");
    assert_eq!(payload.asset_id, None);

    // Post metadata wins for the display fields.
    assert_eq!(payload.title.as_deref(), Some("Fund the tooling initiative"));
    assert_eq!(payload.tags, Some(json!(["treasury", "tooling"])));
    assert_eq!(payload.topic.as_ref().map(|t| t.id), Some(8));
    assert_eq!(payload.track_number, Some(30));

    // The deposit event moved next to "Deciding" and the reported status
    // follows the swap.
    assert_eq!(payload.status.as_deref(), Some("Deciding"));
    let statuses: Vec<&str> = payload
        .status_history
        .iter()
        .map(|e| e.status.as_str())
        .collect();
    assert_eq!(
        statuses,
        vec!["Submitted", "Deciding", "DecisionDepositPlaced"]
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn summary_failures_do_not_fail_the_batch() {
    let mut server = Server::new_async().await;
    let _mock = mock_proposals(&mut server, json!([sample_proposal()])).await;
    let store = StubPostStore::new(vec![post_doc("42")]);
    let subsquid = subsquid_for(server.url());
    let summaries = FailingSummary {
        calls: AtomicUsize::new(0),
    };

    let result = aggregation::get_active_proposals_for_track(
        &subsquid,
        &store,
        &summaries,
        "polkadot",
        "referendums_v2",
        None,
        false,
    )
    .await
    .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(summaries.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn http_boundary_rejects_an_unknown_network() {
    let state = AppState {
        subsquid: Arc::new(subsquid_for("http://localhost:1".to_string())),
        posts: Arc::new(StubPostStore::new(vec![])),
        summaries: Arc::new(NoopSummary),
    };
    let app = router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/posts/active-proposals")
        .header("x-network", "not-a-chain")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "proposalType": "referendums_v2" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], json!("Invalid network in request header"));
}

#[tokio::test]
async fn http_boundary_returns_an_array_on_success() {
    let mut server = Server::new_async().await;
    let _mock = mock_proposals(&mut server, json!([sample_proposal()])).await;

    let state = AppState {
        subsquid: Arc::new(subsquid_for(server.url())),
        posts: Arc::new(StubPostStore::new(vec![post_doc("42")])),
        summaries: Arc::new(NoopSummary),
    };
    let app = router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/posts/active-proposals")
        .header("x-network", "polkadot")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "proposalType": "referendums_v2", "trackNumber": 30 }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    let items = body.as_array().expect("response must be a JSON array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["requested"], json!("350"));
    assert_eq!(items[0]["title"], json!("Fund the tooling initiative"));
    assert_eq!(items[0]["statusHistory"][2]["status"], json!("DecisionDepositPlaced"));
}
