//! End-to-end tests for `ApifyClient` against an in-process fake of the
//! Apify REST API (axum on an ephemeral port).
//!
//! The fake answers:
//! - `POST /acts/{actor}/runs`          → configurable status, run `run-1`
//! - `GET  /actor-runs/{id}`            → scripted status sequence (last one repeats)
//! - `GET  /datasets/{id}/items`        → configured rows

use std::sync::{Arc, Mutex};
use std::time::Duration;

use apify_client::{ApifyClient, ApifyError, FollowersScraperInput};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

const ACTOR: &str = "datadoping~instagram-followers-scraper";

#[derive(Default)]
struct FakeApify {
    submit_status: u16,
    poll_status: u16,
    statuses: Vec<&'static str>,
    rows: Value,
    polls: usize,
    submitted_actor: Option<String>,
    submitted_body: Option<Value>,
    authorization: Option<String>,
}

type Shared = Arc<Mutex<FakeApify>>;

async fn start_run(
    State(fake): State<Shared>,
    Path(actor): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut fake = fake.lock().unwrap();
    fake.submitted_actor = Some(actor);
    fake.submitted_body = Some(body);
    fake.authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let status = StatusCode::from_u16(fake.submit_status).unwrap();
    if !status.is_success() {
        return (status, "insufficient credit").into_response();
    }
    let run = json!({ "data": { "id": "run-1", "status": "READY", "defaultDatasetId": "ds-1" } });
    (status, Json(run)).into_response()
}

async fn get_run(State(fake): State<Shared>, Path(run_id): Path<String>) -> Response {
    let mut fake = fake.lock().unwrap();
    fake.polls += 1;

    let status = StatusCode::from_u16(fake.poll_status).unwrap();
    if !status.is_success() {
        return (status, "upstream hiccup").into_response();
    }
    let idx = (fake.polls - 1).min(fake.statuses.len() - 1);
    let run = json!({
        "data": { "id": run_id, "status": fake.statuses[idx], "defaultDatasetId": "ds-1" }
    });
    Json(run).into_response()
}

async fn dataset_items(State(fake): State<Shared>, Path(_dataset): Path<String>) -> Response {
    let fake = fake.lock().unwrap();
    Json(fake.rows.clone()).into_response()
}

async fn spawn_fake(fake: FakeApify) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(fake));
    let app = Router::new()
        .route("/acts/{actor}/runs", post(start_run))
        .route("/actor-runs/{id}", get(get_run))
        .route("/datasets/{id}/items", get(dataset_items))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), shared)
}

fn fake_with(statuses: Vec<&'static str>) -> FakeApify {
    FakeApify {
        submit_status: 201,
        poll_status: 200,
        statuses,
        rows: json!([
            { "username": "alice", "is_private": false },
            { "username": "bob", "is_private": true }
        ]),
        ..Default::default()
    }
}

fn client(base_url: &str) -> ApifyClient {
    ApifyClient::new("secret-token".into())
        .with_base_url(base_url)
        .with_poll_interval(Duration::from_millis(10))
}

fn followers_input() -> FollowersScraperInput {
    FollowersScraperInput {
        usernames: vec!["target_account".into()],
        max_count: 100,
    }
}

#[tokio::test]
async fn run_actor_polls_until_succeeded_then_returns_rows() {
    let (base, fake) = spawn_fake(fake_with(vec!["READY", "RUNNING", "SUCCEEDED"])).await;

    let rows = client(&base)
        .run_actor(ACTOR, &followers_input(), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["username"], "alice");

    let fake = fake.lock().unwrap();
    assert_eq!(fake.polls, 3);
    assert_eq!(fake.submitted_actor.as_deref(), Some(ACTOR));
    assert_eq!(fake.authorization.as_deref(), Some("Bearer secret-token"));
    let body = fake.submitted_body.as_ref().unwrap();
    assert_eq!(body["usernames"][0], "target_account");
    assert_eq!(body["max_count"], 100);
}

#[tokio::test]
async fn rejected_submission_surfaces_api_error_without_polling() {
    let mut fake = fake_with(vec!["SUCCEEDED"]);
    fake.submit_status = 402;
    let (base, fake) = spawn_fake(fake).await;

    let err = client(&base)
        .run_actor(ACTOR, &followers_input(), Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        ApifyError::Api { status, message } => {
            assert_eq!(status, 402);
            assert_eq!(message, "insufficient credit");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(fake.lock().unwrap().polls, 0);
}

#[tokio::test]
async fn failed_run_stops_polling() {
    let (base, fake) = spawn_fake(fake_with(vec!["RUNNING", "FAILED"])).await;

    let err = client(&base)
        .run_actor(ACTOR, &followers_input(), Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        ApifyError::RunFailed { run_id, status } => {
            assert_eq!(run_id, "run-1");
            assert_eq!(status, "FAILED");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
    assert_eq!(fake.lock().unwrap().polls, 2);
}

#[tokio::test]
async fn aborted_and_timed_out_runs_are_failures() {
    for terminal in ["ABORTED", "TIMED-OUT"] {
        let (base, _fake) = spawn_fake(fake_with(vec![terminal])).await;
        let err = client(&base)
            .run_actor(ACTOR, &followers_input(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApifyError::RunFailed { ref status, .. } if status == terminal),
            "{terminal}: got {err:?}"
        );
    }
}

#[tokio::test]
async fn never_finishing_run_exhausts_the_timeout() {
    let (base, fake) = spawn_fake(fake_with(vec!["RUNNING"])).await;

    let err = client(&base)
        .run_actor(ACTOR, &followers_input(), Duration::from_millis(80))
        .await
        .unwrap_err();

    assert!(matches!(err, ApifyError::Timeout { ref run_id, .. } if run_id == "run-1"));
    assert!(fake.lock().unwrap().polls >= 1);
}

#[tokio::test]
async fn failed_poll_request_is_not_retried() {
    let mut fake = fake_with(vec!["SUCCEEDED"]);
    fake.poll_status = 500;
    let (base, fake) = spawn_fake(fake).await;

    let err = client(&base)
        .run_actor(ACTOR, &followers_input(), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ApifyError::Api { status: 500, .. }));
    assert_eq!(fake.lock().unwrap().polls, 1);
}
