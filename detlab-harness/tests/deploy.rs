// Deploy path: create-or-replace scheduled saved searches.
use std::sync::Arc;

use detlab_harness::Deployer;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod helpers;
use helpers::{load_detection, mock_session, write_detection, StaticConverter};

#[tokio::test]
async fn deploying_twice_replaces_the_saved_search() {
    let server = MockServer::start().await;
    let session = mock_session(&server).await;

    // First lookup misses, the second (after deploy #1) hits.
    Mock::given(method("GET"))
        .and(path("/services/saved/searches/r1"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/saved/searches/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entry": [] })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/services/saved/searches/r1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/saved/searches"))
        .and(body_string_contains("name=r1"))
        .and(body_string_contains("cron_schedule=%2A%2F5+%2A+%2A+%2A+%2A"))
        .and(body_string_contains("is_scheduled=1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_detection(dir.path(), "r1.yaml", "title: R1\n", None);
    let detection = load_detection(dir.path(), "r1.yaml");

    let deployer = Deployer::new(
        session,
        Arc::new(StaticConverter("EventID=4688".to_string())),
        "lab8",
    );

    deployer.deploy(&detection).await.expect("first deploy");
    deployer.deploy(&detection).await.expect("second deploy");
}

#[tokio::test]
async fn deploy_scopes_the_query_to_the_lab_index() {
    let server = MockServer::start().await;
    let session = mock_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/saved/searches/scoped"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // Converted query gains the directive plus the index/host filter.
    Mock::given(method("POST"))
        .and(path("/services/saved/searches"))
        .and(body_string_contains(
            "search=search+index%3Dwin+host%3Dlab8+EventID%3D4688",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_detection(dir.path(), "scoped.yaml", "title: Scoped\n", None);
    let detection = load_detection(dir.path(), "scoped.yaml");

    Deployer::new(
        session,
        Arc::new(StaticConverter("EventID=4688".to_string())),
        "lab8",
    )
    .deploy(&detection)
    .await
    .expect("deploy succeeds");
}

#[tokio::test]
async fn deploy_batch_counts_failures_without_aborting() {
    let server = MockServer::start().await;
    let session = mock_session(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/saved/searches/x_fails"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/saved/searches/y_works"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/saved/searches"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_detection(dir.path(), "x_fails.yaml", "title: X\n", None);
    write_detection(dir.path(), "y_works.yaml", "title: Y\n", None);
    let detections = detlab_rules::load_directory(dir.path()).expect("folder loads");

    let summary = Deployer::new(
        session,
        Arc::new(StaticConverter("EventID=1".to_string())),
        "lab1",
    )
    .deploy_batch(&detections)
    .await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
}
