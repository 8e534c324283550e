mod common;

use common::WORKFLOW_ID;
use common::runs_client;
use common::runs_path;
use common::store;
use common::target;
use gham_capture::CaptureError;
use gham_capture::RunMode;
use gham_capture::capture_runs;
use gham_store::EntityKind;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;
use wiremock::matchers::query_param_is_missing;

fn page(runs: &str) -> String {
    format!(r#"{{"total_count":3,"workflow_runs":[{runs}]}}"#)
}

async fn mount_two_pages(server: &MockServer) {
    let next = format!("{}/page-2", server.uri());
    Mock::given(method("GET"))
        .and(path(runs_path()))
        .and(query_param("event", "pull_request"))
        .and(query_param("status", "completed"))
        .and(query_param("per_page", "100"))
        .and(query_param_is_missing("created"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_string(page(&format!(
                    r#"{{"id":1,"workflow_id":{WORKFLOW_ID},"status":"completed"}},{{"id":2,"workflow_id":{WORKFLOW_ID}}}"#
                ))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&format!(
            r#"{{"id":3,"workflow_id":{WORKFLOW_ID}}}"#
        ))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn latest_mode_walks_all_pages_and_stores_payloads_verbatim() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;
    let (_dir, store) = store();

    let outcome =
        capture_runs(&runs_client(&server.uri()), &store, &target(), RunMode::Latest).await?;

    assert_eq!(outcome.captured, vec![1, 2, 3]);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(
        String::from_utf8(store.read(WORKFLOW_ID, EntityKind::Run, 1).await?)?,
        format!(r#"{{"id":1,"workflow_id":{WORKFLOW_ID},"status":"completed"}}"#)
    );
    Ok(())
}

#[tokio::test]
async fn second_invocation_writes_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;
    let (_dir, store) = store();
    let client = runs_client(&server.uri());

    capture_runs(&client, &store, &target(), RunMode::Latest).await?;
    let again = capture_runs(&client, &store, &target(), RunMode::Latest).await?;

    assert_eq!(again.captured, Vec::<u64>::new());
    assert_eq!(again.skipped, 3);
    Ok(())
}

#[tokio::test]
async fn existing_run_is_never_rewritten() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(runs_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&format!(
            r#"{{"id":1,"workflow_id":{WORKFLOW_ID},"conclusion":"failure"}}"#
        ))))
        .mount(&server)
        .await;
    let (_dir, store) = store();
    store
        .write(
            WORKFLOW_ID,
            EntityKind::Run,
            1,
            bytes::Bytes::from_static(br#"{"id":1,"conclusion":"success"}"#),
        )
        .await?;

    let outcome =
        capture_runs(&runs_client(&server.uri()), &store, &target(), RunMode::Latest).await?;

    assert_eq!(outcome.captured, Vec::<u64>::new());
    assert_eq!(
        store.read(WORKFLOW_ID, EntityKind::Run, 1).await?,
        br#"{"id":1,"conclusion":"success"}"#
    );
    Ok(())
}

#[tokio::test]
async fn created_mode_issues_a_single_filtered_request() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let next = format!("{}/page-2", server.uri());
    Mock::given(method("GET"))
        .and(path(runs_path()))
        .and(query_param("created", ">=2021-10-12"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_string(page(&format!(r#"{{"id":9,"workflow_id":{WORKFLOW_ID}}}"#))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("")))
        .expect(0)
        .mount(&server)
        .await;
    let (_dir, store) = store();

    let mode = RunMode::CreatedOn("2021-10-12".parse()?);
    let outcome = capture_runs(&runs_client(&server.uri()), &store, &target(), mode).await?;

    assert_eq!(outcome.captured, vec![9]);
    Ok(())
}

#[tokio::test]
async fn upstream_failure_aborts_but_keeps_earlier_pages() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let next = format!("{}/page-2", server.uri());
    Mock::given(method("GET"))
        .and(path(runs_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_string(page(&format!(r#"{{"id":1,"workflow_id":{WORKFLOW_ID}}}"#))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (_dir, store) = store();

    let err = capture_runs(&runs_client(&server.uri()), &store, &target(), RunMode::Latest)
        .await
        .expect_err("second page fails");

    match err {
        CaptureError::Upstream { captured, .. } => assert_eq!(captured, vec![1]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.exists(WORKFLOW_ID, EntityKind::Run, 1).await?);
    Ok(())
}

#[tokio::test]
async fn runs_of_other_workflows_are_skipped() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(runs_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&format!(
            r#"{{"id":1,"workflow_id":{WORKFLOW_ID}}},{{"id":2,"workflow_id":1}}"#
        ))))
        .mount(&server)
        .await;
    let (_dir, store) = store();

    let outcome =
        capture_runs(&runs_client(&server.uri()), &store, &target(), RunMode::Latest).await?;

    assert_eq!(outcome.captured, vec![1]);
    assert_eq!(outcome.skipped, 1);
    assert!(!store.exists(WORKFLOW_ID, EntityKind::Run, 2).await?);
    Ok(())
}
