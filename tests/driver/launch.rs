use std::time::Duration;

use crate::support::helpers::{
    init_tracing, launch_request as request, task, RecordingRenderer, ScriptedApi,
};
use anyhow::anyhow;
use runtask::driver::Driver;

const POLL: Duration = Duration::from_millis(500);

#[tokio::test]
async fn tasks_print_once_in_reply_order() {
    init_tracing();
    let api = ScriptedApi::default();
    api.push_run(Ok(vec![
        task("arn:task/1", "PENDING", "RUNNING"),
        task("arn:task/2", "PENDING", "RUNNING"),
    ]));
    api.push_run(Ok(vec![task("arn:task/3", "PENDING", "RUNNING")]));

    let mut driver = Driver::new(api, RecordingRenderer::default(), POLL);
    let board = driver
        .launch(&[request("app:1"), request("app:2")])
        .await
        .unwrap();

    assert_eq!(board.len(), 3);
    assert_eq!(driver.api().run_calls(), 2);
    assert_eq!(
        driver.renderer().pushed,
        vec![
            "arn:task/1: PENDING => RUNNING".to_owned(),
            "arn:task/2: PENDING => RUNNING".to_owned(),
            "arn:task/3: PENDING => RUNNING".to_owned(),
        ]
    );
}

#[tokio::test]
async fn failed_launch_is_skipped_and_the_rest_still_go_out() {
    init_tracing();
    let api = ScriptedApi::default();
    api.push_run(Ok(vec![task("arn:task/1", "PENDING", "RUNNING")]));
    api.push_run(Err(anyhow!("placement refused")));
    api.push_run(Ok(vec![task("arn:task/3", "PENDING", "RUNNING")]));

    let mut driver = Driver::new(api, RecordingRenderer::default(), POLL);
    let board = driver
        .launch(&[request("app:1"), request("app:2"), request("app:3")])
        .await
        .unwrap();

    assert_eq!(driver.api().run_calls(), 3, "every request must be attempted");
    assert_eq!(board.len(), 2);
    assert!(board.get("arn:task/1").is_some());
    assert!(board.get("arn:task/3").is_some());
    assert_eq!(driver.renderer().pushed.len(), 2);

    let telemetry = driver.telemetry().snapshot();
    assert_eq!(telemetry.tasks_launched, 2);
    assert_eq!(telemetry.launch_failures, 1);
}

#[tokio::test]
async fn tasks_stopped_at_launch_are_printed_but_not_tracked() {
    init_tracing();
    let api = ScriptedApi::default();
    api.push_run(Ok(vec![
        task("arn:task/1", "STOPPED", "STOPPED"),
        task("arn:task/2", "RUNNING", "RUNNING"),
    ]));

    let mut driver = Driver::new(api, RecordingRenderer::default(), POLL);
    let board = driver.launch(&[request("app:1")]).await.unwrap();

    assert_eq!(driver.renderer().pushed.len(), 2);
    assert_eq!(board.tracked(), vec!["arn:task/2".to_owned()]);
}

#[tokio::test]
async fn without_join_no_describe_is_ever_sent() {
    init_tracing();
    let api = ScriptedApi::default();
    api.push_run(Ok(vec![task("arn:task/1", "PENDING", "RUNNING")]));

    let mut driver = Driver::new(api, RecordingRenderer::default(), POLL);
    let board = driver
        .run("default", &[request("app:1")], false)
        .await
        .unwrap();

    assert_eq!(board.len(), 1);
    assert_eq!(driver.api().describe_calls(), 0);
    assert!(driver.renderer().frames.is_empty());
}

#[tokio::test]
async fn requests_reach_the_service_unchanged_and_in_order() {
    init_tracing();
    let api = ScriptedApi::default();

    let mut driver = Driver::new(api, RecordingRenderer::default(), POLL);
    let requests = [request("app:1"), request("app:2")];
    driver.launch(&requests).await.unwrap();

    assert_eq!(driver.api().seen_requests(), requests.to_vec());
}
