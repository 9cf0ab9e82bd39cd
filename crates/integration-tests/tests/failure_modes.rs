//! Failure handling across the HTTP boundary
//!
//! Rejected submissions, failed uploads, broken status checks and timeouts.

mod common;

use common::{fast_config, TestEnv};

use changeset_core::application::{cancel_channel, PollConfig, PollExit};
use changeset_core::domain::{ChangeSetRequest, ChangeSetStatus};
use changeset_core::port::ServiceErrorKind;
use changeset_core::AppError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_created_and_upload(env: &TestEnv) {
    Mock::given(method("POST"))
        .and(path("/pset/v1/changesets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.created_body()))
        .mount(&env.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env.upload_path()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&env.server)
        .await;
}

fn status_path(env: &TestEnv) -> String {
    format!("/pset/v1/changesets/{}", env.change_set_id)
}

#[tokio::test]
async fn test_unauthorized_submission() {
    let env = TestEnv::start().await;

    Mock::given(method("POST"))
        .and(path("/org/v1/forests/forest-1/trees/tree-1/changesets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "errorcode": "INVALID_TOKEN",
            "message": "token expired"
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let err = env
        .workflow(env.organizer(), fast_config())
        .run(&ChangeSetRequest::organizer("forest-1", "tree-1"), &[], None)
        .await
        .unwrap_err();

    match err {
        AppError::Submission(e) => assert_eq!(e.kind, ServiceErrorKind::Unauthorized),
        other => panic!("Expected Submission, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_failure_skips_polling() {
    let env = TestEnv::start().await;

    Mock::given(method("POST"))
        .and(path("/pset/v1/changesets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.created_body()))
        .mount(&env.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(env.upload_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.status_body("Done")))
        .expect(0)
        .mount(&env.server)
        .await;

    let err = env
        .workflow(env.pset(), fast_config())
        .run(&ChangeSetRequest::PropertySet, &[], None)
        .await
        .unwrap_err();

    match err {
        AppError::Upload(e) => {
            assert!(matches!(e.kind, ServiceErrorKind::Unknown { status: 500, .. }))
        }
        other => panic!("Expected Upload, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_status_failure_is_fatal_by_default() {
    let env = TestEnv::start().await;
    mount_created_and_upload(&env).await;

    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&env.server)
        .await;

    let err = env
        .workflow(env.pset(), fast_config())
        .run(&ChangeSetRequest::PropertySet, &[], None)
        .await
        .unwrap_err();

    match err {
        AppError::StatusCheck(e) => {
            assert!(matches!(e.kind, ServiceErrorKind::Unknown { status: 503, .. }))
        }
        other => panic!("Expected StatusCheck, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_transient_status_failure_tolerated() {
    let env = TestEnv::start().await;
    mount_created_and_upload(&env).await;

    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.status_body("Failed")))
        .expect(1)
        .mount(&env.server)
        .await;

    let config = PollConfig {
        max_status_errors: 1,
        ..fast_config()
    };
    let summary = env
        .workflow(env.pset(), config)
        .run(&ChangeSetRequest::PropertySet, &[], None)
        .await
        .unwrap();

    assert_eq!(summary.report.status_checks, 2);
    assert_eq!(summary.report.handle.status, ChangeSetStatus::Failed);
}

#[tokio::test]
async fn test_timeout_keeps_last_status() {
    let env = TestEnv::start().await;
    mount_created_and_upload(&env).await;

    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.status_body("Processing")))
        .mount(&env.server)
        .await;

    let config = PollConfig {
        timeout_ms: 100,
        ..fast_config()
    };
    let summary = env
        .workflow(env.pset(), config)
        .run(&ChangeSetRequest::PropertySet, &[], None)
        .await
        .unwrap();

    assert_eq!(summary.report.exit, PollExit::TimedOut);
    assert!(summary.report.timed_out());
    assert_eq!(summary.report.handle.status, ChangeSetStatus::Processing);
    assert!(summary.report.elapsed_ms > 100);
    assert!(summary.report.status_checks >= 2);
    assert!(summary.results.is_empty());
}

#[tokio::test]
async fn test_cancel_stops_polling() {
    let env = TestEnv::start().await;
    mount_created_and_upload(&env).await;

    Mock::given(method("GET"))
        .and(path(status_path(&env)))
        .respond_with(ResponseTemplate::new(200).set_body_json(env.status_body("Queued")))
        .mount(&env.server)
        .await;

    let config = PollConfig {
        initial_interval_ms: 50,
        max_interval_ms: 60_000,
        max_jitter_ms: 0,
        timeout_ms: 60_000,
        ..fast_config()
    };
    let workflow = env.workflow(env.pset(), config);
    let (sender, token) = cancel_channel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        sender.cancel();
    });

    let summary = workflow
        .run(&ChangeSetRequest::PropertySet, &[], Some(token))
        .await
        .unwrap();

    assert_eq!(summary.report.exit, PollExit::Cancelled);
    assert_eq!(summary.report.handle.status, ChangeSetStatus::Queued);
    assert!(summary.report.status_checks >= 1);
}
