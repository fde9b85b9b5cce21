use httpmock::prelude::*;
use rcplay_catalog::StepCatalog;
use rcplay_playback::{
    FailureKind, HttpRemoteDriver, HttpRemoteDriverConfig, PlaybackSettings, RemoteDriver, Script,
    ScriptPlayback, Step, StepOutcome, TransportError,
};
use std::sync::Arc;

fn host_port(server: &MockServer) -> String {
    server.base_url().trim_start_matches("http://").to_string()
}

fn driver_for(server: &MockServer) -> HttpRemoteDriver {
    HttpRemoteDriver::new(HttpRemoteDriverConfig {
        host_port: host_port(server),
        request_timeout_ms: 5_000,
        result_url_base: None,
    })
    .expect("driver should be created")
}

fn login_script(catalog: &StepCatalog) -> Script {
    Script::new(
        "login",
        vec![
            Step::new("s1", catalog.open().expect("open").clone())
                .with_text("url", "http://example.test/"),
            Step::new("s2", catalog.get("verifyTextPresent").expect("verify").clone())
                .with_text("target", "Welcome"),
        ],
    )
}

#[tokio::test]
async fn integration_http_driver_posts_form_body_to_driver_path() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/selenium-server/driver/")
            .header(
                "content-type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body("cmd=testComplete&sessionId=abc");
        then.status(200).body("OK");
    });

    let driver = driver_for(&server);
    let response = driver
        .post("cmd=testComplete&sessionId=abc")
        .await
        .expect("post should succeed");

    mock.assert();
    assert_eq!(response, "OK");
}

#[tokio::test]
async fn integration_http_driver_maps_non_success_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/selenium-server/driver/");
        then.status(503).body("overloaded");
    });

    let error = driver_for(&server)
        .post("cmd=getNewBrowserSession")
        .await
        .expect_err("503 should fail");

    mock.assert();
    match error {
        TransportError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn integration_script_plays_end_to_end_over_http() {
    let server = MockServer::start();
    let session = server.mock(|when, then| {
        when.method(POST)
            .path("/selenium-server/driver/")
            .body_includes("cmd=getNewBrowserSession")
            .body_includes("1=%2Agooglechrome");
        then.status(200).body("OK,sess-42");
    });
    let open = server.mock(|when, then| {
        when.method(POST)
            .path("/selenium-server/driver/")
            .body("cmd=open&1=http%3A%2F%2Fexample.test%2F&sessionId=sess-42");
        then.status(200).body("OK");
    });
    let verify = server.mock(|when, then| {
        when.method(POST)
            .path("/selenium-server/driver/")
            .body_includes("cmd=verifyTextPresent&1=Welcome");
        then.status(200).body("false");
    });
    let teardown = server.mock(|when, then| {
        when.method(POST)
            .path("/selenium-server/driver/")
            .body("cmd=testComplete&sessionId=sess-42");
        then.status(200).body("OK");
    });

    let catalog = StepCatalog::selenium1();
    let playback = ScriptPlayback::new(
        Arc::new(driver_for(&server)),
        PlaybackSettings {
            browser: "*googlechrome".to_string(),
            ..PlaybackSettings::default()
        },
    )
    .expect("playback should be created");
    let mut script = login_script(&catalog);

    let result = playback.run(&mut script).await;

    session.assert();
    open.assert();
    verify.assert();
    teardown.assert();
    assert!(!result.success);
    assert_eq!(result.failure_kind, Some(FailureKind::AssertionFailure));
    assert_eq!(
        script.outcomes(),
        vec![StepOutcome::Success, StepOutcome::Failure]
    );
}

#[tokio::test]
async fn integration_unreachable_server_reports_connection_error_on_first_step() {
    let server = MockServer::start();
    let address = host_port(&server);
    drop(server);

    let driver = HttpRemoteDriver::new(HttpRemoteDriverConfig {
        host_port: address,
        request_timeout_ms: 2_000,
        result_url_base: None,
    })
    .expect("driver should be created");
    let playback = ScriptPlayback::new(Arc::new(driver), PlaybackSettings::default())
        .expect("playback should be created");
    let catalog = StepCatalog::selenium1();
    let mut script = login_script(&catalog);

    let result = playback.run(&mut script).await;

    assert_eq!(result.failure_kind, Some(FailureKind::TransportFailure));
    assert!(result
        .error_message
        .as_deref()
        .is_some_and(|message| message.starts_with("Server connection error: ")));
    assert_eq!(script.steps[0].outcome, StepOutcome::Error);
    assert_eq!(script.steps[1].outcome, StepOutcome::Pending);
}
