//! End-to-end dashboard flows against a mock gateway.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use clawdeck_engine::{ConfirmModeAccess, SearchModeAccess, SourceFilter, Tab};

use crate::common::{
    Fixture, assistant, boot, file_assistant, file_user, mount_health, mount_history,
    mount_sessions, mount_tool_error, session, settle, tool_call, tool_result, user,
};

#[tokio::test]
async fn first_tick_loads_lists_health_and_archive() {
    let fx = Fixture::start().await;
    mount_sessions(
        &fx.server,
        json!([session("agent:main:main", "a"), session("agent:main:subagent:x", "c")]),
    )
    .await;
    mount_health(&fx.server, 200).await;
    fx.write_process_list(&json!([
        {"name": "calm-reef", "status": "running", "runtime": "2m", "command": "npm test"}
    ]));
    fx.write_transcript("a", &[file_user("still active")]);
    fx.write_transcript("b", &[file_user("old question\nsecond line")]);

    let mut app = fx.app();
    boot(&mut app).await;

    assert_eq!(app.sessions().len(), 2);
    assert_eq!(app.processes().len(), 1);
    assert_eq!(app.processes()[0].name, "calm-reef");
    assert_eq!(app.archived().len(), 1);
    assert_eq!(app.archived()[0].session_id, "b");
    assert_eq!(app.archived()[0].label, "old question");
    assert!(app.health().is_some_and(|h| h.ok));
    assert!(app.last_error().is_none());
}

#[tokio::test]
async fn unhealthy_gateway_is_reported_without_error() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([])).await;
    mount_health(&fx.server, 503).await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));

    let mut app = fx.app();
    boot(&mut app).await;

    assert!(app.health().is_some_and(|h| !h.ok));
    assert!(app.sessions().is_empty());
}

#[tokio::test]
async fn selecting_a_session_renders_its_history() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([session("agent:main:main", "a")])).await;
    mount_history(
        &fx.server,
        json!([
            user("deploy the site"),
            assistant("Let me now check the build:"),
            tool_call("exec", json!({"command": "npm run build"})),
            tool_result("exec", "built in 3s", false),
            assistant("Deployed."),
        ]),
    )
    .await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));

    let mut app = fx.app();
    boot(&mut app).await;
    app.select_current();
    settle(&mut app, 1).await;

    let log = app.log();
    assert_eq!(log.query(), Some("deploy the site"));
    assert!(log.content().contains("$ npm run build"));
    assert!(log.content().contains("Deployed."));
    assert!(!log.content().contains("ASSISTANT"));
    assert!(!log.content().contains("Let me now"));
    assert!(log.follow());
}

#[tokio::test]
async fn denied_history_falls_back_to_transcript_file() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([session("agent:main:main", "a")])).await;
    mount_tool_error(&fx.server, "sessions_history", "visibility restricted").await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));
    fx.write_transcript("a", &[file_user("from disk"), file_assistant("disk reply")]);

    let mut app = fx.app();
    boot(&mut app).await;
    app.select_current();
    settle(&mut app, 1).await;

    assert_eq!(app.log().query(), Some("from disk"));
    assert!(app.log().content().contains("disk reply"));
    assert!(app.last_error().is_none());
}

#[tokio::test]
async fn archived_run_reads_its_file() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([session("agent:main:main", "a")])).await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));
    fx.write_transcript("b", &[file_user("what broke?"), file_assistant("the cache")]);

    let mut app = fx.app();
    boot(&mut app).await;
    app.select_tab(Tab::History);
    app.select_current();
    settle(&mut app, 1).await;

    assert_eq!(app.log_source().map(|s| s.title()), Some("what broke?"));
    assert!(app.log().content().contains("the cache"));
}

#[tokio::test]
async fn process_log_is_cleaned_and_kill_goes_through_gateway() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([])).await;
    fx.write_process_list(&json!([
        {"name": "calm-reef", "status": "running", "runtime": "2m", "command": "npm test"}
    ]));
    Mock::given(method("POST"))
        .and(path("/tools/invoke"))
        .and(body_partial_json(json!({
            "tool": "process",
            "args": {"action": "log", "sessionId": "calm-reef"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"content": [{"type": "text", "text": "\u{1b}[32mPASS\u{1b}[0m all tests\r\n"}]}
        })))
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tools/invoke"))
        .and(body_partial_json(json!({
            "tool": "process",
            "args": {"action": "kill", "sessionId": "calm-reef"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&fx.server)
        .await;

    let mut app = fx.app();
    boot(&mut app).await;
    app.select_tab(Tab::Processes);
    app.select_current();
    settle(&mut app, 1).await;

    assert_eq!(app.log().content(), "PASS all tests\n");
    assert!(app.log().query().is_none());

    assert!(app.enter_confirm_mode());
    match app.confirm_mode_mut() {
        ConfirmModeAccess::InConfirm(mode) => mode.confirm(),
        ConfirmModeAccess::NotConfirm => panic!("expected confirm mode"),
    }
    settle(&mut app, 1).await;
    assert_eq!(app.notice(), Some("Killed calm-reef"));
}

#[tokio::test]
async fn failed_process_log_sets_error() {
    let fx = Fixture::start().await;
    mount_sessions(&fx.server, json!([])).await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));

    let mut app = fx.app();
    boot(&mut app).await;
    app.select_tab(Tab::Processes);
    app.select_current();
    settle(&mut app, 1).await;

    let error = app.last_error().unwrap_or_default();
    assert!(error.starts_with("process log:"), "{error}");
    assert!(app.log().is_empty());
}

#[tokio::test]
async fn search_and_source_filter_narrow_sessions() {
    let fx = Fixture::start().await;
    mount_sessions(
        &fx.server,
        json!([
            {"key": "agent:main:main", "sessionId": "a"},
            {"key": "agent:main:signal:1", "sessionId": "s", "channel": "signal"},
            {"key": "agent:main:matrix:2", "sessionId": "d", "channel": "matrix", "label": "ops"},
        ]),
    )
    .await;
    fx.write_process_list(&json!([{"name": "calm-reef"}]));

    let mut app = fx.app();
    boot(&mut app).await;

    app.enter_search_mode();
    match app.search_mode_mut() {
        SearchModeAccess::InSearch(mut mode) => {
            for c in "sig".chars() {
                mode.enter_char(c);
            }
            mode.commit();
        }
        SearchModeAccess::NotSearch => panic!("expected search mode"),
    }
    let visible: Vec<&str> = app.visible_sessions().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(visible, ["agent:main:signal:1"]);

    app.enter_search_mode();
    if let SearchModeAccess::InSearch(mode) = app.search_mode_mut() {
        mode.cancel();
    }
    assert_eq!(app.visible_sessions().len(), 3);

    while app.source_filter() != SourceFilter::Matrix {
        app.cycle_source_filter();
    }
    let visible: Vec<&str> = app.visible_sessions().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(visible, ["agent:main:matrix:2"]);
}

#[cfg(unix)]
mod agent {
    use serde_json::json;

    use clawdeck_engine::{MessageModeAccess, SpawnModeAccess};

    use crate::common::{Fixture, boot, mount_history, mount_sessions, settle, user};

    #[tokio::test]
    async fn sent_reply_is_appended_to_the_shown_session() {
        let fx = Fixture::start().await;
        mount_sessions(&fx.server, json!([{"key": "agent:main:main", "sessionId": "a"}])).await;
        mount_history(&fx.server, json!([user("status?")])).await;
        fx.write_process_list(&json!([{"name": "calm-reef"}]));

        let mut app = fx.app_with_agent(r#"{"result":{"payloads":[{"text":"all green"}]}}"#);
        boot(&mut app).await;
        app.select_current();
        settle(&mut app, 1).await;

        assert!(app.enter_message_mode());
        match app.message_mode_mut() {
            MessageModeAccess::InMessage(mut mode) => {
                for c in "and now?".chars() {
                    mode.enter_char(c);
                }
                assert!(mode.submit());
            }
            MessageModeAccess::NotMessage => panic!("expected message mode"),
        }
        assert!(app.sending());

        settle(&mut app, 1).await;
        assert!(!app.sending());
        assert!(app.log().content().contains("--- SENT ---\nall green\n"));
    }

    #[tokio::test]
    async fn spawn_reports_new_session_id() {
        let fx = Fixture::start().await;
        mount_sessions(&fx.server, json!([{"key": "agent:main:main", "sessionId": "a"}])).await;
        fx.write_process_list(&json!([{"name": "calm-reef"}]));

        let mut app = fx.app_with_agent(r#"{"sessionId":"new-1"}"#);
        boot(&mut app).await;

        app.enter_spawn_mode();
        match app.spawn_mode_mut() {
            SpawnModeAccess::InSpawn(mut mode) => {
                for c in "triage the queue".chars() {
                    mode.enter_char(c);
                }
                assert!(mode.submit());
            }
            SpawnModeAccess::NotSpawn => panic!("expected spawn mode"),
        }
        assert!(app.spinning());

        // The model list and the spawn itself, in either order.
        settle(&mut app, 2).await;
        assert!(!app.spinning());
        assert_eq!(app.notice(), Some("Spawned: new-1"));
    }
}
