mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{FixtureRepo, ScriptedTool};
use hookci::ci::controller::BuildContext;
use hookci::ci::notifier::NotifierSettings;
use hookci::server::api::state::App as AppState;
use hookci::server::app::init_app;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Keeps the temporary directories of an app alive.
struct Fixture {
    _db_dir: TempDir,
    _workspace_root: TempDir,
    remote: FixtureRepo,
    state: AppState,
}

async fn fixture() -> Fixture {
    let (db_dir, history) = common::init_history().await;
    let workspace_root = tempfile::tempdir().unwrap();
    let state = AppState {
        context: BuildContext {
            history,
            build_tool: Arc::new(ScriptedTool::new(
                true,
                false,
                Some(common::report_html(10, 3)),
            )),
            workspace_root: workspace_root.path().to_path_buf(),
        },
        notifier: NotifierSettings {
            client: reqwest::Client::new(),
            api_url: "http://127.0.0.1:9".to_owned(),
            token: None,
        },
    };
    Fixture {
        _db_dir: db_dir,
        _workspace_root: workspace_root,
        remote: FixtureRepo::init(),
        state,
    }
}

fn push_payload(clone_url: &str, branch: &str) -> Value {
    json!({
        "ref": format!("refs/heads/{branch}"),
        "repository": {
            "clone_url": clone_url,
            "full_name": "octo/app",
            "pushed_at": 1_706_000_000
        },
        "sender": {
            "login": "octocat",
            "url": "https://api.github.com/users/octocat",
            "html_url": "https://github.com/octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/1"
        },
        "commits": [{
            "id": "0123456789abcdef",
            "message": "Add <script> to the page",
            "url": "https://github.com/octo/app/commit/0123456789abcdef",
            "author": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "username": "ada"
            },
            "modified": ["src/a, b.rs"]
        }]
    })
}

#[actix_web::test]
async fn test_index_when_no_builds_expect_empty_message() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let actual = String::from_utf8(body.to_vec()).unwrap();
    assert!(actual.contains("No builds found in database."));
}

#[actix_web::test]
async fn test_webhook_when_ping_expect_pong() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::post()
        .uri("/webhook")
        .insert_header(("X-GitHub-Event", "ping"))
        .set_payload("{}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "pong");
}

#[actix_web::test]
async fn test_webhook_when_other_event_expect_accepted() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(("X-GitHub-Event", "issues"))
        .set_payload("{}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn test_webhook_when_malformed_payload_expect_bad_request() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::post()
        .uri("/webhook")
        .insert_header(("X-GitHub-Event", "push"))
        .set_payload("{\"ref\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_webhook_when_push_expect_build_recorded_and_served() {
    let fixture = fixture().await;
    let branch = fixture.remote.current_branch();
    let app = test::init_service(init_app(&fixture.state)).await;

    let req = test::TestRequest::post()
        .uri("/webhook")
        .insert_header(("X-GitHub-Event", "push"))
        .set_json(push_payload(&fixture.remote.url(), &branch))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["outcome"], "error");
    let build_id = resp["build_id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/build_{build_id}/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("Add &lt;script&gt; to the page"));
    assert!(!page.contains("<script>"));
    assert!(page.contains("Total: 10"));
    assert!(page.contains("Passed: 7"));

    let req = test::TestRequest::get().uri("/").to_request();
    let index = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    assert!(index.contains(&format!("href=\"/build_{build_id}/\"")));

    let req = test::TestRequest::get().uri("/_api/builds").to_request();
    let builds: Value = test::call_and_read_body_json(&app, req).await;
    let builds = builds.as_array().unwrap();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0]["id"], build_id);
    assert_eq!(builds[0]["branch"], branch.as_str());
    assert_eq!(builds[0]["commits"][0]["modified_files"][0], "src/a, b.rs");
}

#[actix_web::test]
async fn test_webhook_when_branch_missing_expect_no_build_recorded() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::post()
        .uri("/webhook")
        .insert_header(("X-GitHub-Event", "push"))
        .set_json(push_payload(&fixture.remote.url(), "gone"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.starts_with("No build recorded"));

    let req = test::TestRequest::get().uri("/_api/builds").to_request();
    let builds: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(builds.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_build_page_when_unknown_id_expect_not_found() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::get().uri("/build_999/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(test::read_body(resp).await, "Build not found");
}

#[actix_web::test]
async fn test_api_build_when_unknown_id_expect_not_found() {
    let fixture = fixture().await;
    let app = test::init_service(init_app(&fixture.state)).await;
    let req = test::TestRequest::get().uri("/_api/builds/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
