//! Integration tests for the tool gateway against a stub document store.


use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Map, Value as JsonValue};

use obsidian_mcp::{ClientConfig, McpError, ObsidianClient, ToolRegistry};
use test_utils::{StubResponse, StubStore};

fn args(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        _ => panic!("test arguments must be an object"),
    }
}

/// A client pointed at an endpoint nothing listens on.
fn unroutable_client() -> ObsidianClient {
    ObsidianClient::new(ClientConfig {
        api_key: "test-token".to_string(),
        protocol: "http".to_string(),
        host: "127.0.0.1".to_string(),
        port: 1,
        verify_tls: true,
    })
    .expect("failed to build client")
}

#[tokio::test]
async fn validation_failures_never_issue_requests() {
    let store = StubStore::with_response(StubResponse::ok_json("[]")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    // One schema-invalid invocation per operation that takes arguments.
    let invalid: Vec<(&str, JsonValue)> = vec![
        ("list_files_in_dir", json!({})),
        ("get_file_contents", json!({"filepath": 42})),
        ("batch_get_file_contents", json!({"filepaths": "a.md"})),
        ("simple_search", json!({})),
        ("simple_search", json!({"query": "x", "context_length": "many"})),
        ("complex_search", json!({"query": "not an object"})),
        ("append_content", json!({"filepath": "a.md"})),
        (
            "patch_content",
            json!({
                "filepath": "a.md",
                "operation": "insert",
                "target_type": "heading",
                "target": "H1",
                "content": "x"
            }),
        ),
        (
            "patch_content",
            json!({
                "filepath": "a.md",
                "operation": "append",
                "target_type": "line",
                "target": "H1",
                "content": "x"
            }),
        ),
        ("delete_file", json!({"confirm": true})),
        ("get_periodic_note", json!({"period": "hourly"})),
        ("get_recent_periodic_notes", json!({"period": "daily", "limit": 0})),
        ("get_recent_periodic_notes", json!({"period": "daily", "limit": 51})),
        (
            "get_recent_periodic_notes",
            json!({"period": "daily", "include_content": "yes"}),
        ),
        ("get_recent_changes", json!({"limit": 0})),
        ("get_recent_changes", json!({"days": 0})),
        ("get_recent_changes", json!({"limit": 101})),
    ];

    for (name, arguments) in invalid {
        let result = registry.dispatch(&client, name, args(arguments.clone())).await;
        match result {
            Err(McpError::MissingArg(_)) | Err(McpError::InvalidArg { .. }) => {}
            other => panic!("{name} with {arguments} should fail validation, got {other:?}"),
        }
    }

    assert_eq!(store.request_count().await, 0, "validation must gate the network");
}

#[tokio::test]
async fn delete_without_confirmation_is_gated_locally() {
    let store = StubStore::with_response(StubResponse::ok_json("{}")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    for arguments in [json!({"filepath": "old.md"}), json!({"filepath": "old.md", "confirm": false})] {
        let result = registry.dispatch(&client, "delete_file", args(arguments)).await;
        assert!(
            matches!(result, Err(McpError::ConfirmationRequired(_))),
            "unconfirmed delete must fail the safety gate"
        );
    }
    assert_eq!(store.request_count().await, 0);
}

#[tokio::test]
async fn confirmed_delete_issues_one_request_and_returns_status() {
    let store = StubStore::with_response(StubResponse::ok_json("{}")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let result = registry
        .dispatch(&client, "delete_file", args(json!({"filepath": "old.md", "confirm": true})))
        .await
        .unwrap();
    assert_eq!(result.pointer("/status"), Some(&json!(200)));
    assert_eq!(
        result.pointer("/message").and_then(|v| v.as_str()),
        Some("Successfully deleted old.md")
    );

    let requests = store.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].target, "/vault/old.md");
}

#[tokio::test]
async fn periodic_note_paths_cover_all_five_periods() {
    let store = StubStore::with_response(StubResponse::ok_text("note body")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    for period in ["daily", "weekly", "monthly", "quarterly", "yearly"] {
        let result = registry
            .dispatch(&client, "get_periodic_note", args(json!({"period": period})))
            .await
            .unwrap();
        assert_eq!(result, json!("note body"));
    }

    let targets: Vec<String> = store.requests().await.iter().map(|r| r.target.clone()).collect();
    assert_eq!(
        targets,
        vec![
            "/periodic/daily/",
            "/periodic/weekly/",
            "/periodic/monthly/",
            "/periodic/quarterly/",
            "/periodic/yearly/",
        ]
    );
}

#[tokio::test]
async fn recent_periodic_notes_send_limit_and_include_content() {
    let store = StubStore::with_response(StubResponse::ok_json("[]")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    registry
        .dispatch(
            &client,
            "get_recent_periodic_notes",
            args(json!({"period": "daily", "limit": 5})),
        )
        .await
        .unwrap();

    let requests = store.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path(), "/periodic/daily/recent");
    assert_eq!(requests[0].query(), Some("limit=5&includeContent=false"));
}

#[tokio::test]
async fn batch_read_renders_inline_error_blocks_in_input_order() {
    let store = StubStore::start(|request| match request.target.as_str() {
        "/vault/a.md" => StubResponse::ok_text("alpha"),
        _ => StubResponse::store_error(404, 40102, "not found"),
    })
    .await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let result = registry
        .dispatch(
            &client,
            "batch_get_file_contents",
            args(json!({"filepaths": ["a.md", "missing.md"]})),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!(
            "# a.md\n\nalpha\n\n---\n\n\
             # missing.md\n\nError reading file: Error 40102: not found\n\n---\n\n"
        )
    );
    assert_eq!(store.request_count().await, 2, "the batch must not abort early");
}

#[tokio::test]
async fn append_then_read_round_trips_content_unchanged() {
    let files: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());
    let store = StubStore::start(move |request| {
        let mut files = files.lock().unwrap();
        match request.method.as_str() {
            "POST" => {
                files.insert(request.target.clone(), request.body.clone());
                StubResponse {
                    status: 204,
                    content_type: "text/plain",
                    body: String::new(),
                }
            }
            _ => match files.get(&request.target) {
                Some(content) => StubResponse::ok_text(content),
                None => StubResponse::store_error(404, 40400, "file not found"),
            },
        }
    })
    .await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let text = "## Log\n\n- entry one\n";
    let appended = registry
        .dispatch(
            &client,
            "append_content",
            args(json!({"filepath": "log.md", "content": text})),
        )
        .await
        .unwrap();
    assert_eq!(
        appended.pointer("/message").and_then(|v| v.as_str()),
        Some("Successfully appended content to log.md")
    );

    let read = registry
        .dispatch(&client, "get_file_contents", args(json!({"filepath": "log.md"})))
        .await
        .unwrap();
    assert_eq!(read.pointer("/content"), Some(&json!(text)));
    assert!(read.pointer("/now").and_then(|v| v.as_str()).is_some());

    let requests = store.requests().await;
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].header("content-type"), Some("text/markdown"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn simple_search_sends_params_and_defaults_missing_fields() {
    let store = StubStore::with_response(StubResponse::ok_json(r#"[{"filename": "x.md"}]"#)).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let result = registry
        .dispatch(
            &client,
            "simple_search",
            args(json!({"query": "foo", "context_length": 50})),
        )
        .await
        .unwrap();

    assert_eq!(result, json!([{"filename": "x.md", "score": 0, "matches": []}]));

    let requests = store.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path(), "/search/simple/");
    assert_eq!(requests[0].query(), Some("query=foo&contextLength=50"));
}

#[tokio::test]
async fn complex_search_forwards_the_query_verbatim() {
    let store = StubStore::with_response(StubResponse::ok_json("[]")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let query = json!({"glob": ["*.md", {"var": "path"}]});
    registry
        .dispatch(&client, "complex_search", args(json!({"query": query})))
        .await
        .unwrap();

    let requests = store.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/search/");
    assert_eq!(
        requests[0].header("content-type"),
        Some("application/vnd.olrapi.jsonlogic+json")
    );
    let sent: JsonValue = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent, query);
}

#[tokio::test]
async fn recent_changes_posts_the_generated_dataview_query() {
    let store = StubStore::with_response(StubResponse::ok_json("[]")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    registry
        .dispatch(&client, "get_recent_changes", args(json!({"limit": 7, "days": 30})))
        .await
        .unwrap();

    let requests = store.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/search/");
    assert_eq!(
        requests[0].header("content-type"),
        Some("application/vnd.olrapi.dataview.dql+txt")
    );
    assert_eq!(
        requests[0].body,
        "TABLE file.mtime\n\
         WHERE file.mtime >= date(today) - dur(30 days)\n\
         SORT file.mtime DESC\n\
         LIMIT 7"
    );
}

#[tokio::test]
async fn patch_sends_operation_headers_with_escaped_target() {
    let store = StubStore::with_response(StubResponse::ok_json("{}")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    registry
        .dispatch(
            &client,
            "patch_content",
            args(json!({
                "filepath": "notes/plan.md",
                "operation": "replace",
                "target_type": "heading",
                "target": "Weekly Plan",
                "content": "updated"
            })),
        )
        .await
        .unwrap();

    registry
        .dispatch(
            &client,
            "patch_content",
            args(json!({
                "filepath": "notes/plan.md",
                "operation": "append",
                "target_type": "heading",
                "target": "Projects/Q3 Plan",
                "content": "- item"
            })),
        )
        .await
        .unwrap();

    let requests = store.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "PATCH");
    assert_eq!(requests[0].target, "/vault/notes/plan.md");
    assert_eq!(requests[0].header("operation"), Some("replace"));
    assert_eq!(requests[0].header("target-type"), Some("heading"));
    assert_eq!(requests[0].header("target"), Some("Weekly%20Plan"));
    assert_eq!(requests[0].body, "updated");

    // Nested heading paths keep their separators unescaped.
    assert_eq!(requests[1].header("target"), Some("Projects/Q3%20Plan"));
}

#[tokio::test]
async fn listing_unwraps_the_files_field() {
    let store =
        StubStore::with_response(StubResponse::ok_json(r#"{"files": ["a.md", "sub/"]}"#)).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let root = registry
        .dispatch(&client, "list_files_in_vault", Map::new())
        .await
        .unwrap();
    assert_eq!(root, json!(["a.md", "sub/"]));

    let dir = registry
        .dispatch(&client, "list_files_in_dir", args(json!({"dirpath": "sub"})))
        .await
        .unwrap();
    assert_eq!(dir, json!(["a.md", "sub/"]));

    let targets: Vec<String> = store.requests().await.iter().map(|r| r.target.clone()).collect();
    assert_eq!(targets, vec!["/vault/", "/vault/sub/"]);
}

#[tokio::test]
async fn store_error_body_surfaces_verbatim() {
    let store = StubStore::with_response(StubResponse::store_error(404, 40102, "not found")).await;
    let client = store.client();
    let registry = ToolRegistry::new();

    let result = registry
        .dispatch(&client, "get_file_contents", args(json!({"filepath": "gone.md"})))
        .await;
    match result {
        Err(McpError::Store { code, message }) => {
            assert_eq!(code, 40102);
            assert_eq!(message, "not found");
        }
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_surfaces_as_synthesized_store_error() {
    let client = unroutable_client();
    let registry = ToolRegistry::new();

    let result = registry
        .dispatch(&client, "list_files_in_vault", Map::new())
        .await;
    match result {
        Err(McpError::Store { code, message }) => {
            assert_eq!(code, -1);
            assert!(message.starts_with("Request failed:"), "got: {message}");
        }
        other => panic!("expected store error, got {other:?}"),
    }
}
