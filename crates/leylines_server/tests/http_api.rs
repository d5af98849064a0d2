use axum::http::StatusCode;
use leylines_core::Store;
use leylines_server::{build_router, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

async fn spawn_app(store: Store) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let app = build_router(AppState::new(store));
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn app() -> SocketAddr {
    spawn_app(Store::in_memory()).await
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let (status, _head, json) = exchange(addr, method, path, body).await;
    (status, json)
}

/// Returns the status, the raw response head and the parsed JSON body.
async fn exchange(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (StatusCode, String, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(payload) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    req.push_str("\r\n");
    if let Some(payload) = body {
        req.push_str(payload);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .expect("http status");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).expect("json body")
    };
    (status, head.to_ascii_lowercase(), json)
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let payload = body.map(|value| value.to_string());
    send_raw(addr, method, path, payload.as_deref()).await
}

async fn quick_board(addr: SocketAddr) -> String {
    let (status, board) = send(addr, "POST", "/api/articles/quick", None).await;
    assert_eq!(status, StatusCode::CREATED);
    board["id"].as_str().unwrap().to_string()
}

async fn create_note(addr: SocketAddr, article_id: &str, content: &str) -> Value {
    let (status, note) = send(
        addr,
        "POST",
        "/api/postits",
        Some(json!({ "articleId": article_id, "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    note
}

#[tokio::test]
async fn banner_and_health_report_running_service() {
    let addr = app().await;

    let (status, banner) = send(addr, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banner["status"], "running");
    assert_eq!(banner["version"], env!("CARGO_PKG_VERSION"));

    let (status, health) = send(addr, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "OK");
    assert!(health["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let addr = app().await;
    let (status, body) = send(addr, "GET", "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let addr = app().await;

    for path in ["/api/health", "/api/nothing-here"] {
        let (_, head, _) = exchange(addr, "GET", path, None).await;
        assert!(head.contains("x-content-type-options: nosniff"), "{path}: {head}");
        assert!(head.contains("x-frame-options: sameorigin"), "{path}: {head}");
        assert!(head.contains("referrer-policy: no-referrer"), "{path}: {head}");
        assert!(
            head.contains("content-security-policy: default-src 'none'"),
            "{path}: {head}"
        );
    }
}

#[tokio::test]
async fn bring_to_front_past_max_z_index_conflicts() {
    let addr = app().await;
    let board = quick_board(addr).await;
    let top = create_note(addr, &board, "top").await;
    let below = create_note(addr, &board, "below").await;

    let top_uri = format!("/api/postits/{}/position", top["id"].as_str().unwrap());
    let (status, _) = send(
        addr,
        "PATCH",
        &top_uri,
        Some(json!({ "position": { "zIndex": i64::MAX } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let below_uri = format!("/api/postits/{}", below["id"].as_str().unwrap());
    let (status, body) = send(addr, "POST", &format!("{below_uri}/bring-to-front"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("stacking order"));

    let (status, unchanged) = send(addr, "GET", &below_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, below);
}

#[tokio::test]
async fn quick_create_then_get_returns_identical_record() {
    let addr = app().await;

    let (status, created) = send(addr, "POST", "/api/articles/quick", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], created["id"]);
    assert_eq!(created["content"], "");
    assert_eq!(created["summary"], "New post-it board");
    assert_eq!(created["tags"], json!([]));
    assert_eq!(created["isPublished"], false);
    assert_eq!(created["version"], 1);

    let uri = format!("/api/articles/{}", created["id"].as_str().unwrap());
    let (status, fetched) = send(addr, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn article_ids_are_validated_before_lookup() {
    let addr = app().await;

    let (status, body) = send(addr, "GET", "/api/articles/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid article ID format");

    let uri = format!("/api/articles/{}", Uuid::new_v4());
    let (status, body) = send(addr, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");
}

#[tokio::test]
async fn article_create_update_and_list_flow() {
    let addr = app().await;

    let (status, created) = send(
        addr,
        "POST",
        "/api/articles",
        Some(json!({ "title": "Roadmap", "content": "Q3", "tags": ["Research", "ideas"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["version"], 1);
    send(
        addr,
        "POST",
        "/api/articles",
        Some(json!({ "title": "Other" })),
    )
    .await;

    let uri = format!("/api/articles/{}", created["id"].as_str().unwrap());
    let (status, updated) = send(
        addr,
        "PUT",
        &uri,
        Some(json!({ "summary": "plans", "isPublished": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["summary"], "plans");
    assert_eq!(updated["isPublished"], true);
    assert_eq!(updated["title"], "Roadmap");

    let (status, listed) = send(
        addr,
        "GET",
        "/api/articles?tags=research,missing&limit=abc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["articles"].as_array().unwrap().len(), 1);
    assert_eq!(listed["pagination"]["total"], 1);
    assert_eq!(listed["pagination"]["limit"], 10);

    let (_, searched) = send(addr, "GET", "/api/articles?search=oth", None).await;
    assert_eq!(searched["articles"][0]["title"], "Other");
}

#[tokio::test]
async fn article_tag_membership_endpoints_require_tags_array() {
    let addr = app().await;
    let board = quick_board(addr).await;
    let uri = format!("/api/articles/{board}/tags");

    let (status, body) = send(addr, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tags must be provided as an array");

    let (status, added) = send(
        addr,
        "POST",
        &uri,
        Some(json!({ "tags": ["alpha", "beta"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["tags"], json!(["alpha", "beta"]));

    let (status, removed) = send(
        addr,
        "DELETE",
        &uri,
        Some(json!({ "tags": ["ALPHA"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["tags"], json!(["beta"]));
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let addr = app().await;
    let (status, body) = send_raw(addr, "POST", "/api/articles", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn postit_create_validates_input_and_article() {
    let addr = app().await;

    let (status, body) = send(
        addr,
        "POST",
        "/api/postits",
        Some(json!({ "content": "orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content and articleId are required");

    let (status, body) = send(
        addr,
        "POST",
        "/api/postits",
        Some(json!({ "content": "orphan", "articleId": Uuid::new_v4().to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");

    let (_, listed) = send(addr, "GET", "/api/postits", None).await;
    assert_eq!(listed["pagination"]["total"], 0);

    let board = quick_board(addr).await;
    let note = create_note(addr, &board, "hello").await;
    assert_eq!(note["color"], "#FBBF24");
    assert_eq!(note["position"]["zIndex"], 1);
    assert_eq!(note["position"]["width"].as_f64(), Some(200.0));
}

#[tokio::test]
async fn patch_position_then_get_returns_submitted_values() {
    let addr = app().await;
    let board = quick_board(addr).await;
    let note = create_note(addr, &board, "move me").await;
    let uri = format!("/api/postits/{}", note["id"].as_str().unwrap());

    let (status, body) = send(
        addr,
        "PATCH",
        &format!("{uri}/position"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Position data is required");

    let (status, moved) = send(
        addr,
        "PATCH",
        &format!("{uri}/position"),
        Some(json!({
            "position": { "x": 100.5, "y": 50.25, "width": 220.0, "height": 160.0, "zIndex": 3 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, fetched) = send(addr, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, moved);
    assert_eq!(fetched["position"]["x"].as_f64(), Some(100.5));
    assert_eq!(fetched["position"]["y"].as_f64(), Some(50.25));
    assert_eq!(fetched["position"]["width"].as_f64(), Some(220.0));
    assert_eq!(fetched["position"]["height"].as_f64(), Some(160.0));
    assert_eq!(fetched["position"]["zIndex"], 3);
    assert!(fetched["updatedAt"].as_i64().unwrap() > note["updatedAt"].as_i64().unwrap());
}

#[tokio::test]
async fn bring_to_front_and_bulk_positions() {
    let addr = app().await;
    let board = quick_board(addr).await;
    let first = create_note(addr, &board, "first").await;
    let second = create_note(addr, &board, "second").await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    let (status, raised) = send(
        addr,
        "POST",
        &format!("/api/postits/{first_id}/bring-to-front"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(raised["position"]["zIndex"], 2);

    let missing = Uuid::new_v4().to_string();
    let (status, outcome) = send(
        addr,
        "POST",
        "/api/postits/bulk-update-positions",
        Some(json!({
            "updates": [
                { "id": second_id, "position": { "x": 10.0, "y": 20.0, "zIndex": 7 } },
                { "id": "bogus", "position": { "x": 1.0 } },
                { "id": missing, "position": { "x": 1.0 } }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["modifiedCount"], 1);
    assert_eq!(outcome["skippedIds"], json!(["bogus", missing]));
    assert_eq!(outcome["message"], "1 post-its updated successfully");

    let (_, board_notes) = send(
        addr,
        "GET",
        &format!("/api/articles/{board}/postits"),
        None,
    )
    .await;
    assert_eq!(board_notes["count"], 2);
    assert_eq!(board_notes["articleId"], board.as_str());
    assert_eq!(board_notes["postits"][1]["id"], second_id);

    let (status, body) = send(
        addr,
        "POST",
        "/api/postits/bulk-update-positions",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Updates array is required");
}

#[tokio::test]
async fn deleting_article_removes_its_postits() {
    let addr = app().await;
    let board = quick_board(addr).await;
    let note = create_note(addr, &board, "doomed").await;

    let (status, body) = send(addr, "DELETE", &format!("/api/articles/{board}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Article and associated post-its deleted successfully"
    );

    let note_uri = format!("/api/postits/{}", note["id"].as_str().unwrap());
    let (status, body) = send(addr, "GET", &note_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post-it not found");

    let (status, _) = send(
        addr,
        "GET",
        &format!("/api/articles/{board}/postits"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(addr, "DELETE", "/api/postits/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid post-it ID format");
}

#[tokio::test]
async fn tag_endpoints_enforce_uniqueness_and_cascade_deletes() {
    let addr = app().await;

    let (status, research) = send(
        addr,
        "POST",
        "/api/tags",
        Some(json!({ "name": "Research", "description": "lab work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(research["color"], "#3B82F6");

    let (status, body) = send(
        addr,
        "POST",
        "/api/tags",
        Some(json!({ "name": "research" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Tag already exists");

    let (status, body) = send(addr, "POST", "/api/tags", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tag name is required");

    let (status, ideas) = send(
        addr,
        "POST",
        "/api/tags",
        Some(json!({ "name": "Ideas" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        addr,
        "PUT",
        &format!("/api/tags/{}", ideas["id"].as_str().unwrap()),
        Some(json!({ "name": "RESEARCH" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Tag name already exists");

    let (_, article) = send(
        addr,
        "POST",
        "/api/articles",
        Some(json!({ "title": "Tagged", "tags": ["research", "Ideas"] })),
    )
    .await;

    let (_, counted) = send(addr, "GET", "/api/tags?withCount=true", None).await;
    assert_eq!(counted[0]["name"], "Ideas");
    assert_eq!(counted[0]["articleCount"], 1);

    let (_, popular) = send(addr, "GET", "/api/tags/popular?limit=1", None).await;
    assert_eq!(popular.as_array().unwrap().len(), 1);
    assert_eq!(popular[0]["count"], 1);

    let (status, by_name) = send(addr, "GET", "/api/tags/name/RESEARCH", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["id"], research["id"]);

    let (status, body) = send(addr, "GET", "/api/tags?sortBy=popularity", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let research_uri = format!("/api/tags/{}", research["id"].as_str().unwrap());
    let (status, body) = send(addr, "DELETE", &research_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tag deleted successfully");

    let (status, body) = send(addr, "GET", &research_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tag not found");

    let (_, reloaded) = send(
        addr,
        "GET",
        &format!("/api/articles/{}", article["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(reloaded["tags"], json!(["Ideas"]));
    assert_eq!(reloaded["version"], article["version"]);
}

#[tokio::test]
async fn file_store_keeps_boards_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leylines.db");

    let first_run = spawn_app(Store::file(&path)).await;
    let board = quick_board(first_run).await;

    let second_run = spawn_app(Store::file(&path)).await;
    let (status, fetched) = send(
        second_run,
        "GET",
        &format!("/api/articles/{board}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], board.as_str());
}
