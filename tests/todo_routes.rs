use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

use todo_api::{
    db::entities::prelude::{Item, Todo},
    routes::API_PREFIX,
    state::AppState,
    test_helpers::{test_router, test_state},
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

async fn app_state() -> Arc<AppState> {
    test_state().await.expect("in-memory database should migrate")
}

async fn json_response(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = test_router(state.clone())
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json: Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

async fn create_todo(state: &Arc<AppState>, body: Value) -> Value {
    let (status, json) =
        json_response(state, json_request("POST", &api_path("/todos"), body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json["data"].clone()
}

fn id_of(value: &Value) -> String {
    value["id"]
        .as_str()
        .expect("id should be a string")
        .to_string()
}

#[tokio::test]
async fn welcome_route_answers_at_root() {
    let state = app_state().await;
    let (status, json) = json_response(&state, empty_request("GET", "/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to Todo Application API.");
}

#[tokio::test]
async fn create_persists_todo_with_items_in_order() {
    let state = app_state().await;
    let todo = create_todo(
        &state,
        json!({
            "title": "Groceries",
            "subtitle": "weekly",
            "items": [
                { "content": "milk" },
                { "content": "eggs", "isCompleted": true }
            ]
        }),
    )
    .await;

    assert_eq!(todo["title"], "Groceries");
    assert_eq!(todo["subtitle"], "weekly");
    assert_eq!(todo["status"], "ACTIVE");
    let items = todo["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"], "milk");
    assert_eq!(items[0]["isCompleted"], false);
    assert!(items[0]["completedAt"].is_null());
    assert_eq!(items[1]["content"], "eggs");
    assert!(!items[1]["completedAt"].is_null());
    assert_eq!(items[1]["todoId"], todo["id"]);

    assert_eq!(Todo::find().count(&state.db).await.expect("count"), 1);
    assert_eq!(Item::find().count(&state.db).await.expect("count"), 2);
}

#[tokio::test]
async fn invalid_item_rolls_back_the_whole_todo() {
    let state = app_state().await;
    let (status, json) = json_response(
        &state,
        json_request(
            "POST",
            &api_path("/todos"),
            json!({
                "title": "Groceries",
                "items": [{ "content": "milk" }, { "content": "   " }]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Content cannot be empty!");
    assert!(json["data"].is_null());
    assert_eq!(Todo::find().count(&state.db).await.expect("count"), 0);
    assert_eq!(Item::find().count(&state.db).await.expect("count"), 0);
}

#[tokio::test]
async fn create_rejects_blank_title_and_unknown_status() {
    let state = app_state().await;

    let (status, json) = json_response(
        &state,
        json_request("POST", &api_path("/todos"), json!({ "title": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Title cannot be empty!");

    let (status, _) = json_response(
        &state,
        json_request(
            "POST",
            &api_path("/todos"),
            json!({ "title": "Chores", "status": "ARCHIVED" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(Todo::find().count(&state.db).await.expect("count"), 0);
}

#[tokio::test]
async fn list_paginates_oldest_first() {
    let state = app_state().await;
    for n in 1..=5 {
        create_todo(&state, json!({ "title": format!("Todo {n}") })).await;
    }

    let (status, json) =
        json_response(&state, empty_request("GET", &api_path("/todos?page=1&size=3"))).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["totalItems"], 5);
    assert_eq!(data["totalPages"], 2);
    assert_eq!(data["currentPage"], 1);
    let titles: Vec<&str> = data["todos"]
        .as_array()
        .expect("todos array")
        .iter()
        .map(|todo| todo["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Todo 1", "Todo 2", "Todo 3"]);

    let (_, json) =
        json_response(&state, empty_request("GET", &api_path("/todos?page=2&size=3"))).await;
    assert_eq!(json["data"]["todos"].as_array().expect("todos").len(), 2);
    assert_eq!(json["data"]["currentPage"], 2);
}

#[tokio::test]
async fn list_defaults_and_rejects_bad_pagination() {
    let state = app_state().await;
    create_todo(&state, json!({ "title": "Only" })).await;

    let (status, json) = json_response(&state, empty_request("GET", &api_path("/todos"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["currentPage"], 1);
    assert_eq!(json["data"]["totalPages"], 1);

    for query in [
        "page=0",
        "size=0",
        "size=101",
        "page=18446744073709551615&size=10",
        "page=922337203685477582&size=10",
    ] {
        let (status, json) = json_response(
            &state,
            empty_request("GET", &api_path(&format!("/todos?{query}"))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
        assert!(json["data"].is_null());
    }
}

#[tokio::test]
async fn title_filter_is_case_insensitive_substring() {
    let state = app_state().await;
    for title in ["Shopping List", "Shopping Ideas", "Work", "100% done"] {
        create_todo(&state, json!({ "title": title })).await;
    }

    let (_, json) = json_response(
        &state,
        empty_request("GET", &api_path("/todos?title=shopping")),
    )
    .await;
    assert_eq!(json["data"]["totalItems"], 2);

    let (_, json) =
        json_response(&state, empty_request("GET", &api_path("/todos?title=%25"))).await;
    let todos = json["data"]["todos"].as_array().expect("todos");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "100% done");
}

#[tokio::test]
async fn title_filter_finds_non_ascii_titles() {
    let state = app_state().await;
    for title in ["ÉCOLE Supplies", "Crème brûlée", "Errands"] {
        create_todo(&state, json!({ "title": title })).await;
    }

    // %C3%89COLE = ÉCOLE, %C3%A8me%20BR = ème BR
    for (query, expected) in [
        ("%C3%89COLE", "ÉCOLE Supplies"),
        ("%C3%89cole%20sUPPLIES", "ÉCOLE Supplies"),
        ("%C3%A8me%20BR", "Crème brûlée"),
    ] {
        let (status, json) = json_response(
            &state,
            empty_request("GET", &api_path(&format!("/todos?title={query}"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["totalItems"], 1, "query {query}");
        assert_eq!(json["data"]["todos"][0]["title"], expected);
    }
}

#[tokio::test]
async fn status_filter_and_default_hide_deleted() {
    let state = app_state().await;
    create_todo(&state, json!({ "title": "Keep" })).await;
    create_todo(&state, json!({ "title": "Paused", "status": "INACTIVE" })).await;
    let doomed = create_todo(&state, json!({ "title": "Drop" })).await;

    let (status, _) = json_response(
        &state,
        empty_request("DELETE", &api_path(&format!("/todos/{}", id_of(&doomed)))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = json_response(&state, empty_request("GET", &api_path("/todos"))).await;
    assert_eq!(json["data"]["totalItems"], 2);

    let (_, json) = json_response(
        &state,
        empty_request("GET", &api_path("/todos?status=DELETED")),
    )
    .await;
    assert_eq!(json["data"]["totalItems"], 1);
    assert_eq!(json["data"]["todos"][0]["title"], "Drop");

    let (_, json) = json_response(
        &state,
        empty_request("GET", &api_path("/todos?status=inactive")),
    )
    .await;
    assert_eq!(json["data"]["totalItems"], 1);

    let (status, _) = json_response(
        &state,
        empty_request("GET", &api_path("/todos?status=bogus")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_applies_partial_fields() {
    let state = app_state().await;
    let todo = create_todo(&state, json!({ "title": "Draft", "subtitle": "notes" })).await;
    let path = api_path(&format!("/todos/{}", id_of(&todo)));

    let (status, json) = json_response(
        &state,
        json_request("PUT", &path, json!({ "title": "Final", "status": "INACTIVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Todo was updated successfully.");
    assert_eq!(json["data"]["title"], "Final");
    assert_eq!(json["data"]["subtitle"], "notes");
    assert_eq!(json["data"]["status"], "INACTIVE");

    let (_, json) =
        json_response(&state, json_request("PUT", &path, json!({ "subtitle": null }))).await;
    assert!(json["data"]["subtitle"].is_null());

    let (status, json) = json_response(&state, json_request("PUT", &path, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        json["message"]
            .as_str()
            .expect("message")
            .starts_with("Cannot update Todo with id=")
    );
    assert!(json["data"].is_null());

    let (status, json) =
        json_response(&state, json_request("PUT", &path, json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Title cannot be empty!");
}

#[tokio::test]
async fn deleted_todo_disappears_but_keeps_item_rows() {
    let state = app_state().await;
    let todo = create_todo(
        &state,
        json!({ "title": "Trip", "items": [{ "content": "tickets" }] }),
    )
    .await;
    let todo_id = id_of(&todo);
    let item_id = id_of(&todo["items"][0]);
    let path = api_path(&format!("/todos/{todo_id}"));

    let (status, json) = json_response(&state, empty_request("DELETE", &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Todo was deleted successfully!");

    let (status, json) = json_response(&state, empty_request("GET", &path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json["message"],
        format!("Todo with id={todo_id} was not found.")
    );

    let (status, _) =
        json_response(&state, json_request("PUT", &path, json!({ "title": "Again" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_response(&state, empty_request("DELETE", &path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let item_path = api_path(&format!("/items/{item_id}"));
    let (status, json) = json_response(&state, empty_request("GET", &item_path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json["message"],
        format!("Item with id={item_id} belongs to a deleted Todo.")
    );
    let (status, _) = json_response(
        &state,
        json_request("PUT", &item_path, json!({ "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = json_response(&state, empty_request("DELETE", &item_path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = json_response(
        &state,
        empty_request("GET", &api_path(&format!("/items/todo/{todo_id}"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(Todo::find().count(&state.db).await.expect("count"), 1);
    assert_eq!(Item::find().count(&state.db).await.expect("count"), 1);
}

#[tokio::test]
async fn framework_rejections_use_the_envelope() {
    let state = app_state().await;

    let (status, json) =
        json_response(&state, empty_request("GET", &api_path("/todos/not-a-uuid"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["data"].is_null());

    let request = Request::builder()
        .method("POST")
        .uri(api_path("/todos"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .expect("request should build");
    let (status, json) = json_response(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);

    let (status, json) =
        json_response(&state, empty_request("GET", &api_path("/nowhere"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}
