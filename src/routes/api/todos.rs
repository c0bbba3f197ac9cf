use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
    db::{dao::TodoFilter, entities::todo::TodoStatus},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::api::items::ItemResponse,
    services::{
        ServiceContext,
        crud_service::UpdateOutcome,
        todo_service::{NewTodo, NewTodoItem, TodoChanges, TodoPage, TodoService, TodoWithItems},
    },
    state::AppState,
};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoItemRequest {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateTodoItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    /// Absent leaves the subtitle alone; `null` clears it.
    #[serde(default, deserialize_with = "present_or_null")]
    pub subtitle: Option<Option<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub status: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPageResponse {
    pub total_items: u64,
    pub todos: Vec<TodoResponse>,
    pub current_page: u64,
    pub total_pages: u64,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

fn todo_service(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let input = NewTodo {
        title: body.title,
        subtitle: body.subtitle,
        status: parse_status(body.status.as_deref())?,
        items: body
            .items
            .into_iter()
            .map(|item| NewTodoItem {
                content: item.content,
                is_completed: item.is_completed,
            })
            .collect(),
    };
    let created = todo_service(state.as_ref())
        .create_todo_with_items(input)
        .await?;
    JsonApiResponse::with_status(
        StatusCode::CREATED,
        "Todo was created successfully.",
        created.into(),
    )
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTodosQuery>,
) -> ApiResult<TodoPageResponse> {
    let filter = TodoFilter {
        status: parse_status(query.status.as_deref())?,
        title: query.title.filter(|title| !title.is_empty()),
    };
    let page = todo_service(state.as_ref())
        .list_todos(
            query.page.unwrap_or(DEFAULT_PAGE),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
            filter,
        )
        .await?;
    JsonApiResponse::ok(page.into())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TodoResponse> {
    let todo = todo_service(state.as_ref()).get_todo(&id).await?;
    JsonApiResponse::ok(todo.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<Option<TodoResponse>> {
    let changes = TodoChanges {
        title: body.title,
        subtitle: body.subtitle,
        status: parse_status(body.status.as_deref())?,
    };
    match todo_service(state.as_ref()).update_todo(&id, changes).await? {
        UpdateOutcome::Updated(todo) => JsonApiResponse::with_status(
            StatusCode::OK,
            "Todo was updated successfully.",
            Some(todo.into()),
        ),
        UpdateOutcome::NothingToUpdate => JsonApiResponse::with_status(
            StatusCode::OK,
            format!(
                "Cannot update Todo with id={id}. Maybe Todo was not found or req.body is empty!"
            ),
            None,
        ),
    }
}

async fn delete_todo(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<()> {
    todo_service(state.as_ref()).delete_todo(&id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "Todo was deleted successfully!", ())
}

fn parse_status(value: Option<&str>) -> Result<Option<TodoStatus>, AppError> {
    value
        .map(|value| value.parse::<TodoStatus>().map_err(AppError::bad_request))
        .transpose()
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<TodoWithItems> for TodoResponse {
    fn from(value: TodoWithItems) -> Self {
        let TodoWithItems { todo, items } = value;
        Self {
            id: todo.id,
            title: todo.title,
            subtitle: todo.subtitle,
            status: todo.status,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            items: items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

impl From<TodoPage> for TodoPageResponse {
    fn from(page: TodoPage) -> Self {
        Self {
            total_items: page.total_items,
            todos: page.todos.into_iter().map(TodoResponse::from).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}
