use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::entities::{item, todo},
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        crud_service::UpdateOutcome,
        item_service::{ItemPatch, ItemService, ItemWithTodo, NewItem},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub todo_id: Option<Uuid>,
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsQuery {
    pub is_completed: Option<String>,
}

impl ListItemsQuery {
    /// `"true"` selects completed items; any other supplied value the rest.
    fn completion_filter(&self) -> Option<bool> {
        self.is_completed.as_deref().map(|value| value == "true")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub todo_id: Uuid,
    pub content: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct TodoSummary {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ItemDetailResponse {
    #[serde(flatten)]
    pub item: ItemResponse,
    pub todo: TodoSummary,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/items", post(create_item))
        .route("/items/todo/{todo_id}", get(list_items))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

fn item_service(state: &AppState) -> ItemService {
    ServiceContext::from_state(state).item()
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateItemRequest>,
) -> ApiResult<ItemResponse> {
    let item = item_service(state.as_ref())
        .create_item(NewItem {
            todo_id: body.todo_id,
            content: body.content,
            is_completed: body.is_completed,
        })
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "Item was created successfully.", item.into())
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
    Query(query): Query<ListItemsQuery>,
) -> ApiResult<Vec<ItemResponse>> {
    let items = item_service(state.as_ref())
        .list_items(&todo_id, query.completion_filter())
        .await?;
    JsonApiResponse::ok(items.into_iter().map(ItemResponse::from).collect())
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<ItemDetailResponse> {
    let found = item_service(state.as_ref()).get_item(&id).await?;
    JsonApiResponse::ok(found.into())
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> ApiResult<Option<ItemResponse>> {
    let patch = ItemPatch {
        content: body.content,
        is_completed: body.is_completed,
    };
    match item_service(state.as_ref()).update_item(&id, patch).await? {
        UpdateOutcome::Updated(item) => JsonApiResponse::with_status(
            StatusCode::OK,
            "Item was updated successfully.",
            Some(item.into()),
        ),
        UpdateOutcome::NothingToUpdate => JsonApiResponse::with_status(
            StatusCode::OK,
            format!(
                "Cannot update Item with id={id}. Maybe Item was not found or req.body is empty!"
            ),
            None,
        ),
    }
}

async fn delete_item(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<()> {
    item_service(state.as_ref()).delete_item(&id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "Item was deleted successfully!", ())
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            todo_id: model.todo_id,
            content: model.content,
            is_completed: model.is_completed,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<todo::Model> for TodoSummary {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            subtitle: model.subtitle,
            status: model.status,
        }
    }
}

impl From<ItemWithTodo> for ItemDetailResponse {
    fn from(found: ItemWithTodo) -> Self {
        Self {
            item: found.item.into(),
            todo: found.todo.into(),
        }
    }
}
