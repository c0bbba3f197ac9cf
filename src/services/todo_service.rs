use chrono::Utc;
use sea_orm::TransactionTrait;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, ItemDao, TodoDao, TodoFilter},
    db::entities::{
        item,
        todo::{self, TodoStatus},
    },
    error::AppError,
    services::crud_service::{
        CrudErrors, CrudOp, CrudService, UpdateOutcome, finalize_transaction, required_text,
    },
};

pub const TITLE_REQUIRED: &str = "Title cannot be empty!";
pub const CONTENT_REQUIRED: &str = "Content cannot be empty!";

#[derive(Debug, Clone, Default)]
pub struct NewTodoItem {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub status: Option<TodoStatus>,
    pub items: Vec<NewTodoItem>,
}

/// Partial todo update. `subtitle: Some(None)` clears the subtitle.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub subtitle: Option<Option<String>>,
    pub status: Option<TodoStatus>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TodoWithItems {
    pub todo: todo::Model,
    pub items: Vec<item::Model>,
}

#[derive(Debug)]
pub struct TodoPage {
    pub total_items: u64,
    pub todos: Vec<TodoWithItems>,
    pub current_page: u64,
    pub total_pages: u64,
}

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
    item_dao: ItemDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao, item_dao: ItemDao) -> Self {
        Self { todo_dao, item_dao }
    }

    /// Creates the todo and all of its items in one transaction. Nothing is
    /// persisted unless every item is valid and every insert succeeds.
    pub async fn create_todo_with_items(&self, input: NewTodo) -> Result<TodoWithItems, AppError> {
        let title = required_text(input.title.as_deref(), TITLE_REQUIRED)?;
        let subtitle = normalize_subtitle(input.subtitle);
        let status = input.status.unwrap_or_default();

        let txn = self
            .todo_dao
            .db()
            .begin()
            .await
            .map_err(|err| self.map_error(CrudOp::Create, DaoLayerError::Db(err)))?;

        let result: Result<TodoWithItems, AppError> = async {
            let todo = self
                .todo_dao
                .create_todo_in(&txn, &title, subtitle, status)
                .await
                .map_err(|err| self.map_error(CrudOp::Create, err))?;

            let mut items = Vec::with_capacity(input.items.len());
            for new_item in input.items {
                let content = required_text(new_item.content.as_deref(), CONTENT_REQUIRED)?;
                let is_completed = new_item.is_completed.unwrap_or(false);
                let item = self
                    .item_dao
                    .create_item_in(
                        &txn,
                        &todo.id,
                        &content,
                        is_completed,
                        completion_timestamp(is_completed),
                    )
                    .await
                    .map_err(|err| self.map_error(CrudOp::Create, err))?;
                items.push(item);
            }

            Ok(TodoWithItems { todo, items })
        }
        .await;

        let created = finalize_transaction(txn, result).await?;
        tracing::info!(
            todo_id = %created.todo.id,
            items = created.items.len(),
            "created todo"
        );
        Ok(created)
    }

    pub async fn list_todos(
        &self,
        page: u64,
        page_size: u64,
        filter: TodoFilter,
    ) -> Result<TodoPage, AppError> {
        let response = self
            .todo_dao
            .list_todos(page, page_size, filter)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))?;

        let total_items = response.total.unwrap_or_default();
        let total_pages = response.total_pages().unwrap_or_default();
        let ids: Vec<Uuid> = response.data.iter().map(|todo| todo.id).collect();
        let mut items = self
            .item_dao
            .list_for_todos(&ids)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))?;

        let todos = response
            .data
            .into_iter()
            .map(|todo| {
                let items = items.remove(&todo.id).unwrap_or_default();
                TodoWithItems { todo, items }
            })
            .collect();

        Ok(TodoPage {
            total_items,
            todos,
            current_page: page,
            total_pages,
        })
    }

    /// The todo, unless it is missing or soft-deleted.
    pub async fn require_visible(&self, id: &Uuid) -> Result<todo::Model, AppError> {
        match self.todo_dao.find_todo(id).await {
            Ok(Some(todo)) if !todo.is_deleted() => Ok(todo),
            Ok(_) => Err(self.not_found(id)),
            Err(err) => Err(self.map_error(CrudOp::Find, err)),
        }
    }

    pub async fn get_todo(&self, id: &Uuid) -> Result<TodoWithItems, AppError> {
        let todo = self.require_visible(id).await?;
        self.attach_items(todo).await
    }

    pub async fn update_todo(
        &self,
        id: &Uuid,
        mut changes: TodoChanges,
    ) -> Result<UpdateOutcome<TodoWithItems>, AppError> {
        changes.title = changes
            .title
            .take()
            .map(|title| required_text(Some(&title), TITLE_REQUIRED))
            .transpose()?;
        changes.subtitle = changes.subtitle.take().map(normalize_subtitle);

        self.require_visible(id).await?;
        if changes.is_empty() {
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        let TodoChanges {
            title,
            subtitle,
            status,
        } = changes;
        match self.todo_dao.update_todo(id, title, subtitle, status).await {
            Ok(todo) => Ok(UpdateOutcome::Updated(self.attach_items(todo).await?)),
            // removed between the visibility check and the write
            Err(DaoLayerError::NotFound { .. }) => Ok(UpdateOutcome::NothingToUpdate),
            Err(err) => Err(self.map_error(CrudOp::Update, err)),
        }
    }

    /// Soft delete: flips the status and leaves item rows in place.
    pub async fn delete_todo(&self, id: &Uuid) -> Result<(), AppError> {
        self.require_visible(id).await?;
        match self.todo_dao.mark_deleted(id).await {
            Ok(_) => {}
            Err(DaoLayerError::NotFound { .. }) => {
                return Err(AppError::not_found(format!(
                    "Cannot delete Todo with id={id}. Maybe Todo was not found!"
                )));
            }
            Err(err) => return Err(self.map_error(CrudOp::Delete, err)),
        }
        tracing::info!(todo_id = %id, "soft-deleted todo");
        Ok(())
    }

    async fn attach_items(&self, todo: todo::Model) -> Result<TodoWithItems, AppError> {
        let items = self
            .item_dao
            .list_for_todo(&todo.id, None)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok(TodoWithItems { todo, items })
    }
}

impl CrudService for TodoService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            entity: "Todo",
            create_failed: "Some error occurred while creating the Todo",
            find_failed: "Some error occurred while retrieving todos",
            update_failed: "Error updating Todo",
            delete_failed: "Could not delete Todo",
        }
    }
}

/// `completedAt` for a freshly written completion flag.
pub(crate) fn completion_timestamp(is_completed: bool) -> Option<DateTimeWithTimeZone> {
    is_completed.then(|| Utc::now().fixed_offset())
}

fn normalize_subtitle(subtitle: Option<String>) -> Option<String> {
    subtitle
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
