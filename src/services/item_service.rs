use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, ItemChanges, ItemDao, TodoDao},
    db::entities::{item, todo},
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudOp, CrudService, UpdateOutcome, required_text},
        todo_service::{CONTENT_REQUIRED, TodoService, completion_timestamp},
    },
};

pub const TODO_ID_REQUIRED: &str = "TodoId is required!";

#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub todo_id: Option<Uuid>,
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.is_completed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ItemWithTodo {
    pub item: item::Model,
    pub todo: todo::Model,
}

#[derive(Clone)]
pub struct ItemService {
    item_dao: ItemDao,
    todo_dao: TodoDao,
    todos: TodoService,
}

impl ItemService {
    pub fn new(item_dao: ItemDao, todo_dao: TodoDao, todos: TodoService) -> Self {
        Self {
            item_dao,
            todo_dao,
            todos,
        }
    }

    pub async fn create_item(&self, input: NewItem) -> Result<item::Model, AppError> {
        let content = required_text(input.content.as_deref(), CONTENT_REQUIRED)?;
        let todo_id = input
            .todo_id
            .ok_or_else(|| AppError::bad_request(TODO_ID_REQUIRED))?;
        self.todos.require_visible(&todo_id).await?;

        let is_completed = input.is_completed.unwrap_or(false);
        let item = self
            .item_dao
            .create_item_in(
                self.item_dao.db(),
                &todo_id,
                &content,
                is_completed,
                completion_timestamp(is_completed),
            )
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        tracing::debug!(item_id = %item.id, todo_id = %todo_id, "created item");
        Ok(item)
    }

    /// Items of a visible todo in creation order, optionally by completion.
    pub async fn list_items(
        &self,
        todo_id: &Uuid,
        is_completed: Option<bool>,
    ) -> Result<Vec<item::Model>, AppError> {
        self.todos.require_visible(todo_id).await?;
        self.item_dao
            .list_for_todo(todo_id, is_completed)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get_item(&self, id: &Uuid) -> Result<ItemWithTodo, AppError> {
        self.require_visible(id).await
    }

    pub async fn update_item(
        &self,
        id: &Uuid,
        mut patch: ItemPatch,
    ) -> Result<UpdateOutcome<item::Model>, AppError> {
        patch.content = patch
            .content
            .take()
            .map(|content| required_text(Some(&content), CONTENT_REQUIRED))
            .transpose()?;

        let current = self.require_visible(id).await?.item;
        if patch.is_empty() {
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        let completed_at = patch
            .is_completed
            .filter(|flag| *flag != current.is_completed)
            .map(completion_timestamp);
        let changes = ItemChanges {
            content: patch.content,
            is_completed: patch.is_completed,
            completed_at,
        };

        match self.item_dao.update_item(id, changes).await {
            Ok(item) => Ok(UpdateOutcome::Updated(item)),
            Err(DaoLayerError::NotFound { .. }) => Ok(UpdateOutcome::NothingToUpdate),
            Err(err) => Err(self.map_error(CrudOp::Update, err)),
        }
    }

    pub async fn delete_item(&self, id: &Uuid) -> Result<(), AppError> {
        self.require_visible(id).await?;
        match self.item_dao.delete_item(id).await {
            Ok(_) => {}
            Err(DaoLayerError::NotFound { .. }) => {
                return Err(AppError::not_found(format!(
                    "Cannot delete Item with id={id}. Maybe Item was not found!"
                )));
            }
            Err(err) => return Err(self.map_error(CrudOp::Delete, err)),
        }
        tracing::info!(item_id = %id, "deleted item");
        Ok(())
    }

    /// The item and its parent, unless the item is missing or the parent is
    /// gone or soft-deleted.
    async fn require_visible(&self, id: &Uuid) -> Result<ItemWithTodo, AppError> {
        let item = self
            .item_dao
            .find_item(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?
            .ok_or_else(|| self.not_found(id))?;

        let parent = self
            .todo_dao
            .find_todo(&item.todo_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        match parent {
            Some(todo) if !todo.is_deleted() => Ok(ItemWithTodo { item, todo }),
            _ => Err(AppError::not_found(format!(
                "Item with id={id} belongs to a deleted Todo."
            ))),
        }
    }
}

impl CrudService for ItemService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            entity: "Item",
            create_failed: "Some error occurred while creating the Item",
            find_failed: "Some error occurred while retrieving items",
            update_failed: "Error updating Item",
            delete_failed: "Could not delete Item",
        }
    }
}
