use std::collections::HashMap;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::item;
use crate::db::entities::prelude::Item;

#[derive(Clone)]
pub struct ItemDao {
    db: DatabaseConnection,
}

impl DaoBase for ItemDao {
    type Entity = Item;
    const ENTITY_NAME: &'static str = "Item";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Field changes for an item; `completed_at` is `Some(None)` to clear it.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub completed_at: Option<Option<DateTimeWithTimeZone>>,
}

impl ItemDao {
    pub async fn create_item_in<C>(
        &self,
        conn: &C,
        todo_id: &Uuid,
        content: &str,
        is_completed: bool,
        completed_at: Option<DateTimeWithTimeZone>,
    ) -> DaoResult<item::Model>
    where
        C: ConnectionTrait + Sync,
    {
        let model = item::ActiveModel {
            todo_id: Set(*todo_id),
            content: Set(content.to_string()),
            is_completed: Set(is_completed),
            completed_at: Set(completed_at),
            ..Default::default()
        };
        self.create_in(conn, model).await
    }

    pub async fn find_item(&self, id: &Uuid) -> DaoResult<Option<item::Model>> {
        Item::find_by_id(*id)
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn list_for_todo(
        &self,
        todo_id: &Uuid,
        is_completed: Option<bool>,
    ) -> DaoResult<Vec<item::Model>> {
        let todo_id = *todo_id;
        self.find_iter(
            None,
            Some((item::Column::CreatedAt, Order::Asc)),
            move |query| {
                let query = query.filter(item::Column::TodoId.eq(todo_id));
                match is_completed {
                    Some(flag) => query.filter(item::Column::IsCompleted.eq(flag)),
                    None => query,
                }
            },
        )
        .collect_all()
        .await
    }

    /// Items of several todos in one pass, grouped by owner in creation order.
    pub async fn list_for_todos(
        &self,
        todo_ids: &[Uuid],
    ) -> DaoResult<HashMap<Uuid, Vec<item::Model>>> {
        if todo_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = todo_ids.to_vec();
        let items = self
            .find_iter(
                None,
                Some((item::Column::CreatedAt, Order::Asc)),
                move |query| query.filter(item::Column::TodoId.is_in(ids.clone())),
            )
            .collect_all()
            .await?;

        let mut grouped: HashMap<Uuid, Vec<item::Model>> = HashMap::new();
        for item in items {
            grouped.entry(item.todo_id).or_default().push(item);
        }
        Ok(grouped)
    }

    pub async fn update_item(&self, id: &Uuid, changes: ItemChanges) -> DaoResult<item::Model> {
        self.update(*id, move |active| {
            if let Some(content) = changes.content {
                active.content = Set(content);
            }
            if let Some(is_completed) = changes.is_completed {
                active.is_completed = Set(is_completed);
            }
            if let Some(completed_at) = changes.completed_at {
                active.completed_at = Set(completed_at);
            }
        })
        .await
    }

    pub async fn delete_item(&self, id: &Uuid) -> DaoResult<Uuid> {
        self.delete(*id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::ItemDao;
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::item;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn item_model(id: Uuid, todo_id: Uuid, content: &str) -> item::Model {
        let now = ts();
        item::Model {
            id,
            todo_id,
            content: content.to_string(),
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_for_todos_groups_rows_by_owner() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                item_model(Uuid::new_v4(), first, "milk"),
                item_model(Uuid::new_v4(), second, "report"),
                item_model(Uuid::new_v4(), first, "eggs"),
            ]])
            .into_connection();
        let dao = ItemDao::new(&db);

        let grouped = dao
            .list_for_todos(&[first, second])
            .await
            .expect("query should succeed");

        let contents: Vec<&str> = grouped[&first]
            .iter()
            .map(|item| item.content.as_str())
            .collect();
        assert_eq!(contents, vec!["milk", "eggs"]);
        assert_eq!(grouped[&second].len(), 1);
    }

    #[tokio::test]
    async fn list_for_todo_breaks_timestamp_ties_by_id() {
        let todo_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[item_model(Uuid::new_v4(), todo_id, "milk")]])
            .into_connection();
        let dao = ItemDao::new(&db);

        let items = dao
            .list_for_todo(&todo_id, None)
            .await
            .expect("query should succeed");
        assert_eq!(items.len(), 1);

        drop(dao);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(
            log.contains(r#"ORDER BY \"items\".\"created_at\" ASC, \"items\".\"id\" ASC"#),
            "unexpected query log: {log}"
        );
    }

    #[tokio::test]
    async fn list_for_todos_skips_query_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = ItemDao::new(&db);

        let grouped = dao.list_for_todos(&[]).await.expect("no query needed");
        assert!(grouped.is_empty());
    }

    #[tokio::test]
    async fn delete_item_reports_missing_row() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = ItemDao::new(&db);

        let err = dao.delete_item(&id).await.expect_err("row is missing");
        assert!(matches!(err, DaoLayerError::NotFound { entity: "Item", .. }));
    }

    #[tokio::test]
    async fn find_item_returns_row_when_present() {
        let id = Uuid::new_v4();
        let todo_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[item_model(id, todo_id, "milk")]])
            .into_connection();
        let dao = ItemDao::new(&db);

        let found = dao.find_item(&id).await.expect("query should succeed");
        assert_eq!(found.map(|item| item.todo_id), Some(todo_id));
    }
}
