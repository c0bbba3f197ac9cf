use sea_orm::sea_query::{BinOper, Expr, ExprTrait, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo::{self, TodoStatus};

// Backslash quoting differs between backends; `!` needs none.
const LIKE_ESCAPE: char = '!';

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl DaoBase for TodoDao {
    type Entity = Todo;
    const ENTITY_NAME: &'static str = "Todo";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Conjunctive list filter. Without a status, deleted todos are skipped.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub status: Option<TodoStatus>,
    pub title: Option<String>,
}

impl TodoDao {
    pub async fn create_todo_in<C>(
        &self,
        conn: &C,
        title: &str,
        subtitle: Option<String>,
        status: TodoStatus,
    ) -> DaoResult<todo::Model>
    where
        C: ConnectionTrait + Sync,
    {
        let model = todo::ActiveModel {
            title: Set(title.to_string()),
            subtitle: Set(subtitle),
            status: Set(status.as_str().to_string()),
            ..Default::default()
        };
        self.create_in(conn, model).await
    }

    pub async fn find_todo(&self, id: &Uuid) -> DaoResult<Option<todo::Model>> {
        Todo::find_by_id(*id)
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn list_todos(
        &self,
        page: u64,
        page_size: u64,
        filter: TodoFilter,
    ) -> DaoResult<PaginatedResponse<todo::Model>> {
        self.find_counted(
            page,
            page_size,
            Some((todo::Column::CreatedAt, Order::Asc)),
            move |query| {
                let query = match filter.status {
                    Some(status) => query.filter(todo::Column::Status.eq(status.as_str())),
                    None => query.filter(todo::Column::Status.ne(TodoStatus::Deleted.as_str())),
                };
                match filter.title {
                    Some(title) => query.filter(title_contains(&title)),
                    None => query,
                }
            },
        )
        .await
    }

    pub async fn update_todo(
        &self,
        id: &Uuid,
        title: Option<String>,
        subtitle: Option<Option<String>>,
        status: Option<TodoStatus>,
    ) -> DaoResult<todo::Model> {
        self.update(*id, move |active| {
            if let Some(title) = title {
                active.title = Set(title);
            }
            if let Some(subtitle) = subtitle {
                active.subtitle = Set(subtitle);
            }
            if let Some(status) = status {
                active.status = Set(status.as_str().to_string());
            }
        })
        .await
    }

    pub async fn mark_deleted(&self, id: &Uuid) -> DaoResult<todo::Model> {
        self.update(*id, |active| {
            active.status = Set(TodoStatus::Deleted.as_str().to_string());
        })
        .await
    }
}

/// `LOWER(title) LIKE LOWER(pattern) ESCAPE '!'`. Both sides fold through the
/// same database function, so a title always matches its own substrings.
fn title_contains(needle: &str) -> Expr {
    let pattern = Expr::expr(Func::lower(Expr::val(contains_pattern(needle))))
        .binary(BinOper::Escape, Expr::Constant(LIKE_ESCAPE.into()));
    Expr::expr(Func::lower(Expr::col(todo::Column::Title))).binary(BinOper::Like, pattern)
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
