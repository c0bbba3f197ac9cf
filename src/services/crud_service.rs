use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::db::dao::DaoLayerError;
use crate::error::AppError;

#[derive(Clone, Copy)]
pub struct CrudErrors {
    pub entity: &'static str,
    pub create_failed: &'static str,
    pub find_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            entity: "Resource",
            create_failed: "Create failed",
            find_failed: "Find failed",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum CrudOp {
    Create,
    Find,
    List,
    Update,
    Delete,
}

/// Outcome of a partial update that may legitimately change nothing.
#[derive(Debug)]
pub enum UpdateOutcome<T> {
    Updated(T),
    NothingToUpdate,
}

pub trait CrudService {
    fn errors(&self) -> CrudErrors {
        CrudErrors::default()
    }

    fn not_found(&self, id: &Uuid) -> AppError {
        AppError::not_found(format!(
            "{} with id={id} was not found.",
            self.errors().entity
        ))
    }

    fn map_error(&self, op: CrudOp, err: DaoLayerError) -> AppError {
        let errors = self.errors();
        match err {
            DaoLayerError::Db(db_err) => {
                let context = match op {
                    CrudOp::Create => errors.create_failed,
                    CrudOp::Find | CrudOp::List => errors.find_failed,
                    CrudOp::Update => errors.update_failed,
                    CrudOp::Delete => errors.delete_failed,
                };
                AppError::internal_with_source(context, db_err)
            }
            DaoLayerError::NotFound { id, .. } => self.not_found(&id),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
        }
    }
}

/// Commits on success. On failure rolls back and hands the original error
/// back to the caller.
pub(crate) async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|err| AppError::internal_with_source("Commit failed", err))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "transaction rollback failed");
            } else {
                tracing::warn!(error = %err, "transaction rolled back");
            }
            Err(err)
        }
    }
}

/// Trimmed text, or `message` as a validation error when missing or blank.
pub(crate) fn required_text(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::bad_request(message)),
    }
}
