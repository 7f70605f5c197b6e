use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("Path id {path} does not match body id {body}")]
    IdMismatch { path: i32, body: i32 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(i32),

    #[error("Product {0} was modified concurrently")]
    ConcurrencyConflict(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::IdMismatch { path, body } => AppError::BadRequest(format!(
                "Path id {} does not match body id {}",
                path, body
            )),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::CategoryNotFound(id) => {
                AppError::UnprocessableEntity(format!("Category {} does not exist", id))
            }
            ProductError::ConcurrencyConflict(id) => {
                AppError::Conflict(format!("Product {} was modified concurrently", id))
            }
            ProductError::Database(msg) => AppError::Database(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}

/// Map a write error, turning a foreign key violation into `CategoryNotFound`
pub(crate) fn map_write_error(err: DbErr, category_id: i32) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ProductError::CategoryNotFound(category_id),
        _ => ProductError::from(err),
    }
}
