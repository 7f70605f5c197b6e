//! Query string extractor with structured rejections.

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::Query;
use serde::de::DeserializeOwned;

/// Deserializes the query string into `T`.
///
/// Repeated keys (`?ids=1&ids=2`) collect into `Vec` fields. A malformed
/// query string is rejected with a 400 `INVALID_QUERY` error body.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::QueryParams;
///
/// #[derive(serde::Deserialize)]
/// struct Bulk {
///     #[serde(default)]
///     ids: Vec<i32>,
/// }
///
/// async fn delete_many(QueryParams(bulk): QueryParams<Bulk>) -> String {
///     format!("{:?}", bulk.ids)
/// }
/// ```
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidQuery(e.to_string()))?;
        Ok(QueryParams(value))
    }
}
