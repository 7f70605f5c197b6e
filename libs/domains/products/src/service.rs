//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{AvailableProduct, CreateProduct, Product, ReplaceProduct};
use crate::query::ProductQueryParameters;
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// The service layer handles validation, the update precondition checks,
/// and orchestrates repository operations.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List products with filtering, sorting and pagination
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        params: ProductQueryParameters,
    ) -> ProductResult<Vec<Product>> {
        self.repository.list(params).await
    }

    /// List available products ordered by name
    #[instrument(skip(self))]
    pub async fn list_available_products(&self) -> ProductResult<Vec<AvailableProduct>> {
        self.repository.list_available().await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    /// Replace an existing product.
    ///
    /// A version conflict is resolved by checking existence: a vanished row
    /// is reported as not found, otherwise the request succeeds without
    /// retrying the write.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i32, input: ReplaceProduct) -> ProductResult<()> {
        if input.id != id {
            return Err(ProductError::IdMismatch {
                path: id,
                body: input.id,
            });
        }

        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        match self.repository.replace(input).await {
            Ok(_) => Ok(()),
            Err(ProductError::ConcurrencyConflict(_)) => {
                if self.repository.exists(id).await? {
                    tracing::warn!(product_id = id, "Concurrent update detected, write dropped");
                    Ok(())
                } else {
                    Err(ProductError::NotFound(id))
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Delete a product, returning the removed entity
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .delete(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Delete several products; fails without deleting anything if one is missing
    #[instrument(skip(self))]
    pub async fn delete_products(&self, ids: Vec<i32>) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Err(ProductError::Validation(
                "at least one id is required".to_string(),
            ));
        }

        self.repository.delete_many(ids).await
    }
}
