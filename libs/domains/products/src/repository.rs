use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{AvailableProduct, Category, CreateProduct, Product, ReplaceProduct};
use crate::query::{self, ProductQueryParameters};

/// Repository trait for Product persistence
///
/// This trait defines the data access interface for products.
/// Implementations can use different storage backends (in-memory, PostgreSQL)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products: filter, then sort, then paginate
    async fn list(&self, params: ProductQueryParameters) -> ProductResult<Vec<Product>>;

    /// Available products ordered by name
    async fn list_available(&self) -> ProductResult<Vec<AvailableProduct>>;

    /// Get a product by ID
    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Check if a product exists
    async fn exists(&self, id: i32) -> ProductResult<bool>;

    /// Create a new product
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Replace every field of an existing product.
    ///
    /// Fails with `ConcurrencyConflict` when the row is gone or its version
    /// no longer matches `input.version`.
    async fn replace(&self, input: ReplaceProduct) -> ProductResult<Product>;

    /// Delete a product, returning the removed entity
    async fn delete(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Delete several products at once; nothing is removed unless all exist
    async fn delete_many(&self, ids: Vec<i32>) -> ProductResult<Vec<Product>>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i32, Product>,
    categories: HashMap<i32, Category>,
    next_id: i32,
}

impl Store {
    fn require_category(&self, category_id: i32) -> ProductResult<()> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(ProductError::CategoryNotFound(category_id))
        }
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with the given categories already present
    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let store = Store {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            ..Default::default()
        };
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, params: ProductQueryParameters) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(query::apply(store.products.values().cloned(), &params))
    }

    async fn list_available(&self) -> ProductResult<Vec<AvailableProduct>> {
        let store = self.store.read().await;

        let mut result: Vec<Product> = store
            .products
            .values()
            .filter(|p| p.is_available)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result.into_iter().map(AvailableProduct::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn exists(&self, id: i32) -> ProductResult<bool> {
        let store = self.store.read().await;
        Ok(store.products.contains_key(&id))
    }

    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        store.require_category(input.category_id)?;

        store.next_id += 1;
        let product = Product::new(store.next_id, input);
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn replace(&self, input: ReplaceProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        let id = input.id;

        let current_version = match store.products.get(&id) {
            Some(product) => product.version,
            None => return Err(ProductError::ConcurrencyConflict(id)),
        };
        if input.version.is_some_and(|v| v != current_version) {
            return Err(ProductError::ConcurrencyConflict(id));
        }
        store.require_category(input.category_id)?;

        let product = store
            .products
            .get_mut(&id)
            .ok_or(ProductError::ConcurrencyConflict(id))?;
        product.replace_with(input);
        let updated = product.clone();

        tracing::info!(product_id = id, version = updated.version, "Replaced product");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> ProductResult<Option<Product>> {
        let mut store = self.store.write().await;

        let removed = store.products.remove(&id);
        if removed.is_some() {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }

    async fn delete_many(&self, ids: Vec<i32>) -> ProductResult<Vec<Product>> {
        let mut store = self.store.write().await;

        let mut seen = HashSet::new();
        let ids: Vec<i32> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

        if let Some(missing) = ids.iter().find(|id| !store.products.contains_key(id)) {
            return Err(ProductError::NotFound(*missing));
        }

        let removed: Vec<Product> = ids
            .iter()
            .filter_map(|id| store.products.remove(id))
            .collect();

        tracing::info!(count = removed.len(), "Deleted products");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: 1,
                name: "Active Wear - Men".to_string(),
            },
            Category {
                id: 2,
                name: "Active Wear - Women".to_string(),
            },
        ]
    }

    fn input(name: &str, cents: i64, is_available: bool) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            sku: name.to_uppercase().replace(' ', ""),
            price: Decimal::new(cents, 2),
            is_available,
            category_id: 1,
        }
    }

    fn replacement(product: &Product) -> ReplaceProduct {
        ReplaceProduct {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.price,
            is_available: product.is_available,
            category_id: product.category_id,
            version: Some(product.version),
        }
    }

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::with_categories(categories());
        repo.create(input("Polo Shirt", 3500, true)).await.unwrap();
        repo.create(input("Slicker Jacket", 12500, false)).await.unwrap();
        repo.create(input("Grunge Jeans", 6800, true)).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = InMemoryProductRepository::with_categories(categories());

        let product = repo.create(input("Polo Shirt", 3500, true)).await.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.version, 1);

        let fetched = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(fetched, Some(product));
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let repo = seeded().await;
        repo.delete(3).await.unwrap();

        let product = repo.create(input("Vest", 9500, true)).await.unwrap();
        assert_eq!(product.id, 4);
    }

    #[tokio::test]
    async fn test_create_with_unknown_category() {
        let repo = InMemoryProductRepository::with_categories(categories());

        let mut bad = input("Polo Shirt", 3500, true);
        bad.category_id = 42;

        let result = repo.create(bad).await;
        assert!(matches!(result, Err(ProductError::CategoryNotFound(42))));
    }

    #[tokio::test]
    async fn test_list_applies_query_parameters() {
        let repo = seeded().await;

        let mut params = ProductQueryParameters::new();
        params.set_sort_by("Price");
        params.set_sort_order("desc");
        params.set_size(2);

        let result = repo.list(params).await.unwrap();
        let ids: Vec<i32> = result.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_list_available_orders_by_name() {
        let repo = seeded().await;

        let result = repo.list_available().await.unwrap();
        let names: Vec<&str> = result.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Grunge Jeans", "Polo Shirt"]);
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let repo = seeded().await;
        let product = repo.get_by_id(1).await.unwrap().unwrap();

        let mut change = replacement(&product);
        change.price = Decimal::new(2999, 2);

        let updated = repo.replace(change).await.unwrap();
        assert_eq!(updated.price, Decimal::new(2999, 2));
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn test_replace_with_stale_version_conflicts() {
        let repo = seeded().await;
        let product = repo.get_by_id(1).await.unwrap().unwrap();

        repo.replace(replacement(&product)).await.unwrap();

        let stale = replacement(&product);
        let result = repo.replace(stale).await;
        assert!(matches!(result, Err(ProductError::ConcurrencyConflict(1))));

        let stored = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_replace_without_version_always_applies() {
        let repo = seeded().await;
        let product = repo.get_by_id(1).await.unwrap().unwrap();

        let mut change = replacement(&product);
        change.version = None;
        repo.replace(change.clone()).await.unwrap();
        let updated = repo.replace(change).await.unwrap();
        assert_eq!(updated.version, 3);
    }

    #[tokio::test]
    async fn test_replace_missing_row_conflicts() {
        let repo = seeded().await;
        let mut product = repo.get_by_id(1).await.unwrap().unwrap();
        product.id = 99;

        let result = repo.replace(replacement(&product)).await;
        assert!(matches!(result, Err(ProductError::ConcurrencyConflict(99))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_product() {
        let repo = seeded().await;

        let removed = repo.delete(2).await.unwrap();
        assert_eq!(removed.map(|p| p.name), Some("Slicker Jacket".to_string()));
        assert!(!repo.exists(2).await.unwrap());
        assert_eq!(repo.delete(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_many_is_all_or_nothing() {
        let repo = seeded().await;

        let result = repo.delete_many(vec![1, 99, 2]).await;
        assert!(matches!(result, Err(ProductError::NotFound(99))));
        assert!(repo.exists(1).await.unwrap());
        assert!(repo.exists(2).await.unwrap());

        let removed = repo.delete_many(vec![3, 1, 3]).await.unwrap();
        let ids: Vec<i32> = removed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(!repo.exists(1).await.unwrap());
        assert!(repo.exists(2).await.unwrap());
    }
}
