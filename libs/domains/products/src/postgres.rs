use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use crate::entity::product::{ActiveModel, Column, Entity};
use crate::error::{map_write_error, ProductError, ProductResult};
use crate::models::{AvailableProduct, CreateProduct, Product, ReplaceProduct};
use crate::query::{ProductQueryParameters, ProductSortField, SortOrder};
use crate::repository::ProductRepository;

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    /// Create a new PostgreSQL product repository
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn sort_column(field: ProductSortField) -> Column {
    match field {
        ProductSortField::Id => Column::Id,
        ProductSortField::Name => Column::Name,
        ProductSortField::Sku => Column::Sku,
        ProductSortField::Price => Column::Price,
        ProductSortField::IsAvailable => Column::IsAvailable,
        ProductSortField::CategoryId => Column::CategoryId,
        ProductSortField::Version => Column::Version,
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn filter_condition(params: &ProductQueryParameters) -> Condition {
    let mut condition = Condition::all();

    if let Some(min_price) = params.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = params.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }
    if let Some(sku) = params.sku() {
        condition = condition.add(Column::Sku.eq(sku));
    }
    if let Some(name) = params.name() {
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col(Column::Name)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    condition
}

fn list_select(params: &ProductQueryParameters) -> Select<Entity> {
    let mut query = Entity::find().filter(filter_condition(params));

    if let Some(field) = params.sort_field() {
        let order = match params.sort_order() {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        query = query.order_by(sort_column(field), order);
    }
    // Ties and unsorted listings fall back to insertion order
    query
        .order_by_asc(Column::Id)
        .offset(params.offset())
        .limit(params.size())
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, params: ProductQueryParameters) -> ProductResult<Vec<Product>> {
        let results = list_select(&params)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(results)
    }

    async fn list_available(&self) -> ProductResult<Vec<AvailableProduct>> {
        let results = Entity::find()
            .filter(Column::IsAvailable.eq(true))
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| AvailableProduct::from(Product::from(model)))
            .collect();
        Ok(results)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let result = Entity::find_by_id(id).one(&self.db).await?.map(Into::into);
        Ok(result)
    }

    async fn exists(&self, id: i32) -> ProductResult<bool> {
        let count = Entity::find()
            .filter(Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let category_id = input.category_id;
        let model: ActiveModel = input.into();
        let result: Product = model
            .insert(&self.db)
            .await
            .map_err(|err| map_write_error(err, category_id))?
            .into();

        tracing::info!(product_id = result.id, "Created product");
        Ok(result)
    }

    async fn replace(&self, input: ReplaceProduct) -> ProductResult<Product> {
        let id = input.id;
        let category_id = input.category_id;

        let mut update = Entity::update_many()
            .col_expr(Column::Name, Expr::value(input.name))
            .col_expr(Column::Sku, Expr::value(input.sku))
            .col_expr(Column::Price, Expr::value(input.price))
            .col_expr(Column::IsAvailable, Expr::value(input.is_available))
            .col_expr(Column::CategoryId, Expr::value(input.category_id))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .filter(Column::Id.eq(id));

        if let Some(version) = input.version {
            update = update.filter(Column::Version.eq(version));
        }

        let result = update
            .exec(&self.db)
            .await
            .map_err(|err| map_write_error(err, category_id))?;

        if result.rows_affected == 0 {
            return Err(ProductError::ConcurrencyConflict(id));
        }

        let updated = self
            .get_by_id(id)
            .await?
            .ok_or(ProductError::ConcurrencyConflict(id))?;

        tracing::info!(product_id = id, version = updated.version, "Replaced product");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> ProductResult<Option<Product>> {
        let txn = self.db.begin().await?;

        let Some(existing) = Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(product_id = id, "Deleted product");
        Ok(Some(existing.into()))
    }

    async fn delete_many(&self, ids: Vec<i32>) -> ProductResult<Vec<Product>> {
        let mut seen = HashSet::new();
        let ids: Vec<i32> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

        let txn = self.db.begin().await?;

        let mut found: HashMap<i32, Product> = Entity::find()
            .filter(Column::Id.is_in(ids.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|model| (model.id, model.into()))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
            return Err(ProductError::NotFound(*missing));
        }

        let result = Entity::delete_many()
            .filter(Column::Id.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(count = result.rows_affected, "Deleted products");
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }
}
