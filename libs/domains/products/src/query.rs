//! Listing pipeline: parameters, filtering, sorting, and pagination.
//!
//! [`ProductQueryParameters`] holds the normalized list options. Its setters
//! are fail-open: out-of-range sizes are clamped and unknown sort directions
//! are ignored, never rejected. The free functions apply the same pipeline
//! to an in-memory candidate collection; the Postgres repository translates
//! the parameters into SQL instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::models::Product;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_SORT_BY: &str = "Id";
/// Largest offset a SQL backend can bind (`OFFSET` is a signed bigint)
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Sort direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Fields a client may sort by.
///
/// Each variant accepts the entity property name and the camelCase wire
/// name. Anything else does not resolve and leaves the listing unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum ProductSortField {
    #[strum(serialize = "Id", serialize = "id")]
    Id,
    #[strum(serialize = "Name", serialize = "name")]
    Name,
    #[strum(serialize = "Sku", serialize = "sku")]
    Sku,
    #[strum(serialize = "Price", serialize = "price")]
    Price,
    #[strum(serialize = "IsAvailable", serialize = "isAvailable")]
    IsAvailable,
    #[strum(serialize = "CategoryId", serialize = "categoryId")]
    CategoryId,
    #[strum(serialize = "Version", serialize = "version")]
    Version,
}

impl ProductSortField {
    /// Look up a client-supplied field name in the allowlist
    pub fn resolve(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Compare two products on this field, ascending
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Sku => a.sku.cmp(&b.sku),
            Self::Price => a.price.cmp(&b.price),
            Self::IsAvailable => a.is_available.cmp(&b.is_available),
            Self::CategoryId => a.category_id.cmp(&b.category_id),
            Self::Version => a.version.cmp(&b.version),
        }
    }
}

/// Normalized list options.
///
/// Invariants: `page >= 1`, `1 <= size <= MAX_PAGE_SIZE`, `sku` and `name`
/// are never empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQueryParameters {
    page: u64,
    size: u64,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    sku: Option<String>,
    name: Option<String>,
    sort_by: String,
    sort_order: SortOrder,
}

impl Default for ProductQueryParameters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            min_price: None,
            max_price: None,
            sku: None,
            name: None,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ProductQueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Page numbers below 1 clamp to 1
    pub fn set_page(&mut self, page: i64) {
        self.page = u64::try_from(page).unwrap_or(0).max(1);
    }

    /// Sizes above `MAX_PAGE_SIZE` clamp down; sizes below 1 clamp to 1
    pub fn set_size(&mut self, size: i64) {
        self.size = u64::try_from(size).unwrap_or(0).clamp(1, MAX_PAGE_SIZE);
    }

    pub fn set_sku(&mut self, sku: Option<String>) {
        self.sku = sku.filter(|s| !s.is_empty());
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name.filter(|s| !s.is_empty());
    }

    pub fn set_sort_by(&mut self, sort_by: impl Into<String>) {
        self.sort_by = sort_by.into();
    }

    /// Only `"asc"` and `"desc"` are accepted; any other value keeps the
    /// current direction.
    pub fn set_sort_order(&mut self, sort_order: &str) {
        if let Ok(order) = sort_order.parse::<SortOrder>() {
            self.sort_order = order;
        }
    }

    /// Allowlisted sort field, if `sort_by` names one
    pub fn sort_field(&self) -> Option<ProductSortField> {
        if self.sort_by.is_empty() {
            return None;
        }
        ProductSortField::resolve(&self.sort_by)
    }

    /// Number of rows skipped before the current page, capped at [`MAX_OFFSET`]
    pub fn offset(&self) -> u64 {
        self.size.saturating_mul(self.page - 1).min(MAX_OFFSET)
    }

    /// Whether a product passes every active filter stage
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }
        if let Some(sku) = self.sku() {
            if product.sku != sku {
                return false;
            }
        }
        if let Some(name) = self.name() {
            if !product.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Treats an empty query value (`?page=`) as absent instead of a parse error
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Query string accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Minimum price (inclusive)
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Maximum price (inclusive)
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Exact SKU match
    pub sku: Option<String>,
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Field to sort by (e.g. `Id`, `name`, `price`); unknown fields are ignored
    pub sort_by: Option<String>,
    /// `asc` or `desc`; any other value is ignored
    pub sort_order: Option<String>,
    /// Page number, starting at 1
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    /// Page size, at most 100
    #[serde(default, deserialize_with = "empty_as_none")]
    pub size: Option<i64>,
}

impl From<ListProductsQuery> for ProductQueryParameters {
    fn from(query: ListProductsQuery) -> Self {
        let mut params = ProductQueryParameters::new();
        params.min_price = query.min_price;
        params.max_price = query.max_price;
        params.set_sku(query.sku);
        params.set_name(query.name);
        if let Some(sort_by) = query.sort_by {
            params.set_sort_by(sort_by);
        }
        if let Some(sort_order) = query.sort_order {
            params.set_sort_order(&sort_order);
        }
        if let Some(page) = query.page {
            params.set_page(page);
        }
        if let Some(size) = query.size {
            params.set_size(size);
        }
        params
    }
}

/// Keep the products that pass every active filter stage
pub fn filter_products<I>(products: I, params: &ProductQueryParameters) -> Vec<Product>
where
    I: IntoIterator<Item = Product>,
{
    products.into_iter().filter(|p| params.matches(p)).collect()
}

/// Sort in place; `None` leaves the order untouched
pub fn sort_products(products: &mut [Product], field: Option<ProductSortField>, order: SortOrder) {
    let Some(field) = field else {
        return;
    };
    match order {
        SortOrder::Asc => products.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Desc => products.sort_by(|a, b| field.compare(b, a)),
    }
}

/// Offset pagination; pages past the end are empty
pub fn paginate(products: Vec<Product>, params: &ProductQueryParameters) -> Vec<Product> {
    let skip = usize::try_from(params.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(params.size()).unwrap_or(usize::MAX);
    products.into_iter().skip(skip).take(take).collect()
}

/// Filter, sort, and paginate a candidate collection
pub fn apply<I>(products: I, params: &ProductQueryParameters) -> Vec<Product>
where
    I: IntoIterator<Item = Product>,
{
    let mut filtered = filter_products(products, params);
    sort_products(&mut filtered, params.sort_field(), params.sort_order());
    paginate(filtered, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, name: &str, sku: &str, cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            sku: sku.to_string(),
            price: Decimal::new(cents, 2),
            is_available: id % 2 == 0,
            category_id: 1 + id % 3,
            version: 1,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Grunge Skater Jeans", "AWMGSJ", 6800),
            product(2, "Polo Shirt", "AWMPS", 3500),
            product(3, "Skater Graphic T-Shirt", "AWMSGT", 3300),
            product(4, "Slicker Jacket", "AWMSJ", 12500),
            product(5, "Thermal Fleece Jacket", "AWMTFJ", 6000),
            product(6, "Unisex Thermal Vest", "AWMUTV", 9500),
            product(7, "V-Neck Pullover", "AWMVNP", 6500),
            product(8, "V-Neck Sweater", "AWMVNS", 6500),
            product(9, "V-Neck T-Shirt", "AWMVNT", 1700),
            product(10, "Bamboo Thermal Ski Coat", "AWWBTSC", 9900),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_defaults() {
        let params = ProductQueryParameters::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.size(), 50);
        assert_eq!(params.sort_by(), "Id");
        assert_eq!(params.sort_order(), SortOrder::Asc);
        assert_eq!(params.sort_field(), Some(ProductSortField::Id));
    }

    #[test]
    fn test_size_is_clamped_to_max() {
        let mut params = ProductQueryParameters::new();
        for (requested, expected) in [(1, 1), (50, 50), (100, 100), (101, 100), (10_000, 100)] {
            params.set_size(requested);
            assert_eq!(params.size(), expected, "requested size {}", requested);
        }
    }

    #[test]
    fn test_non_positive_size_and_page_clamp_to_one() {
        let mut params = ProductQueryParameters::new();
        params.set_size(0);
        assert_eq!(params.size(), 1);
        params.set_size(-20);
        assert_eq!(params.size(), 1);
        params.set_page(0);
        assert_eq!(params.page(), 1);
        params.set_page(-3);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_sort_order_accepts_only_known_literals() {
        let mut params = ProductQueryParameters::new();

        params.set_sort_order("desc");
        assert_eq!(params.sort_order(), SortOrder::Desc);

        for invalid in ["", "DESC", "Asc", "ascending", "random"] {
            params.set_sort_order(invalid);
            assert_eq!(params.sort_order(), SortOrder::Desc, "value {:?}", invalid);
        }

        params.set_sort_order("asc");
        assert_eq!(params.sort_order(), SortOrder::Asc);

        params.set_sort_order("dsc");
        assert_eq!(params.sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_sort_field_allowlist() {
        assert_eq!(ProductSortField::resolve("Price"), Some(ProductSortField::Price));
        assert_eq!(ProductSortField::resolve("price"), Some(ProductSortField::Price));
        assert_eq!(
            ProductSortField::resolve("isAvailable"),
            Some(ProductSortField::IsAvailable)
        );
        assert_eq!(ProductSortField::resolve("PRICE"), None);
        assert_eq!(ProductSortField::resolve("Category"), None);
        assert_eq!(ProductSortField::resolve("password"), None);
    }

    #[test]
    fn test_empty_sku_and_name_are_absent() {
        let mut params = ProductQueryParameters::new();
        params.set_sku(Some(String::new()));
        params.set_name(Some(String::new()));
        assert_eq!(params.sku(), None);
        assert_eq!(params.name(), None);
        assert_eq!(filter_products(catalog(), &params).len(), 10);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let mut params = ProductQueryParameters::new();
        params.min_price = Some(Decimal::new(6500, 2));
        params.max_price = Some(Decimal::new(9500, 2));

        let result = filter_products(catalog(), &params);
        assert_eq!(ids(&result), vec![1, 6, 7, 8]);
    }

    #[test]
    fn test_sku_match_is_exact_and_case_sensitive() {
        let mut params = ProductQueryParameters::new();
        params.set_sku(Some("AWMPS".to_string()));
        assert_eq!(ids(&filter_products(catalog(), &params)), vec![2]);

        params.set_sku(Some("awmps".to_string()));
        assert!(filter_products(catalog(), &params).is_empty());

        params.set_sku(Some("AWM".to_string()));
        assert!(filter_products(catalog(), &params).is_empty());
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let mut params = ProductQueryParameters::new();
        params.set_name(Some("v-NECK".to_string()));
        assert_eq!(ids(&filter_products(catalog(), &params)), vec![7, 8, 9]);
    }

    #[test]
    fn test_filtering_is_monotonic() {
        let base = ProductQueryParameters::new();
        let baseline = filter_products(catalog(), &base).len();

        let mut with_min = base.clone();
        with_min.min_price = Some(Decimal::new(5000, 2));
        let after_min = filter_products(catalog(), &with_min).len();
        assert!(after_min <= baseline);

        let mut with_name = with_min.clone();
        with_name.set_name(Some("jacket".to_string()));
        let after_name = filter_products(catalog(), &with_name).len();
        assert!(after_name <= after_min);

        let mut with_sku = with_name.clone();
        with_sku.set_sku(Some("AWMSJ".to_string()));
        let after_sku = filter_products(catalog(), &with_sku).len();
        assert!(after_sku <= after_name);
        assert_eq!(after_sku, 1);
    }

    #[test]
    fn test_sort_descending_by_price() {
        let mut params = ProductQueryParameters::new();
        params.set_sort_by("Price");
        params.set_sort_order("desc");

        let result = apply(catalog(), &params);
        let prices: Vec<Decimal> = result.iter().map(|p| p.price).collect();
        let mut expected = prices.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(prices, expected);
        assert_eq!(result[0].id, 4);
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let mut params = ProductQueryParameters::new();
        params.set_sort_by("name");

        let result = apply(catalog(), &params);
        assert_eq!(result.first().map(|p| p.id), Some(10));
        assert_eq!(result.last().map(|p| p.id), Some(9));
    }

    #[test]
    fn test_unknown_sort_field_keeps_element_set() {
        let mut params = ProductQueryParameters::new();
        params.set_sort_by("DoesNotExist");
        assert_eq!(params.sort_field(), None);

        let mut sorted = ids(&apply(catalog(), &params));
        sorted.sort();
        assert_eq!(sorted, ids(&catalog()));
    }

    #[test]
    fn test_unknown_sort_field_leaves_order_untouched() {
        let mut shuffled = catalog();
        shuffled.reverse();
        let before = ids(&shuffled);

        sort_products(&mut shuffled, ProductSortField::resolve("nope"), SortOrder::Asc);
        assert_eq!(ids(&shuffled), before);
    }

    #[test]
    fn test_pagination_skips_and_takes() {
        let mut params = ProductQueryParameters::new();
        params.set_size(3);
        params.set_page(2);

        assert_eq!(params.offset(), 3);
        assert_eq!(ids(&apply(catalog(), &params)), vec![4, 5, 6]);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let mut params = ProductQueryParameters::new();
        params.set_size(5);
        params.set_page(3);
        assert!(apply(catalog(), &params).is_empty());

        params.set_page(i64::MAX);
        assert!(apply(catalog(), &params).is_empty());
    }

    #[test]
    fn test_offset_is_capped_for_huge_pages() {
        let mut params = ProductQueryParameters::new();
        params.set_size(100);
        params.set_page(100_000_000_000_000_000);
        assert_eq!(params.offset(), MAX_OFFSET);

        params.set_page(i64::MAX);
        assert_eq!(params.offset(), MAX_OFFSET);
        assert!(i64::try_from(params.offset()).is_ok());
    }

    #[test]
    fn test_concatenated_pages_reproduce_sequence() {
        let mut full_params = ProductQueryParameters::new();
        full_params.set_sort_by("Price");
        full_params.set_size(100);
        let full = apply(catalog(), &full_params);

        for size in [1, 3, 4, 7, 10, 100] {
            let mut params = full_params.clone();
            params.set_size(size);

            let mut collected = Vec::new();
            let mut page = 1;
            loop {
                params.set_page(page);
                let chunk = apply(catalog(), &params);
                if chunk.is_empty() {
                    break;
                }
                assert!(chunk.len() as i64 <= size);
                collected.extend(chunk);
                page += 1;
            }
            assert_eq!(ids(&collected), ids(&full), "page size {}", size);
        }
    }

    #[test]
    fn test_list_query_goes_through_setters() {
        let query = ListProductsQuery {
            min_price: Some(Decimal::new(10, 0)),
            max_price: None,
            sku: Some(String::new()),
            name: Some("shirt".to_string()),
            sort_by: Some("Name".to_string()),
            sort_order: Some("sideways".to_string()),
            page: Some(0),
            size: Some(500),
        };

        let params = ProductQueryParameters::from(query);
        assert_eq!(params.page(), 1);
        assert_eq!(params.size(), 100);
        assert_eq!(params.sku(), None);
        assert_eq!(params.name(), Some("shirt"));
        assert_eq!(params.sort_field(), Some(ProductSortField::Name));
        assert_eq!(params.sort_order(), SortOrder::Asc);
        assert_eq!(params.min_price, Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_empty_query_values_are_absent() {
        let query: ListProductsQuery = serde_json::from_value(serde_json::json!({
            "minPrice": "",
            "maxPrice": " ",
            "page": "",
            "size": ""
        }))
        .unwrap();

        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, None);
        assert_eq!(query.page, None);
        assert_eq!(query.size, None);
    }

    #[test]
    fn test_query_values_parse_from_strings() {
        let query: ListProductsQuery = serde_json::from_value(serde_json::json!({
            "minPrice": "12.50",
            "page": "3",
            "size": "20"
        }))
        .unwrap();

        assert_eq!(query.min_price, Some(Decimal::new(1250, 2)));
        assert_eq!(query.page, Some(3));
        assert_eq!(query.size, Some(20));

        let bad = serde_json::json!({ "page": "abc" });
        assert!(serde_json::from_value::<ListProductsQuery>(bad).is_err());
    }
}
