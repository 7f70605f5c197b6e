use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Product entity as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier, assigned by storage
    pub id: i32,
    /// Product name
    pub name: String,
    /// Stock Keeping Unit (not required to be unique)
    pub sku: String,
    /// Unit price
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    /// Whether the product can currently be ordered
    pub is_available: bool,
    /// Owning category
    pub category_id: i32,
    /// Concurrency token, incremented on every successful replace
    pub version: i32,
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Reduced view returned by the available-products listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableProduct {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[serde(default)]
    pub is_available: bool,
    pub category_id: i32,
}

/// DTO for a full-replace update.
///
/// Every field overwrites the stored value. When `version` is present the
/// write only succeeds if it still matches the stored concurrency token.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceProduct {
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[serde(default)]
    pub is_available: bool,
    pub category_id: i32,
    #[serde(default)]
    pub version: Option<i32>,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("range").with_message("price must not be negative".into()));
    }
    Ok(())
}

impl Product {
    /// Build a stored product from a create request
    pub fn new(id: i32, input: CreateProduct) -> Self {
        Self {
            id,
            name: input.name,
            sku: input.sku,
            price: input.price,
            is_available: input.is_available,
            category_id: input.category_id,
            version: 1,
        }
    }

    /// Overwrite every field with the replacement and bump the version
    pub fn replace_with(&mut self, input: ReplaceProduct) {
        self.name = input.name;
        self.sku = input.sku;
        self.price = input.price;
        self.is_available = input.is_available;
        self.category_id = input.category_id;
        self.version += 1;
    }
}

impl From<Product> for AvailableProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
        }
    }
}
