//! Application state management

use database::postgres::DatabaseConnection;
use domain_products::{Category, InMemoryProductRepository};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present when the service runs against PostgreSQL
    pub db: Option<DatabaseConnection>,
    pub in_memory: InMemoryProductRepository,
}

impl AppState {
    pub fn new(config: Config, db: Option<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            in_memory: InMemoryProductRepository::with_categories(seed_categories()),
        }
    }

    /// Human-readable name of the active storage backend
    pub fn storage(&self) -> &'static str {
        if self.db.is_some() {
            "postgres"
        } else {
            "in-memory"
        }
    }
}

/// Categories available to the in-memory store at startup
pub fn seed_categories() -> Vec<Category> {
    [
        "Active Wear - Men",
        "Active Wear - Women",
        "Mineral Water",
        "Publications",
        "Supplements",
    ]
    .into_iter()
    .zip(1..)
    .map(|(name, id)| Category {
        id,
        name: name.to_string(),
    })
    .collect()
}
