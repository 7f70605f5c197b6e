//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::server::health_router;

use crate::state::AppState;

/// Routes mounted under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// Liveness and readiness probes, mounted at the root
pub fn probes(state: &AppState) -> Router {
    health_router(state.config.app).merge(health::router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum_helpers::create_router_with_cors;
    use core_config::{server::ServerConfig, AppInfo};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config {
            app: AppInfo {
                name: "products_api",
                version: "0.1.0",
            },
            server: ServerConfig::default(),
            environment: Environment::Development,
            database: None,
            shutdown_timeout: Duration::from_secs(1),
        };
        AppState::new(config, None)
    }

    fn app(state: &AppState) -> Router {
        create_router_with_cors::<crate::openapi::ApiDoc>(
            routes(state),
            axum_helpers::http::create_cors_layer(vec![]),
        )
        .merge(probes(state))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_app_info() {
        let state = test_state();
        let (status, body) = send(app(&state), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["name"], "products_api");
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let state = test_state();
        let (status, body) = send(app(&state), get("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["storage"], "in-memory");
    }

    #[tokio::test]
    async fn test_seeded_category_accepts_new_product() {
        let state = test_state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/products")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "name": "Grunge Skater Jeans",
                    "sku": "AWMGSJ",
                    "price": "68.00",
                    "isAvailable": true,
                    "categoryId": 1
                })
                .to_string(),
            ))
            .unwrap();

        let (status, created) = send(app(&state), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["version"], 1);

        // A second router over the same state sees the stored product
        let uri = format!("/api/products/{}", created["id"]);
        let (status, fetched) = send(app(&state), get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["sku"], "AWMGSJ");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_body() {
        let state = test_state();
        let (status, body) = send(app(&state), get("/api/orders")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
