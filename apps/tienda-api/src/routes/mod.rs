//! # HTTP Routes
//!
//! ```text
//! GET  /health       "OK" when the database answers, else 503
//! POST /api/orders   order intake
//! GET  /api/orders   order listing
//! ```

pub mod orders;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, Environment};
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tienda_core::{Money, Product, ProductImage};
    use tienda_db::{generate_product_id, Database, DbConfig};
    use tower::ServiceExt;

    async fn setup() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig {
            environment: Environment::Development,
            ..ApiConfig::default()
        };
        (router(AppState::new(db.clone(), config)), db)
    }

    async fn seed(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            price: Money::from_cents(price),
            images: vec![ProductImage::Structured {
                url: format!("https://cdn.example/{}.jpg", name.to_lowercase()),
                alt: None,
            }],
            stock_quantity: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn order_body(product_id: &str, quantity: i64) -> Value {
        json!({
            "customer": { "name": "Ana López", "email": "ana@example.com", "phone": "55 1234 5678" },
            "shippingAddress": {
                "street": "Av. Reforma 222",
                "city": "Ciudad de México",
                "state": "CDMX",
                "zipCode": "06600",
                "country": "MX"
            },
            "items": [{ "product": product_id, "quantity": quantity, "price": 1 }],
            "paymentMethod": "card",
            "notes": "Tocar el timbre"
        })
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = setup().await;

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_create_order_returns_201() {
        let (app, db) = setup().await;
        let mole = seed(&db, "Mole", 1000, 5).await;

        let response = app
            .oneshot(post_json(order_body(&mole.id, 3).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Order created successfully");

        let order = &body["data"];
        assert_eq!(order["orderNumber"], "ORD-000001");
        assert_eq!(order["status"], "pending");
        assert_eq!(order["paymentStatus"], "pending");
        assert_eq!(order["subtotal"], 3000);
        assert_eq!(order["tax"], 480);
        assert_eq!(order["shipping"], 15_000);
        assert_eq!(order["total"], 18_480);
        assert_eq!(order["items"][0]["unitPrice"], 1000);
        assert_eq!(order["items"][0]["imageUrl"], "https://cdn.example/mole.jpg");
        assert_eq!(order["shippingAddress"]["zipCode"], "06600");
        assert_eq!(order["billingAddress"], order["shippingAddress"]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (app, _db) = setup().await;

        let response = app
            .oneshot(post_json("{\"customer\": ".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MALFORMED_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_fields_is_400() {
        let (app, _db) = setup().await;

        let response = app
            .oneshot(post_json(json!({ "customer": { "name": "Ana" } }).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["code"], "MISSING_FIELDS");
        assert_eq!(
            body["message"],
            "Missing required fields: customer.email, shippingAddress, items, paymentMethod"
        );
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_400() {
        let (app, db) = setup().await;
        let mole = seed(&db, "Mole", 1000, 2).await;

        let response = app
            .oneshot(post_json(order_body(&mole.id, 5).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["message"], "Insufficient stock for Mole: available 2, requested 5");
    }

    #[tokio::test]
    async fn test_list_orders() {
        let (app, db) = setup().await;
        let mole = seed(&db, "Mole", 1000, 50).await;

        for qty in 1..=3 {
            let response = app
                .clone()
                .oneshot(post_json(order_body(&mole.id, qty).to_string()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(get(
                "/api/orders?page=1&limit=2&status=pending&customerEmail=ANA@example.com&sortBy=total&sortOrder=asc",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["success"], true);

        let data = &body["data"];
        assert_eq!(data["orders"].as_array().unwrap().len(), 2);
        assert_eq!(data["orders"][0]["subtotal"], 1000);
        assert_eq!(data["pagination"]["currentPage"], 1);
        assert_eq!(data["pagination"]["totalPages"], 2);
        assert_eq!(data["pagination"]["totalOrders"], 3);
        assert_eq!(data["pagination"]["limit"], 2);
        assert_eq!(data["pagination"]["hasNextPage"], true);
        assert_eq!(data["pagination"]["hasPrevPage"], false);
        assert_eq!(data["filters"]["status"], "pending");
        assert_eq!(data["filters"]["customerEmail"], "ana@example.com");
    }

    #[tokio::test]
    async fn test_list_orders_lenient_paging() {
        let (app, _db) = setup().await;

        let response = app
            .oneshot(get("/api/orders?page=zero&limit=1000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["data"]["pagination"]["currentPage"], 1);
        assert_eq!(body["data"]["pagination"]["limit"], 100);
        assert_eq!(body["data"]["orders"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_400() {
        let (app, _db) = setup().await;

        let response = app.oneshot(get("/api/orders?status=lost")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().starts_with("status must be one of"));
    }
}
