//! Order endpoints.
//!
//! ```text
//! POST /api/orders   create an order      201 {success, message, data: Order}
//! GET  /api/orders   list orders          200 {success, data: {orders, pagination, filters}}
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use tienda_core::{CreateOrderRequest, Order};

use crate::error::{ApiError, ApiResult};
use crate::services::{ListOrdersParams, OrderPage};
use crate::state::AppState;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// `POST /api/orders`
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let environment = state.config.environment;

    let Json(request) = payload.map_err(ApiError::from)?;

    let order = state
        .intake()
        .create(request)
        .await
        .map_err(|err| ApiError::from(err).for_environment(environment))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(order, "Order created successfully")),
    ))
}

/// `GET /api/orders`
pub async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<OrderPage>>> {
    let environment = state.config.environment;

    let Query(params) = params.map_err(ApiError::from)?;

    let page = state
        .query()
        .list_params(&params)
        .await
        .map_err(|err| ApiError::from(err).for_environment(environment))?;

    Ok(Json(ApiResponse::ok(page)))
}
