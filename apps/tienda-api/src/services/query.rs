//! # Order Query
//!
//! Paginated, filtered, sorted listing of orders. Pure read.
//!
//! ## Query Parameters
//! ```text
//! page           1-based, invalid or < 1 → 1
//! limit          1..=100, invalid → 10, out of range → clamped
//! status         one of OrderStatus, else 400
//! paymentStatus  one of PaymentStatus, else 400
//! customerEmail  exact, case-insensitive
//! orderNumber    substring, case-insensitive
//! sortBy         whitelisted field, else createdAt
//! sortOrder      asc | desc (default desc)
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use tienda_core::error::ValidationResult;
use tienda_core::{
    Order, OrderFilter, OrderSort, OrderSortField, OrderStatus, Pagination, PaymentStatus,
    SortDirection,
};

use crate::ports::OrderStore;
use crate::services::error::QueryResult;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw listing parameters as they arrive in the query string.
///
/// Everything is a string so that bad numbers degrade to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub order_number: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListOrdersParams {
    /// Requested page, at least 1.
    pub fn page(&self) -> u32 {
        non_blank(&self.page)
            .and_then(|p| p.parse::<i64>().ok())
            .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
            .unwrap_or(1)
    }

    /// Requested page size, within 1..=100.
    pub fn limit(&self) -> u32 {
        non_blank(&self.limit)
            .and_then(|l| l.parse::<i64>().ok())
            .map(|l| l.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Filters, rejecting unknown status values.
    pub fn filter(&self) -> ValidationResult<OrderFilter> {
        Ok(OrderFilter {
            status: non_blank(&self.status)
                .map(str::parse::<OrderStatus>)
                .transpose()?,
            payment_status: non_blank(&self.payment_status)
                .map(str::parse::<PaymentStatus>)
                .transpose()?,
            customer_email: non_blank(&self.customer_email).map(str::to_lowercase),
            order_number: non_blank(&self.order_number).map(str::to_string),
        })
    }

    /// Sort order. Unknown fields fall back to `createdAt`.
    pub fn sort(&self) -> OrderSort {
        OrderSort {
            field: non_blank(&self.sort_by)
                .and_then(OrderSortField::parse)
                .unwrap_or_default(),
            direction: non_blank(&self.sort_order)
                .map(SortDirection::parse)
                .unwrap_or_default(),
        }
    }
}

/// One page of orders plus what was asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
    pub filters: OrderFilter,
}

/// Order listing service.
pub struct OrderQuery<S> {
    store: S,
}

impl<S: OrderStore> OrderQuery<S> {
    pub fn new(store: S) -> Self {
        OrderQuery { store }
    }

    /// Lists one page of orders.
    pub async fn list(
        &self,
        filter: OrderFilter,
        sort: OrderSort,
        page: u32,
        limit: u32,
    ) -> QueryResult<OrderPage> {
        let total = self.store.count(&filter).await?;
        let pagination = Pagination::new(page.max(1), limit.clamp(1, MAX_PAGE_SIZE), total);

        let orders = self
            .store
            .find(&filter, sort, pagination.offset(), pagination.limit)
            .await?;

        debug!(
            page = pagination.current_page,
            returned = orders.len(),
            total = total,
            "Listed orders"
        );

        Ok(OrderPage {
            orders,
            pagination,
            filters: filter,
        })
    }

    /// Lists orders as described by raw query-string parameters.
    pub async fn list_params(&self, params: &ListOrdersParams) -> QueryResult<OrderPage> {
        let filter = params.filter()?;
        self.list(filter, params.sort(), params.page(), params.limit())
            .await
    }
}
