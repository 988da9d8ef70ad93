//! Shared application state.

use std::sync::Arc;

use tienda_db::{Database, OrderRepository, ProductRepository};

use crate::config::ApiConfig;
use crate::services::{OrderIntake, OrderQuery};

/// State handed to every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// Intake service over the SQLite catalog and order store.
    pub fn intake(&self) -> OrderIntake<ProductRepository, OrderRepository> {
        OrderIntake::new(
            self.db.products(),
            self.db.orders(),
            self.config.jurisdiction.clone(),
        )
    }

    pub fn query(&self) -> OrderQuery<OrderRepository> {
        OrderQuery::new(self.db.orders())
    }
}
