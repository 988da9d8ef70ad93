//! # Services
//!
//! Order intake and order query, written against the collaborator traits in
//! [`crate::ports`].
//!
//! - [`resolver`] - cart line → catalog snapshot
//! - [`allocator`] - order numbers
//! - [`intake`] - the order creation pipeline
//! - [`query`] - paginated listing

pub mod allocator;
pub mod error;
pub mod intake;
pub mod query;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use allocator::OrderNumberAllocator;
pub use error::{IntakeError, IntakeResult, QueryError, QueryResult};
pub use intake::OrderIntake;
pub use query::{ListOrdersParams, OrderPage, OrderQuery};
pub use resolver::CatalogResolver;
