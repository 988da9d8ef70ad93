//! # Repository Module
//!
//! Database repositories for order intake.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Intake / query services                                               │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(id)                                   │
//! │       │  db.orders().place(new_order)                                  │
//! │       ▼                                                                 │
//! │  ProductRepository              OrderRepository                        │
//! │  ├── get_by_id                  ├── next_order_sequence                │
//! │  ├── find_by_name               ├── place (transaction)                │
//! │  ├── decrement_stock ◄──────────┤                                      │
//! │  ├── insert / update_price      ├── get_by_id / get_by_number          │
//! │  └── deactivate                 └── find / count                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog lookups and stock
//! - [`order::OrderRepository`] - Orders, items and the order number sequence

pub mod order;
pub mod product;
