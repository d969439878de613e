//! Rocket Shoes Storefront library.
//!
//! Provides the shopper cart as a library so any UI layer (the bundled CLI,
//! a web frontend, tests) can drive it.
//!
//! # Modules
//!
//! - [`cart_store`] - `CartStore`: add, remove, and update line items
//! - [`stock`] - Stock/product API seam and its HTTP client
//! - [`storage`] - Durable key-value storage for the serialized cart
//! - [`notify`] - User-facing notices and the sinks that receive them
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Internal cart errors and how they map to notices
//! - [`telemetry`] - Tracing and Sentry setup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod config;
pub mod error;
pub mod notify;
pub mod stock;
pub mod storage;
pub mod telemetry;

pub use cart_store::CartStore;
pub use notify::{CollectingSink, Notice, NotificationSink};
pub use stock::{StockClient, StockError, StockService};
pub use storage::{FileStore, MemoryStore, PersistentStore, StorageError};
