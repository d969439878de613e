//! Rocket Shoes Core - Shared cart and catalog types.
//!
//! This crate provides the types shared by every Rocket Shoes component:
//! - `storefront` - Cart store, stock API client, persistence, and the cart CLI
//! - `integration-tests` - End-to-end tests against a mocked stock API
//!
//! # Architecture
//!
//! The core crate contains only types and their invariants - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, catalog metadata, and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
