//! Quality Bearings storefront library.
//!
//! Server-rendered storefront over the Fake Store catalog API, with a
//! single-shopper cart persisted to a local slot. Exposed as a library so the
//! CLI and integration tests can reuse the catalog client, cart store and
//! router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
