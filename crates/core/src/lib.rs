//! Quality Bearings Core - Shared types library.
//!
//! This crate provides the types used across all Quality Bearings components:
//! - `storefront` - Server-rendered storefront backed by the Fake Store API
//! - `cli` - Command-line catalog browser and cart manager
//!
//! # Architecture
//!
//! The core crate contains only types and pure bookkeeping - no I/O, no HTTP
//! clients, no storage. Persisting and sharing a [`Cart`] is the storefront's
//! job; this crate only guarantees the cart's invariants.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and catalog products
//! - [`cart`] - Ordered line-item container with quantity rules and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem};
pub use types::*;
