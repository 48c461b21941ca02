//! Appetit Core - Shared types library.
//!
//! This crate provides common types used across all Appetit client components:
//! - `client` - Typed REST client for the food-ordering backend
//! - `cli` - Command-line test harness built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, contacts, and statuses
//! - [`pricing`] - Client-side cart subtotal and promocode total arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{LineAmount, discounted_total, subtotal};
pub use types::*;
