//! Core types for Appetit.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod money;
pub mod status;

pub use contact::{Contact, ContactError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use status::*;
