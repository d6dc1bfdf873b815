//! Schema Storefront Core - Shared types library.
//!
//! This crate provides common types used across the storefront components:
//! - `storefront` - HTTP surface and workflows over the Schema commerce API
//! - `integration-tests` - End-to-end checks against a running storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for remote record IDs and money amounts
//! - [`validation`] - Declarative required-field validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{CONFIRM, FieldErrors, FieldSpec, REQUIRED, ValidationError, validate};
