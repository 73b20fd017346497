//! StyleFinder Core - Shared types library.
//!
//! This crate provides common types used across all StyleFinder components:
//! - `storefront` - Public-facing clothing storefront backed by Supabase
//! - `cli` - Command-line tools for inspecting and seeding the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. Anything that talks to Supabase lives in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, prices, categories, profile fields,
//!   cart arithmetic and recommendation reasons

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
