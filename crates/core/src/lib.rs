//! CalorieQuest Core - Shared domain types.
//!
//! This crate provides the types and rules shared by every CalorieQuest
//! component:
//! - `api` - The HTTP service (search and session issuance)
//! - `cli` - Migrations, fixture seeding and store checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. The calorie restriction applied to search results
//! lives here so it can be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, geographic points, restaurants and user identities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
