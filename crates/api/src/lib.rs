//! CalorieQuest API library.
//!
//! Nearby restaurant search with calorie filtering, and bearer session
//! issuance for guest and Google identities. The binary in `main.rs` wires
//! this library to `PostgreSQL` and serves it; tests drive [`routes::app`]
//! in-process against the in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod google;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
