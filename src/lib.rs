//! Case registry backend for law practices.
//!
//! Exposes CRUD endpoints over users, clients, cases, court dates, and
//! documents, backed by MongoDB, plus a dashboard aggregation endpoint.
//! The binary in `main.rs` wires configuration, the store, and the HTTP
//! server together; everything else lives here so the integration tests
//! can drive a real server in-process.

pub mod config;
pub mod db;
pub mod error;
pub mod registry;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod web;
