//! Library crate for fantasy-contest-back, exposing modules for binaries and tests.

/// Runtime configuration loading.
pub mod config;
/// Storage abstraction, models, and backends.
pub mod dao;
/// Request/response shapes.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Fixed IST civil-timezone helpers.
pub mod ist;
/// HTTP route trees.
pub mod routes;
/// Business logic components.
pub mod services;
/// Shared application state.
pub mod state;
