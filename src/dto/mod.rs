//! Request/response shapes for the admin and public APIs.

/// Shared acknowledgement and upload responses.
pub mod common;
/// Contest CRUD payloads.
pub mod contest;
/// Bulk enrollment payloads.
pub mod enrollment;
/// Health check payload.
pub mod health;
/// Per-contest player points payloads.
pub mod points;
