/// Contest lifecycle management.
pub mod contest_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Bulk enrollment and unenrollment of teams.
pub mod enrollment_service;
/// Health check service.
pub mod health_service;
/// Per-contest points overrides and global mirroring.
pub mod points_service;
/// Global settings singleton and the default contest logo.
pub mod settings_service;
/// Degraded-write bookkeeping for multi-document mutations.
pub mod side_effects;
/// Storage connection supervision.
pub mod storage_supervisor;
