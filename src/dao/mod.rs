/// Persistence trait definitions for entities and binary objects.
pub mod entity_store;
/// In-memory store used by unit tests.
#[cfg(test)]
pub mod memory;
/// Database model definitions.
pub mod models;
/// MongoDB connection management and store implementation.
pub mod mongodb;
/// Storage abstraction layer for database operations.
pub mod storage;
