//! Storage layer for processed games.
//!
//! A thin SQLite cache keyed by game id, organized into:
//! - `schema`: database connection and schema management
//! - `queries`: CRUD over processed games and skip records
//!
//! Processed games are stored as their serialized JSON payload; the
//! database is a cache of pipeline output, not a queryable model of it.

pub mod queries;
pub mod schema;


pub use schema::GameDatabase;
