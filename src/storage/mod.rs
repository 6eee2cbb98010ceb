//! Storage layer
//!
//! SeaORM-backed relational storage, supporting SQLite, MySQL/MariaDB
//! and PostgreSQL. All counters are updated with atomic conditional
//! upserts; nothing in here does read-modify-write.

pub mod backend;
pub mod models;

pub use backend::{SeaOrmStorage, connect_generic, connect_sqlite, run_migrations};
pub use models::{GlobalSettings, Link, LuckyMode, LuckySettings, RedirectHistory};
