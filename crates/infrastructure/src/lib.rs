//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_store;
mod in_memory_user_directory;
mod postgres_store;
mod postgres_user_directory;
mod row_schema;

pub use in_memory_store::InMemoryStore;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use postgres_store::PostgresStore;
pub use postgres_user_directory::PostgresUserDirectory;
