// thytom-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;

pub use self::duckdb::{DuckDbExecutor, discover_extensions};
