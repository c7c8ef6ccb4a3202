// thytom-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(thytom::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Unable to convert result value: {0}")]
    #[diagnostic(code(thytom::infra::database::arrow))]
    Arrow(#[from] duckdb::arrow::error::ArrowError),

    #[error("Unable to load database driver {0}.")]
    #[diagnostic(
        code(thytom::infra::database::driver),
        help("This build ships the DuckDB engine only: leave db.driver empty or set it to 'duckdb'.")
    )]
    UnsupportedDriver(String),

    #[error("Database session is closed")]
    #[diagnostic(code(thytom::infra::database::closed))]
    SessionClosed,
}
