// thytom-core/src/infrastructure/adapters/duckdb.rs

use duckdb::arrow::array::Array;
use duckdb::arrow::datatypes::DataType;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::display::array_value_to_string;
use duckdb::{Config as DuckDbConfig, Connection};
use sqlparser::dialect::DuckDbDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

// Imports Hexagonaux
use crate::domain::config::Config;
use crate::domain::output::{ColumnKind, ColumnMeta};
use crate::error::ThytomError;
use crate::infrastructure::error::DatabaseError;
use crate::ports::connector::{Connector, ResultSetView};

pub const ENGINE_NAME: &str = "duckdb";
pub const EXTENSION_SUFFIX: &str = ".duckdb_extension";

/// First keywords of statements that produce a result set.
const ROW_RETURNING_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "VALUES", "FROM", "TABLE", "SHOW", "DESCRIBE", "DESC", "SUMMARIZE",
    "PRAGMA", "EXPLAIN", "CALL",
];

/// One DuckDB session. Holds at most one result set, the one returned by the
/// latest `execute`.
pub struct DuckDbExecutor {
    conn: Option<Connection>,
    latest: Option<DuckDbResultSet>,
}

impl DuckDbExecutor {
    /// Opens the database named by `config.url` and loads `extensions` into it.
    #[instrument(skip(config, extensions), fields(url = %config.url))]
    pub fn connect(config: &Config, extensions: &[PathBuf]) -> Result<Self, ThytomError> {
        check_driver(&config.driver)?;

        let connection_error = |source: DatabaseError| ThytomError::Connection {
            url: config.url.clone(),
            source,
        };

        let mut flags = DuckDbConfig::default();
        if !extensions.is_empty() {
            flags = flags
                .with("allow_unsigned_extensions", "true")
                .map_err(|e| connection_error(e.into()))?;
        }

        let conn = match database_location(&config.url) {
            None => Connection::open_in_memory_with_flags(flags),
            Some(path) => Connection::open_with_flags(path, flags),
        }
        .map_err(|e| connection_error(e.into()))?;
        info!("Connected");

        let executor = Self {
            conn: Some(conn),
            latest: None,
        };
        executor.load_extensions(extensions)?;
        Ok(executor)
    }

    pub fn open_in_memory() -> Result<Self, ThytomError> {
        Self::connect(&Config::for_url(":memory:"), &[])
    }

    fn load_extensions(&self, extensions: &[PathBuf]) -> Result<(), ThytomError> {
        let conn = self.connection().map_err(ThytomError::Driver)?;
        for path in extensions {
            let literal = path.display().to_string().replace('\'', "''");
            conn.execute_batch(&format!("LOAD '{}'", literal))
                .map_err(|e| ThytomError::LibraryLoad {
                    path: path.clone(),
                    source: e.into(),
                })?;
            info!(path = ?path, "Extension loaded");
        }
        Ok(())
    }

    /// Releases the current result set and the session.
    pub fn close(&mut self) {
        self.latest = None;
        if let Some(conn) = self.conn.take()
            && let Err((_, e)) = conn.close()
        {
            warn!(error = %e, "Error while closing the database session");
        }
    }

    fn connection(&self) -> Result<&Connection, DatabaseError> {
        self.conn.as_ref().ok_or(DatabaseError::SessionClosed)
    }
}

impl Drop for DuckDbExecutor {
    fn drop(&mut self) {
        self.close();
    }
}

impl Connector for DuckDbExecutor {
    fn execute(&mut self, query: &str) -> Result<Option<&mut dyn ResultSetView>, ThytomError> {
        self.latest = None;
        let conn = self.connection().map_err(ThytomError::Query)?;

        if !returns_rows(query) {
            let changed = conn
                .execute(query, [])
                .map_err(|e| ThytomError::Query(e.into()))?;
            debug!(changed, "Update-like statement executed");
            return Ok(None);
        }

        let result = fetch_all(conn, query).map_err(ThytomError::Query)?;
        self.latest = Some(result);
        Ok(self.latest.as_mut().map(|r| r as &mut dyn ResultSetView))
    }
}

/// Runs a select-like statement and buffers its Arrow batches.
fn fetch_all(conn: &Connection, query: &str) -> Result<DuckDbResultSet, DatabaseError> {
    let mut stmt = conn.prepare(query)?;
    let arrow = stmt.query_arrow([])?;

    let schema = arrow.get_schema();
    let columns = schema
        .fields()
        .iter()
        .map(|field| ColumnMeta::new(field.name().as_str(), column_kind(field.data_type())))
        .collect();
    let batches: Vec<RecordBatch> = arrow.collect();

    Ok(DuckDbResultSet {
        columns,
        batches,
        batch: 0,
        row: 0,
    })
}

fn column_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnKind::Text,
        // ENUM columns arrive dictionary-encoded
        DataType::Dictionary(_, values) => column_kind(values),
        _ => ColumnKind::Other,
    }
}

pub struct DuckDbResultSet {
    columns: Vec<ColumnMeta>,
    batches: Vec<RecordBatch>,
    batch: usize,
    row: usize,
}

impl ResultSetView for DuckDbResultSet {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Option<String>>>, ThytomError> {
        while let Some(batch) = self.batches.get(self.batch) {
            if self.row < batch.num_rows() {
                let row = self.row;
                let cells = batch
                    .columns()
                    .iter()
                    .map(|col| {
                        if col.is_null(row) {
                            Ok(None)
                        } else {
                            array_value_to_string(col.as_ref(), row).map(Some)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ThytomError::Fetch(e.into()))?;
                self.row += 1;
                return Ok(Some(cells));
            }
            self.batch += 1;
            self.row = 0;
        }
        Ok(None)
    }
}

/// Whether the statement yields rows: a select-like first keyword, or a DML
/// statement with a top-level `RETURNING` clause.
pub fn returns_rows(sql: &str) -> bool {
    let words = keywords(sql);
    match words.first() {
        Some((_, first)) if ROW_RETURNING_KEYWORDS.contains(&first.as_str()) => true,
        Some(_) => words
            .iter()
            .any(|(depth, word)| *depth == 0 && word == "RETURNING"),
        None => false,
    }
}

/// Unquoted words of the statement, upper-cased, with their parenthesis depth.
fn keywords(sql: &str) -> Vec<(usize, String)> {
    match Tokenizer::new(&DuckDbDialect {}, sql).tokenize() {
        Ok(tokens) => {
            let mut depth = 0usize;
            let mut words = Vec::new();
            for token in tokens {
                match token {
                    Token::LParen => depth += 1,
                    Token::RParen => depth = depth.saturating_sub(1),
                    Token::Word(word) if word.quote_style.is_none() => {
                        words.push((depth, word.value.to_uppercase()))
                    }
                    _ => {}
                }
            }
            words
        }
        Err(e) => {
            // Unterminated literals and the like: the engine reports the real error.
            debug!(error = %e, "Tokenizer failed, falling back to plain keyword scan");
            sql.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .filter(|word| !word.is_empty())
                .map(|word| (0, word.to_uppercase()))
                .collect()
        }
    }
}

fn check_driver(driver: &str) -> Result<(), ThytomError> {
    let driver = driver.trim();
    if driver.is_empty() || driver.eq_ignore_ascii_case(ENGINE_NAME) {
        Ok(())
    } else {
        Err(ThytomError::Driver(DatabaseError::UnsupportedDriver(
            driver.to_string(),
        )))
    }
}

/// File path of the database, `None` for an in-memory one.
fn database_location(url: &str) -> Option<&str> {
    let url = url.trim();
    let url = url.strip_prefix("jdbc:").unwrap_or(url);
    let url = url.strip_prefix("duckdb:").unwrap_or(url);
    match url {
        "" | ":memory:" => None,
        path => Some(path),
    }
}

/// Extension binaries in `lib_dir`, in file-name order. A missing directory
/// has none.
pub fn discover_extensions(lib_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(lib_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy().ends_with(EXTENSION_SUFFIX))
        .map(|e| e.into_path())
        .collect()
}
