// thytom-core/src/error.rs

use crate::domain::error::ConfigurationError;
use crate::infrastructure::error::DatabaseError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit code for a successful run, help output or an empty template set.
pub const EXIT_NORMAL: u8 = 0;
/// Bad parameters, missing or invalid configuration.
pub const EXIT_ERR_PARAM: u8 = 1;
/// Any other runtime failure.
pub const EXIT_INTERNAL_ERR: u8 = 2;

#[derive(Error, Debug, Diagnostic)]
pub enum ThytomError {
    // --- CONFIGURATION (flags, properties file) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    // --- DATABASE SESSION ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Driver(DatabaseError),

    #[error("Connection error ({url}): {source}")]
    #[diagnostic(code(thytom::connection), help("Check db.url in thytom.properties."))]
    Connection {
        url: String,
        #[source]
        source: DatabaseError,
    },

    #[error("Unable to load library {}: {source}", .path.display())]
    #[diagnostic(code(thytom::library))]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: DatabaseError,
    },

    #[error("Unable to execute query: {0}")]
    #[diagnostic(code(thytom::query))]
    Query(#[source] DatabaseError),

    // --- FILES ---
    #[error("Unable to load sql query from file {}: {source}", .path.display())]
    #[diagnostic(code(thytom::io::template))]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while reading substitution file {}: {source}", .path.display())]
    #[diagnostic(code(thytom::io::substitution))]
    SubstitutionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable write to result file {}: {source}", .path.display())]
    #[diagnostic(
        code(thytom::io::output),
        help("Check permissions of the output directory.")
    )]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable fetch data from query result: {0}")]
    #[diagnostic(code(thytom::fetch))]
    Fetch(#[source] DatabaseError),

    #[error("File System Error: {0}")]
    #[diagnostic(code(thytom::io))]
    Io(#[from] std::io::Error),
}

impl ThytomError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ThytomError::Configuration(_) => EXIT_ERR_PARAM,
            _ => EXIT_INTERNAL_ERR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config: ThytomError =
            ConfigurationError::SubstitutionFileNotFound(PathBuf::from("./nope.txt")).into();
        assert_eq!(config.exit_code(), EXIT_ERR_PARAM);
        assert_eq!(config.to_string(), "Substitution file ./nope.txt not found.");

        let driver = ThytomError::Driver(DatabaseError::UnsupportedDriver("oracle".into()));
        assert_eq!(driver.exit_code(), EXIT_INTERNAL_ERR);

        let io = ThytomError::SubstitutionRead {
            path: PathBuf::from("subs.txt"),
            source: std::io::Error::other("disk on fire"),
        };
        assert_eq!(io.exit_code(), EXIT_INTERNAL_ERR);
        assert!(io.to_string().contains("subs.txt"));
    }
}
