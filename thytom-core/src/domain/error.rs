// thytom-core/src/domain/error.rs

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Anything the operator can fix by changing flags or the properties file.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigurationError {
    #[error("Invalid command line: {0}")]
    #[diagnostic(code(thytom::config::options), help("Run with --help to see the options."))]
    InvalidOptions(String),

    #[error("Substitution file {} not found.", .0.display())]
    #[diagnostic(code(thytom::config::subs_file))]
    SubstitutionFileNotFound(PathBuf),

    #[error("Configuration file {} not found.", .0.display())]
    #[diagnostic(
        code(thytom::config::missing),
        help("Create conf/thytom.properties next to the executable, or point THYTOM_HOME at a directory that has one.")
    )]
    ConfigNotFound(PathBuf),

    #[error("Unable to read configuration file {}, I/O error: {source}", .path.display())]
    #[diagnostic(code(thytom::config::unreadable))]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse configuration file {}: {message}", .path.display())]
    #[diagnostic(code(thytom::config::syntax))]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("{what} not set. Please set parameter \"{key}\" in file {}", .path.display())]
    #[diagnostic(code(thytom::config::missing_key))]
    MissingKey {
        what: &'static str,
        key: &'static str,
        path: PathBuf,
    },

    #[error("Parameter \"{key}\" in file {} not valid: unknown encoding '{label}'", .path.display())]
    #[diagnostic(
        code(thytom::config::encoding),
        help("Use an ASCII-compatible encoding label such as UTF-8, windows-1251 or ISO-8859-1.")
    )]
    InvalidEncoding {
        key: &'static str,
        label: String,
        path: PathBuf,
    },
}
