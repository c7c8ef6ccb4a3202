pub mod charset;
pub mod config;
pub mod error;
pub mod options;
pub mod output;
pub mod substitution;

// Short import paths for the rest of the crate
pub use charset::Charset;
pub use config::Config;
pub use error::ConfigurationError;
pub use options::{OptionFlags, Options};
pub use output::{ColumnKind, ColumnMeta};
pub use substitution::{SubstitutionRow, Substitutions};
