// thytom-core/src/infrastructure/config/loader.rs

use encoding_rs::UTF_8;
use java_properties::PropertiesIter;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::domain::charset::Charset;
use crate::domain::config::Config;
use crate::domain::error::ConfigurationError;

pub const KEY_URL: &str = "db.url";
pub const KEY_LOGIN: &str = "db.login";
pub const KEY_PASSWORD: &str = "db.password";
pub const KEY_DRIVER: &str = "db.driver";
pub const KEY_SQL_ENCODING: &str = "file.sql.encoding";
pub const KEY_SUBS_ENCODING: &str = "file.subs.encoding";
pub const KEY_RESULT_ENCODING: &str = "file.result.encoding";

#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<Config, ConfigurationError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigurationError::ConfigNotFound(path.to_path_buf()),
        _ => ConfigurationError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    // Read as UTF-8 rather than the ISO-8859-1 of classic properties files.
    let mut entries = HashMap::new();
    PropertiesIter::new_with_encoding(BufReader::new(file), UTF_8)
        .read_into(|key, value| {
            entries.insert(key, value);
        })
        .map_err(|e| ConfigurationError::ConfigMalformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    info!(keys = entries.len(), "Loaded configuration file");

    let config = Config {
        url: required(&entries, KEY_URL, "Database connection URL", path)?,
        login: required(&entries, KEY_LOGIN, "Database login", path)?,
        password: required(&entries, KEY_PASSWORD, "Database password", path)?,
        driver: required(&entries, KEY_DRIVER, "Database driver", path)?,
        sql_charset: charset(&entries, KEY_SQL_ENCODING, path)?,
        substitution_charset: charset(&entries, KEY_SUBS_ENCODING, path)?,
        result_charset: charset(&entries, KEY_RESULT_ENCODING, path)?,
    };

    if config.has_credentials() {
        warn!(
            "{} and {} are set but the embedded engine does not authenticate; they are ignored",
            KEY_LOGIN, KEY_PASSWORD
        );
    }

    Ok(config)
}

fn required(
    entries: &HashMap<String, String>,
    key: &'static str,
    what: &'static str,
    path: &Path,
) -> Result<String, ConfigurationError> {
    entries
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigurationError::MissingKey {
            what,
            key,
            path: path.to_path_buf(),
        })
}

/// Absent or blank means UTF-8.
fn charset(
    entries: &HashMap<String, String>,
    key: &'static str,
    path: &Path,
) -> Result<Charset, ConfigurationError> {
    match entries.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(Charset::default()),
        Some(label) => Charset::for_label(label).ok_or_else(|| ConfigurationError::InvalidEncoding {
            key,
            label: label.to_string(),
            path: path.to_path_buf(),
        }),
    }
}
