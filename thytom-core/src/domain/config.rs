// thytom-core/src/domain/config.rs

use crate::domain::charset::Charset;

/// Connection settings and file encodings read from `thytom.properties`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub url: String,
    pub login: String,
    pub password: String,
    pub driver: String,
    pub sql_charset: Charset,
    pub substitution_charset: Charset,
    pub result_charset: Charset,
}

impl Config {
    /// A configuration for the given URL with no credentials and UTF-8 everywhere.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.login.is_empty() || !self.password.is_empty()
    }
}
