// thytom-core/src/domain/options.rs

use crate::domain::error::ConfigurationError;
use std::path::{Path, PathBuf};

pub const DEFAULT_COLUMN_DELIMITER: &str = ";";
pub const DEFAULT_HEADER_DATA_DELIMITER: &str = ":";
pub const DEFAULT_TEMPLATES_DELIMITER: &str = ";";

/// Flags exactly as the operator supplied them, before implications are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFlags {
    pub substitution_file: Option<PathBuf>,
    pub column_delimiter: Option<String>,
    pub title_header: bool,
    pub header_per_line: bool,
    pub header_data_delimiter: Option<String>,
    pub custom_templates: bool,
    pub templates_delimiter: Option<String>,
    pub render_null: bool,
    pub trim_results: bool,
    pub trim_substitutions: bool,
}

/// Resolved, read-only run options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    substitution_file: Option<PathBuf>,
    show_title_header: bool,
    show_header_per_line: bool,
    header_data_delimiter: String,
    column_delimiter: String,
    render_null: bool,
    trim_results: bool,
    trim_substitutions: bool,
    use_custom_templates: bool,
    templates_delimiter: String,
}

impl From<OptionFlags> for Options {
    fn from(flags: OptionFlags) -> Self {
        // A per-line separator only makes sense in per-line mode.
        let show_header_per_line = flags.header_per_line || flags.header_data_delimiter.is_some();
        let show_title_header = flags.title_header && !show_header_per_line;
        let use_custom_templates = flags.custom_templates || flags.templates_delimiter.is_some();

        Self {
            substitution_file: flags.substitution_file,
            show_title_header,
            show_header_per_line,
            header_data_delimiter: flags
                .header_data_delimiter
                .unwrap_or_else(|| DEFAULT_HEADER_DATA_DELIMITER.to_string()),
            column_delimiter: flags
                .column_delimiter
                .unwrap_or_else(|| DEFAULT_COLUMN_DELIMITER.to_string()),
            render_null: flags.render_null,
            trim_results: flags.trim_results,
            trim_substitutions: flags.trim_substitutions,
            use_custom_templates,
            templates_delimiter: flags
                .templates_delimiter
                .unwrap_or_else(|| DEFAULT_TEMPLATES_DELIMITER.to_string()),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        OptionFlags::default().into()
    }
}

impl Options {
    /// Checks the parts of the options that refer to the outside world.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(path) = &self.substitution_file
            && !path.exists()
        {
            return Err(ConfigurationError::SubstitutionFileNotFound(path.clone()));
        }
        Ok(())
    }

    pub fn use_substitution_file(&self) -> bool {
        self.substitution_file.is_some()
    }

    pub fn substitution_file_path(&self) -> Option<&Path> {
        self.substitution_file.as_deref()
    }

    pub fn show_title_header(&self) -> bool {
        self.show_title_header
    }

    pub fn show_header_per_line(&self) -> bool {
        self.show_header_per_line
    }

    pub fn header_data_delimiter(&self) -> &str {
        &self.header_data_delimiter
    }

    pub fn column_delimiter(&self) -> &str {
        &self.column_delimiter
    }

    pub fn render_null(&self) -> bool {
        self.render_null
    }

    /// Text written in place of a database NULL.
    pub fn null_text(&self) -> &'static str {
        if self.render_null { "null" } else { "" }
    }

    pub fn trim_results(&self) -> bool {
        self.trim_results
    }

    pub fn trim_substitutions(&self) -> bool {
        self.trim_substitutions
    }

    pub fn use_custom_templates(&self) -> bool {
        self.use_custom_templates
    }

    pub fn templates_delimiter(&self) -> &str {
        &self.templates_delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.use_substitution_file());
        assert_eq!(options.substitution_file_path(), None);
        assert_eq!(options.column_delimiter(), ";");
        assert_eq!(options.header_data_delimiter(), ":");
        assert_eq!(options.templates_delimiter(), ";");
        assert!(!options.show_title_header());
        assert!(!options.show_header_per_line());
        assert!(!options.render_null());
        assert_eq!(options.null_text(), "");
        assert!(!options.trim_results());
        assert!(!options.trim_substitutions());
        assert!(!options.use_custom_templates());
    }

    #[test]
    fn test_header_data_delimiter_implies_per_line_and_hides_title() {
        let options: Options = OptionFlags {
            title_header: true,
            header_data_delimiter: Some("#".into()),
            ..Default::default()
        }
        .into();
        assert!(options.show_header_per_line());
        assert!(!options.show_title_header());
        assert_eq!(options.header_data_delimiter(), "#");
    }

    #[test]
    fn test_per_line_suppresses_title() {
        let options: Options = OptionFlags {
            title_header: true,
            header_per_line: true,
            ..Default::default()
        }
        .into();
        assert!(!options.show_title_header());

        let title_only: Options = OptionFlags {
            title_header: true,
            ..Default::default()
        }
        .into();
        assert!(title_only.show_title_header());
    }

    #[test]
    fn test_templates_delimiter_implies_custom_templates() {
        let options: Options = OptionFlags {
            templates_delimiter: Some(",".into()),
            ..Default::default()
        }
        .into();
        assert!(options.use_custom_templates());
        assert_eq!(options.templates_delimiter(), ",");
    }

    #[test]
    fn test_validate_missing_substitution_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("nope.txt");
        let options: Options = OptionFlags {
            substitution_file: Some(missing.clone()),
            ..Default::default()
        }
        .into();

        let err = options.validate().err();
        assert!(matches!(
            err,
            Some(ConfigurationError::SubstitutionFileNotFound(ref p)) if *p == missing
        ));

        std::fs::write(&missing, "one\n")?;
        options.validate()?;
        Ok(())
    }
}
