// thytom-core/src/infrastructure/templates.rs
//
// SQL templates on disk: the `sql/` directory listing and lazily cached file content.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::charset::Charset;
use crate::domain::substitution::Substitutions;
use crate::error::ThytomError;

const TEMPLATE_EXTENSION: &str = ".sql";

#[derive(Debug)]
pub struct QueryTemplate {
    path: PathBuf,
    charset: Charset,
    content: Option<String>,
}

impl QueryTemplate {
    pub fn new(path: impl Into<PathBuf>, charset: Charset) -> Self {
        Self {
            path: path.into(),
            charset,
            content: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Reads the file unless it is already cached.
    pub fn load(&mut self) -> Result<&str, ThytomError> {
        if self.content.is_none() {
            let bytes = fs::read(&self.path).map_err(|source| ThytomError::TemplateRead {
                path: self.path.clone(),
                source,
            })?;
            let content = normalize_lines(&self.charset.decode(&bytes));
            debug!(path = ?self.path, bytes = content.len(), "Template loaded");
            self.content = Some(content);
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// The query text with every placeholder of `substitutions` replaced literally.
    pub fn render(&mut self, substitutions: &Substitutions) -> Result<Cow<'_, str>, ThytomError> {
        let content = self.load()?;
        if substitutions.is_empty() {
            return Ok(Cow::Borrowed(content));
        }
        Ok(Cow::Owned(substitutions.apply(content)))
    }

    /// Drops the cached content; the next `load` reads the file again.
    pub fn release(&mut self) {
        self.content = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }
}

/// Every line followed by exactly one `\n`. Lines may end in `\n`, `\r\n`
/// or a lone `\r`.
fn normalize_lines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len() + 1);
    for line in unified.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// The `.sql` files of one directory, in file-name order.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    dir: PathBuf,
    charset: Charset,
}

impl TemplateSet {
    pub fn new(dir: impl Into<PathBuf>, charset: Charset) -> Self {
        Self {
            dir: dir.into(),
            charset,
        }
    }

    pub fn has_templates(&self) -> bool {
        self.entries().next().is_some()
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn templates(&self) -> Vec<QueryTemplate> {
        let templates: Vec<QueryTemplate> = self
            .entries()
            .map(|path| QueryTemplate::new(path, self.charset))
            .collect();
        debug!(count = templates.len(), "Templates discovered");
        templates
    }

    fn entries(&self) -> impl Iterator<Item = PathBuf> + '_ {
        // A missing directory yields a single error entry, filtered out here.
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_template_name(&e.file_name().to_string_lossy()))
            .map(|e| e.into_path())
    }
}

fn is_template_name(name: &str) -> bool {
    name.len() > TEMPLATE_EXTENSION.len()
        && name
            .get(name.len() - TEMPLATE_EXTENSION.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_template_set_filters_and_sorts() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.sql"), "select 2")?;
        fs::write(dir.path().join("A.SQL"), "select 1")?;
        fs::write(dir.path().join("notes.txt"), "not a query")?;
        fs::write(dir.path().join(".sql"), "hidden, no base name")?;
        fs::create_dir(dir.path().join("nested.sql"))?;
        fs::write(dir.path().join("nested.sql").join("c.sql"), "select 3")?;

        let set = TemplateSet::new(dir.path(), Charset::utf_8());
        assert!(set.has_templates());

        let names: Vec<String> = set.templates().iter().map(QueryTemplate::file_name).collect();
        assert_eq!(names, vec!["A.SQL", "b.sql"]);
        Ok(())
    }

    #[test]
    fn test_missing_or_empty_dir_has_no_templates() -> Result<()> {
        let dir = tempdir()?;
        assert!(!TemplateSet::new(dir.path(), Charset::utf_8()).has_templates());
        assert!(!TemplateSet::new(dir.path().join("absent"), Charset::utf_8()).has_templates());
        Ok(())
    }

    #[test]
    fn test_render_replaces_literally() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        fs::write(&path, "select * from t\r\nwhere a = '{A}' and b = {B} and c = '{A}'")?;

        let mut template = QueryTemplate::new(&path, Charset::utf_8());
        let subs: Substitutions = [("{A}", "x.*"), ("{B}", "$1")].into_iter().collect();

        let rendered = template.render(&subs)?.into_owned();
        assert_eq!(
            rendered,
            "select * from t\nwhere a = 'x.*' and b = $1 and c = 'x.*'\n"
        );

        let unchanged = template.render(&Substitutions::new())?.into_owned();
        assert!(unchanged.contains("'{A}'"));
        Ok(())
    }

    #[test]
    fn test_content_is_cached_until_release() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        fs::write(&path, "select 1")?;

        let mut template = QueryTemplate::new(&path, Charset::utf_8());
        assert!(!template.is_loaded());
        assert_eq!(template.load()?, "select 1\n");

        fs::write(&path, "select 2")?;
        assert_eq!(template.load()?, "select 1\n");

        template.release();
        assert!(!template.is_loaded());
        assert_eq!(template.load()?, "select 2\n");
        Ok(())
    }

    #[test]
    fn test_decodes_with_configured_charset() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        // "select 'Привет'" in windows-1251
        let mut bytes = b"select '".to_vec();
        bytes.extend_from_slice(&[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]);
        bytes.push(b'\'');
        fs::write(&path, bytes)?;

        let charset = Charset::for_label("windows-1251").ok_or_else(|| anyhow::anyhow!("charset"))?;
        let mut template = QueryTemplate::new(&path, charset);
        assert_eq!(template.load()?, "select 'Привет'\n");
        Ok(())
    }

    #[test]
    fn test_carriage_return_only_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        fs::write(&path, "select 1\r-- note\rfrom t\r\n")?;

        let mut template = QueryTemplate::new(&path, Charset::utf_8());
        assert_eq!(template.load()?, "select 1\n-- note\nfrom t\n");
        Ok(())
    }

    #[test]
    fn test_configured_charset_wins_over_utf16_mark() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("q.sql");
        // "яю" in windows-1251, the same bytes as a UTF-16LE mark
        fs::write(&path, b"\xFF\xFE = 1")?;

        let charset = Charset::for_label("windows-1251").ok_or_else(|| anyhow::anyhow!("charset"))?;
        let mut template = QueryTemplate::new(&path, charset);
        assert_eq!(template.load()?, "яю = 1\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_template_read_error() {
        let mut template = QueryTemplate::new("/definitely/not/here.sql", Charset::utf_8());
        assert!(matches!(template.load(), Err(ThytomError::TemplateRead { .. })));
    }
}
