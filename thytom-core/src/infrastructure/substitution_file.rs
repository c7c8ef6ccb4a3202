// thytom-core/src/infrastructure/substitution_file.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::domain::charset::Charset;
use crate::domain::options::Options;
use crate::domain::substitution::{
    DEFAULT_PLACEHOLDER, SubstitutionRow, Substitutions, placeholder, row_id, tokenize,
};
use crate::error::ThytomError;


/// Line-by-line reader of the substitution file.
///
/// Without a header every non-empty line fills `{PARAM}`. In custom mode the
/// first line names the placeholders and each following line is split into
/// fields on the delimiter characters.
#[derive(Debug)]
pub struct SubstitutionSource {
    path: PathBuf,
    charset: Charset,
    trim: bool,
    custom_mode: bool,
    delimiters: String,
    /// Braced placeholder names from the header; `None` in default mode.
    placeholders: Option<Vec<String>>,
    reader: Option<BufReader<File>>,
    at_file_start: bool,
    row_number: u64,
    unique_record: String,
}

impl SubstitutionSource {
    #[instrument(skip(options), fields(path = %path.display()))]
    pub fn open(path: &Path, options: &Options, charset: Charset) -> Result<Self, ThytomError> {
        let mut source = Self {
            path: path.to_path_buf(),
            charset,
            trim: options.trim_substitutions(),
            custom_mode: options.use_custom_templates(),
            delimiters: options.templates_delimiter().to_string(),
            placeholders: None,
            reader: None,
            at_file_start: true,
            row_number: 0,
            unique_record: String::new(),
        };
        source.reopen()?;
        Ok(source)
    }

    /// Starts over from the first line, header included.
    pub fn rewind(&mut self) -> Result<(), ThytomError> {
        debug!(path = ?self.path, "Rewinding substitution file");
        self.reopen()
    }

    pub fn close(&mut self) {
        self.reader = None;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Placeholder names read from the header, when custom mode is in effect.
    pub fn placeholders(&self) -> Option<&[String]> {
        self.placeholders.as_deref()
    }

    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    /// `<row_number>_<unique_record>` of the last read attempt.
    pub fn row_id(&self) -> String {
        row_id(self.row_number, &self.unique_record)
    }

    /// Next non-empty line as a row, or `None` at end of file.
    pub fn next_row(&mut self) -> Result<Option<SubstitutionRow>, ThytomError> {
        self.row_number += 1;

        loop {
            let Some(raw) = self.read_line()? else {
                self.unique_record.clear();
                return Ok(None);
            };

            let line = if self.trim { raw.trim() } else { raw.as_str() };
            if line.is_empty() {
                continue;
            }

            let (substitutions, unique_record) = match &self.placeholders {
                None => (
                    Substitutions::from_iter([(DEFAULT_PLACEHOLDER, line)]),
                    line.trim().to_string(),
                ),
                Some(names) => self.split_fields(line, names),
            };

            self.unique_record = unique_record.clone();
            return Ok(Some(SubstitutionRow {
                substitutions,
                row_number: self.row_number,
                unique_record,
            }));
        }
    }

    fn split_fields(&self, line: &str, names: &[String]) -> (Substitutions, String) {
        let fields: Vec<&str> = tokenize(line, &self.delimiters)
            .take(names.len())
            .map(|field| if self.trim { field.trim() } else { field })
            .collect();

        let unique_record = fields.first().map(|f| f.trim().to_string()).unwrap_or_default();
        let substitutions = names
            .iter()
            .zip(fields)
            .map(|(name, field)| (name.as_str(), field))
            .collect();
        (substitutions, unique_record)
    }

    fn reopen(&mut self) -> Result<(), ThytomError> {
        let file = File::open(&self.path).map_err(|source| ThytomError::SubstitutionRead {
            path: self.path.clone(),
            source,
        })?;
        self.reader = Some(BufReader::new(file));
        self.at_file_start = true;
        self.row_number = 0;
        self.unique_record.clear();
        self.placeholders = None;

        if self.custom_mode {
            self.placeholders = self.read_header()?;
            match &self.placeholders {
                Some(names) => info!(placeholders = ?names, "Custom templates"),
                None => info!(
                    "Substitution file has no header, falling back to {}",
                    DEFAULT_PLACEHOLDER
                ),
            }
        }
        Ok(())
    }

    /// The first line, raw. Absent or blank means there is no header.
    fn read_header(&mut self) -> Result<Option<Vec<String>>, ThytomError> {
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        let line = if self.trim { line.trim() } else { line.as_str() };
        let names: Vec<String> = tokenize(line, &self.delimiters)
            .map(|name| if self.trim { name.trim() } else { name })
            .map(placeholder)
            .collect();
        Ok(if names.is_empty() { None } else { Some(names) })
    }

    fn read_line(&mut self) -> Result<Option<String>, ThytomError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        let read = match read_line_bytes(reader, &mut buf) {
            Ok(read) => read,
            Err(source) => {
                self.reader = None;
                return Err(ThytomError::SubstitutionRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if read == 0 {
            return Ok(None);
        }

        let line = if self.at_file_start {
            self.at_file_start = false;
            self.charset.decode(&buf)
        } else {
            self.charset.decode_line(&buf)
        };
        Ok(Some(line.into_owned()))
    }
}

/// Reads one line ended by `\n`, `\r\n` or a lone `\r` into `buf`, without
/// the terminator. Returns the number of bytes consumed, 0 at end of file.
fn read_line_bytes<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    let mut consumed = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(consumed);
        }

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                let carriage_return = available[end] == b'\r';
                buf.extend_from_slice(&available[..end]);
                reader.consume(end + 1);
                consumed += end + 1;
                if carriage_return && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                    consumed += 1;
                }
                return Ok(consumed);
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
                consumed += len;
            }
        }
    }
}

impl Iterator for SubstitutionSource {
    type Item = Result<SubstitutionRow, ThytomError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
