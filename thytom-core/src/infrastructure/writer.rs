// thytom-core/src/infrastructure/writer.rs

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::domain::charset::Charset;
use crate::domain::options::Options;
use crate::domain::output::{LINE_SEPARATOR, RowFormatter, output_file_name};
use crate::error::ThytomError;
use crate::infrastructure::fs::{AtomicFile, ensure_dir};
use crate::ports::connector::ResultSetView;

/// Serialises one result set into `<out>/<row_id>_<template>.txt`.
pub struct ResultWriter<'a> {
    options: &'a Options,
    charset: Charset,
    out_dir: PathBuf,
    path: PathBuf,
}

impl<'a> ResultWriter<'a> {
    pub fn new(
        options: &'a Options,
        charset: Charset,
        out_dir: &Path,
        row_id: &str,
        template_file_name: &str,
    ) -> Self {
        Self {
            options,
            charset,
            out_dir: out_dir.to_path_buf(),
            path: out_dir.join(output_file_name(row_id, template_file_name)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every remaining row of `rows`. Returns the number of data rows.
    #[instrument(skip(self, rows), fields(path = %self.path.display()))]
    pub fn write(&self, rows: &mut dyn ResultSetView) -> Result<u64, ThytomError> {
        ensure_dir(&self.out_dir).map_err(|e| self.output_error(e))?;
        let mut file = AtomicFile::create(&self.path).map_err(|e| self.output_error(e))?;

        let columns = rows.columns().to_vec();
        let mut written = 0;

        if !columns.is_empty() {
            let formatter = RowFormatter::new(self.options, &columns);
            let mut first = true;

            if self.options.show_title_header() {
                self.emit(&mut file, &formatter.header_line())?;
                first = false;
            }

            while let Some(cells) = rows.next_row()? {
                if !first {
                    self.emit(&mut file, LINE_SEPARATOR)?;
                }
                self.emit(&mut file, &formatter.format_row(&cells))?;
                first = false;
                written += 1;
            }
        }

        file.commit().map_err(|e| self.output_error(e))?;
        debug!(rows = written, "Result file written");
        Ok(written)
    }

    fn emit(&self, file: &mut AtomicFile, text: &str) -> Result<(), ThytomError> {
        file.write_all(&self.charset.encode(text))
            .map_err(|e| self.output_error(e))
    }

    fn output_error(&self, source: io::Error) -> ThytomError {
        ThytomError::Output {
            path: self.path.clone(),
            source,
        }
    }
}
