// thytom-core/src/domain/output.rs
//
// Formatting rules for result files: file naming, quoting, NULL rendering and
// header placement. Pure string work; the file itself is handled by the writer.

use crate::domain::options::Options;

/// Characters that most filesystems refuse in a file name.
pub const FORBIDDEN_FILE_NAME_CHARS: [char; 10] =
    ['<', '>', ':', '"', '/', '\\', '|', '?', '*', '%'];

pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Row identifier used when no substitution file is configured.
pub const NO_SUBSTITUTION_ROW_ID: &str = "out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Variable-length character or character-LOB data. Quoted on output.
    Text,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnMeta {
    pub fn new(label: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == ColumnKind::Text
    }
}

/// `<row_id>_<template>` with a trailing `.sql` turned into `.txt` and every
/// forbidden character replaced by `_`.
pub fn output_file_name(row_id: &str, template_file_name: &str) -> String {
    let name = format!("{}_{}", row_id, template_file_name);
    let name = match name.strip_suffix(".sql") {
        Some(stem) => format!("{}.txt", stem),
        None => name,
    };
    name.chars()
        .map(|c| {
            if FORBIDDEN_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Turns result rows into output lines according to the run options.
pub struct RowFormatter<'a> {
    options: &'a Options,
    columns: &'a [ColumnMeta],
    labels: Vec<String>,
}

impl<'a> RowFormatter<'a> {
    pub fn new(options: &'a Options, columns: &'a [ColumnMeta]) -> Self {
        let labels = columns
            .iter()
            .map(|c| {
                if options.trim_results() {
                    c.label.trim().to_string()
                } else {
                    c.label.clone()
                }
            })
            .collect();
        Self {
            options,
            columns,
            labels,
        }
    }

    pub fn header_line(&self) -> String {
        self.labels.join(self.options.column_delimiter())
    }

    /// Formats one row. A missing trailing cell is treated as NULL.
    pub fn format_row(&self, cells: &[Option<String>]) -> String {
        let mut line = String::new();
        let last = self.columns.len().saturating_sub(1);

        for (i, column) in self.columns.iter().enumerate() {
            if self.options.show_header_per_line() {
                line.push_str(&self.labels[i]);
                line.push_str(self.options.header_data_delimiter());
            }

            match cells.get(i).and_then(Option::as_deref) {
                Some(value) => {
                    let value = if self.options.trim_results() {
                        value.trim()
                    } else {
                        value
                    };
                    if column.is_text() {
                        line.push('"');
                        line.push_str(value);
                        line.push('"');
                    } else {
                        line.push_str(value);
                    }
                }
                // NULL is never quoted, whatever the column type.
                None => line.push_str(self.options.null_text()),
            }

            if i < last {
                line.push_str(self.options.column_delimiter());
            }
        }
        line
    }
}
