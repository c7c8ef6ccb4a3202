// thytom/src/cli.rs
//
// Single source of truth for the CLI definition (Clap structs).

use clap::Parser;
use std::path::PathBuf;
use thytom_core::domain::OptionFlags;

#[derive(Parser, Debug)]
#[command(name = "thytom")]
#[command(
    about = "Runs every SQL template from the sql directory and saves each result set to a text file",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Substitution file: one line per run of every template
    #[arg(short = 'f', long = "subs-file", value_name = "PATH")]
    pub subs_file: Option<PathBuf>,

    /// Column delimiter in result files [default: ;]
    #[arg(short = 'd', long = "col-delim", value_name = "DELIM", allow_hyphen_values = true)]
    pub col_delim: Option<String>,

    /// Write column names as the first line of every result file
    #[arg(short = 's', long = "title-head")]
    pub title_head: bool,

    /// Prefix every value with its column name
    #[arg(short = 'e', long = "head-per-line")]
    pub head_per_line: bool,

    /// Separator between column name and value, implies --head-per-line [default: :]
    #[arg(short = 't', long = "per-line-sep", value_name = "DELIM", allow_hyphen_values = true)]
    pub per_line_sep: Option<String>,

    /// First line of the substitution file names the placeholders
    #[arg(short = 'a', long = "cust-templ")]
    pub cust_templ: bool,

    /// Field delimiter inside the substitution file, implies --cust-templ [default: ;]
    #[arg(short = 'l', long = "templ-sep", value_name = "DELIM", allow_hyphen_values = true)]
    pub templ_sep: Option<String>,

    /// Write NULL values as the text "null"
    #[arg(short = 'n', long = "nulls")]
    pub nulls: bool,

    /// Trim every value of the result
    #[arg(short = 'w', long = "trim-data")]
    pub trim_data: bool,

    /// Trim every value of the substitution file
    #[arg(short = 'c', long = "trim-subs")]
    pub trim_subs: bool,
}

impl Cli {
    /// Flags as supplied; implications are resolved by `Options::from`.
    pub fn into_flags(self) -> OptionFlags {
        OptionFlags {
            substitution_file: self.subs_file,
            column_delimiter: self.col_delim,
            title_header: self.title_head,
            header_per_line: self.head_per_line,
            header_data_delimiter: self.per_line_sep,
            custom_templates: self.cust_templ,
            templates_delimiter: self.templ_sep,
            render_null: self.nulls,
            trim_results: self.trim_data,
            trim_substitutions: self.trim_subs,
        }
    }
}
