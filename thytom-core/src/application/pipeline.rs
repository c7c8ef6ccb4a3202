// thytom-core/src/application/pipeline.rs

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

use crate::application::engine::execute_query;
use crate::error::ThytomError;
use crate::ports::connector::Connector;

// Domain
use crate::domain::charset::Charset;
use crate::domain::config::Config;
use crate::domain::options::Options;
use crate::domain::output::NO_SUBSTITUTION_ROW_ID;
use crate::domain::substitution::Substitutions;

// Infrastructure
use crate::infrastructure::adapters::{DuckDbExecutor, discover_extensions};
use crate::infrastructure::layout::Layout;
use crate::infrastructure::substitution_file::SubstitutionSource;
use crate::infrastructure::templates::{QueryTemplate, TemplateSet};
use crate::infrastructure::writer::ResultWriter;

/// Counters for one run. Failures here were logged and skipped, not fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub templates_processed: usize,
    pub templates_skipped: usize,
    pub queries_executed: usize,
    pub queries_failed: usize,
    pub files_written: usize,
    pub write_failures: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.templates_skipped + self.queries_failed + self.write_failures > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} templates processed ({} skipped), {} queries executed ({} failed), {} result files written ({} failed) in {:.2?}",
            self.templates_processed,
            self.templates_skipped,
            self.queries_executed,
            self.queries_failed,
            self.files_written,
            self.write_failures,
            self.elapsed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The `sql` directory had nothing to run.
    NoTemplates,
    Completed(RunSummary),
}

/// Where and how result files are written.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext<'a> {
    pub options: &'a Options,
    pub charset: Charset,
    pub out_dir: &'a Path,
}

/// The whole run: templates, substitution rows, one DuckDB session.
#[instrument(skip_all, fields(home = %layout.home().display()))]
pub fn run_pipeline(
    options: &Options,
    config: &Config,
    layout: &Layout,
) -> Result<RunOutcome, ThytomError> {
    let start = Instant::now();

    let template_set = TemplateSet::new(layout.sql_dir(), config.sql_charset);
    if !template_set.has_templates() {
        eprintln!("No sql queries found in \"sql\" directory");
        return Ok(RunOutcome::NoTemplates);
    }
    let mut templates = template_set.templates();

    let mut substitutions = match options.substitution_file_path() {
        Some(path) => Some(SubstitutionSource::open(
            path,
            options,
            config.substitution_charset,
        )?),
        None => None,
    };

    eprintln!("Connecting to {}", config.url);
    let extensions = discover_extensions(layout.lib_dir());
    let mut executor = DuckDbExecutor::connect(config, &extensions)?;

    let output = OutputContext {
        options,
        charset: config.result_charset,
        out_dir: layout.out_dir(),
    };
    let mut summary = process_templates(
        &mut executor,
        &mut templates,
        substitutions.as_mut(),
        output,
    )?;

    if let Some(source) = substitutions.as_mut() {
        source.close();
    }
    executor.close();

    summary.elapsed = start.elapsed();
    info!(%summary, "Run finished");
    Ok(RunOutcome::Completed(summary))
}

/// Runs every template, once or once per substitution row.
///
/// Query and write failures are logged and counted. Only substitution file
/// read errors abort the run.
pub fn process_templates(
    connector: &mut dyn Connector,
    templates: &mut [QueryTemplate],
    mut substitutions: Option<&mut SubstitutionSource>,
    output: OutputContext<'_>,
) -> Result<RunSummary, ThytomError> {
    let mut summary = RunSummary::default();
    let total = templates.len();

    for (index, template) in templates.iter_mut().enumerate() {
        let file_name = template.file_name();
        eprintln!("Processing file {} [{}/{}]...", file_name, index + 1, total);

        // Read errors surface here, before the database is involved.
        if let Err(e) = template.load() {
            eprintln!("{}", e);
            error!(file = %file_name, error = %e, "Template skipped");
            summary.templates_skipped += 1;
            continue;
        }

        match substitutions.as_deref_mut() {
            None => {
                run_single(
                    connector,
                    template,
                    &Substitutions::new(),
                    NO_SUBSTITUTION_ROW_ID,
                    output,
                    &mut summary,
                )?;
            }
            Some(source) => {
                // Every template sees every row.
                if index > 0 {
                    source.rewind()?;
                }
                let mut rows = 0usize;
                while let Some(row) = source.next_row()? {
                    let row_id = row.row_id();
                    eprint!("[{}]", row_id);
                    run_single(
                        connector,
                        template,
                        &row.substitutions,
                        &row_id,
                        output,
                        &mut summary,
                    )?;
                    rows += 1;
                }
                eprintln!();
                eprintln!("{} substitution rows processed", rows);
            }
        }

        template.release();
        summary.templates_processed += 1;
    }

    Ok(summary)
}

fn run_single(
    connector: &mut dyn Connector,
    template: &mut QueryTemplate,
    substitutions: &Substitutions,
    row_id: &str,
    output: OutputContext<'_>,
    summary: &mut RunSummary,
) -> Result<(), ThytomError> {
    let file_name = template.file_name();
    let query = template.render(substitutions)?;
    summary.queries_executed += 1;

    let rows = match execute_query(connector, &query) {
        Ok(Some(rows)) => rows,
        Ok(None) => return Ok(()),
        Err(e) => {
            let cause = match &e {
                ThytomError::Query(source) => source.to_string(),
                other => other.to_string(),
            };
            eprintln!("Unable to execute query from file {}: {}", file_name, cause);
            error!(file = %file_name, row_id, error = %e, "Query failed");
            summary.queries_failed += 1;
            return Ok(());
        }
    };

    let writer = ResultWriter::new(
        output.options,
        output.charset,
        output.out_dir,
        row_id,
        &file_name,
    );
    match writer.write(rows) {
        Ok(_) => summary.files_written += 1,
        Err(e) => {
            eprintln!("{}", e);
            error!(path = %writer.path().display(), error = %e, "Result not saved");
            summary.write_failures += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::options::OptionFlags;
    use crate::domain::output::LINE_SEPARATOR;
    use anyhow::Result;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn sql_dir(files: &[(&str, &str)]) -> Result<TempDir> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sql"))?;
        for (name, content) in files {
            fs::write(dir.path().join("sql").join(name), content)?;
        }
        Ok(dir)
    }

    fn seeded() -> Result<DuckDbExecutor> {
        let mut executor = DuckDbExecutor::open_in_memory()?;
        executor.execute("CREATE TABLE users (id INTEGER, name VARCHAR)")?;
        executor.execute("INSERT INTO users VALUES (1, 'ann'), (2, 'bob')")?;
        Ok(executor)
    }

    #[test]
    fn test_without_substitutions_writes_out_files() -> Result<()> {
        let home = sql_dir(&[("a.sql", "select name from users order by id")])?;
        let out = home.path().join("out");
        let mut executor = seeded()?;
        let options = Options::default();
        let mut templates = TemplateSet::new(home.path().join("sql"), Charset::utf_8()).templates();

        let output = OutputContext {
            options: &options,
            charset: Charset::utf_8(),
            out_dir: &out,
        };
        let summary = process_templates(&mut executor, &mut templates, None, output)?;

        assert_eq!(summary.templates_processed, 1);
        assert_eq!(summary.files_written, 1);
        assert_eq!(
            fs::read_to_string(out.join("out_a.txt"))?,
            ["\"ann\"", "\"bob\""].join(LINE_SEPARATOR)
        );
        assert!(!templates[0].is_loaded());
        Ok(())
    }

    #[test]
    fn test_every_template_sees_every_row() -> Result<()> {
        let home = sql_dir(&[
            ("a.sql", "select name from users where id = {PARAM}"),
            ("b.sql", "select id from users where id = {PARAM}"),
        ])?;
        let subs = home.path().join("ids.txt");
        fs::write(&subs, "1\n2\n")?;
        let out = home.path().join("out");

        let options = Options::from(OptionFlags {
            substitution_file: Some(subs.clone()),
            ..Default::default()
        });
        let mut source = SubstitutionSource::open(&subs, &options, Charset::utf_8())?;
        let mut executor = seeded()?;
        let mut templates = TemplateSet::new(home.path().join("sql"), Charset::utf_8()).templates();

        let output = OutputContext {
            options: &options,
            charset: Charset::utf_8(),
            out_dir: &out,
        };
        let summary = process_templates(&mut executor, &mut templates, Some(&mut source), output)?;

        assert_eq!(summary.queries_executed, 4);
        assert_eq!(summary.files_written, 4);
        assert_eq!(fs::read_to_string(out.join("1_1_a.txt"))?, "\"ann\"");
        assert_eq!(fs::read_to_string(out.join("2_2_a.txt"))?, "\"bob\"");
        assert_eq!(fs::read_to_string(out.join("1_1_b.txt"))?, "1");
        assert_eq!(fs::read_to_string(out.join("2_2_b.txt"))?, "2");
        Ok(())
    }

    #[test]
    fn test_failures_are_counted_not_fatal() -> Result<()> {
        let home = sql_dir(&[
            ("a_broken.sql", "select * from missing_table"),
            ("b_update.sql", "update users set name = 'carl' where id = 2"),
            ("c_ok.sql", "select name from users where id = 2"),
        ])?;
        let out = home.path().join("out");
        let mut executor = seeded()?;
        let options = Options::default();

        let mut templates = TemplateSet::new(home.path().join("sql"), Charset::utf_8()).templates();
        templates.insert(1, QueryTemplate::new(home.path().join("gone.sql"), Charset::utf_8()));

        let output = OutputContext {
            options: &options,
            charset: Charset::utf_8(),
            out_dir: &out,
        };
        let summary = process_templates(&mut executor, &mut templates, None, output)?;

        assert_eq!(summary.templates_processed, 3);
        assert_eq!(summary.templates_skipped, 1);
        assert_eq!(summary.queries_executed, 3);
        assert_eq!(summary.queries_failed, 1);
        assert_eq!(summary.files_written, 1);
        assert!(summary.has_failures());
        assert!(!out.join("out_a_broken.txt").exists());
        assert!(!out.join("out_b_update.txt").exists());
        assert_eq!(fs::read_to_string(out.join("out_c_ok.txt"))?, "\"carl\"");
        Ok(())
    }

    #[test]
    fn test_write_failure_is_counted() -> Result<()> {
        let home = sql_dir(&[("a.sql", "select 1 as x")])?;
        // A regular file where the output directory should be.
        let out = home.path().join("out");
        fs::write(&out, "")?;
        let mut executor = seeded()?;
        let options = Options::default();
        let mut templates = TemplateSet::new(home.path().join("sql"), Charset::utf_8()).templates();

        let output = OutputContext {
            options: &options,
            charset: Charset::utf_8(),
            out_dir: &out,
        };
        let summary = process_templates(&mut executor, &mut templates, None, output)?;
        assert_eq!(summary.write_failures, 1);
        assert_eq!(summary.files_written, 0);
        Ok(())
    }

    #[test]
    fn test_run_pipeline_shares_one_session() -> Result<()> {
        let home = sql_dir(&[
            ("1_create.sql", "create table t as select 'x' as v"),
            ("2_read.sql", "select v from t"),
        ])?;
        let layout = Layout::from_home(home.path());

        let outcome = run_pipeline(&Options::default(), &Config::for_url(":memory:"), &layout)?;
        let summary = match outcome {
            RunOutcome::Completed(summary) => summary,
            other => panic!("expected a completed run, got {other:?}"),
        };
        assert_eq!(summary.files_written, 1);
        assert!(!summary.has_failures());
        assert_eq!(fs::read_to_string(layout.out_dir().join("out_2_read.txt"))?, "\"x\"");
        Ok(())
    }

    #[test]
    fn test_run_pipeline_without_templates() -> Result<()> {
        let home = tempdir()?;
        let layout = Layout::from_home(home.path());

        let outcome = run_pipeline(&Options::default(), &Config::for_url(":memory:"), &layout)?;
        assert_eq!(outcome, RunOutcome::NoTemplates);
        assert!(!layout.out_dir().exists());
        Ok(())
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            templates_processed: 2,
            queries_executed: 5,
            queries_failed: 1,
            files_written: 4,
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("2 templates processed (0 skipped), 5 queries executed (1 failed)"));
    }
}
