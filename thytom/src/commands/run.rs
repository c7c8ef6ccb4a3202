// thytom/src/commands/run.rs
//
// USE CASE: Run every template against the configured database.

use tracing::info;

use thytom_core::ThytomError;
use thytom_core::application::{RunOutcome, run_pipeline};
use thytom_core::domain::Options;
use thytom_core::infrastructure::config::load_config;
use thytom_core::infrastructure::layout::Layout;

use crate::cli::Cli;

pub fn execute(cli: Cli) -> Result<(), ThytomError> {
    // A. Options from the command line
    let options = Options::from(cli.into_flags());
    options.validate()?;

    // B. Home directory and thytom.properties
    let layout = Layout::discover();
    let config = load_config(&layout.config_file())?;
    info!(
        sql = %config.sql_charset,
        subs = %config.substitution_charset,
        result = %config.result_charset,
        "File encodings"
    );

    // C. The run itself
    match run_pipeline(&options, &config, &layout)? {
        RunOutcome::NoTemplates => {}
        RunOutcome::Completed(summary) if summary.has_failures() => {
            println!("⚠️  Finished with errors: {}", summary);
        }
        RunOutcome::Completed(summary) => {
            println!("✨ Done: {}", summary);
        }
    }
    Ok(())
}
