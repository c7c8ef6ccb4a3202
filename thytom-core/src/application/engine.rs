// thytom-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::error::ThytomError;
use crate::ports::connector::{Connector, ResultSetView};

/// Runs one statement with logging and timing around it.
#[instrument(skip(connector, query), fields(query.len = query.len()))]
pub fn execute_query<'c>(
    connector: &'c mut dyn Connector,
    query: &str,
) -> Result<Option<&'c mut dyn ResultSetView>, ThytomError> {
    let start = Instant::now();
    debug!("⚡ Executing Query: {}", query);

    let result = connector.execute(query);
    let duration = start.elapsed();

    match result {
        Ok(rows) => {
            debug!(
                returns_rows = rows.is_some(),
                "✅ Query finished in {:.2?}", duration
            );
            Ok(rows)
        }
        Err(e) => {
            error!("❌ Query failed after {:.2?}: {}", duration, e);
            Err(e)
        }
    }
}
