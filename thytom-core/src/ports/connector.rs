// thytom-core/src/ports/connector.rs

// What the pipeline needs from a database, without knowing which engine
// answers. One session, one statement at a time, one open result set at most.

use crate::domain::output::ColumnMeta;
use crate::error::ThytomError;

/// Forward-only cursor over the rows of one result set.
pub trait ResultSetView {
    fn columns(&self) -> &[ColumnMeta];

    /// Next row as per-column text, `None` standing for a database NULL.
    /// Returns `Ok(None)` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Option<String>>>, ThytomError>;
}

pub trait Connector {
    /// Runs a single statement. Select-like statements return their result
    /// set; anything else returns `None`. The previous result set is released
    /// first, which the borrow on `self` enforces for callers.
    fn execute(&mut self, query: &str) -> Result<Option<&mut dyn ResultSetView>, ThytomError>;
}
