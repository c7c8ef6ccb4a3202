// thytom-core/src/application/mod.rs

pub mod engine;
pub mod pipeline;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use thytom_core::application::{run_pipeline, RunOutcome};`
pub use engine::execute_query;
pub use pipeline::{OutputContext, RunOutcome, RunSummary, process_templates, run_pipeline};
