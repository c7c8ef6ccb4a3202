// thytom-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// What the pipeline needs from a database session (Connector, ResultSetView).
pub mod ports;

// 2. Domain
// Options, configuration values, substitution rows, output formatting.
// Depends on nothing but the standard library and encoding tables.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, properties file, template and substitution files, result files.
pub mod infrastructure;

// 4. Application (Use Cases)
// The batch run itself.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ThytomError;
