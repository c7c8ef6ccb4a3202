// thytom-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;
pub mod layout;
pub mod substitution_file;
pub mod templates;
pub mod writer;
