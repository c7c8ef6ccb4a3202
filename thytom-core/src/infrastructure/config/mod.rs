// thytom-core/src/infrastructure/config/mod.rs

pub mod loader;

pub use loader::load_config;
