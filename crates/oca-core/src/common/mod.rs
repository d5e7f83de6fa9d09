pub mod config;
pub mod constants;

pub use config::{FormulaVariant, RunConfig, RunConfigError, load_run_config};
