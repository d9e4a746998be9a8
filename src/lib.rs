pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalFlagFile, toml_config::BenchConfig};
pub use core::{bench::BenchEngine, supervisor::ServerRunner};
pub use utils::error::{BenchError, Result};
