pub mod bench;
pub mod chart;
pub mod flags;
pub mod report;
pub mod scrape;
pub mod supervisor;

pub use crate::domain::model::{
    BenchReport, ChartData, Comparison, Mode, RunOutcome, RunStatus, StartupTime,
};
pub use crate::domain::ports::{FlagStore, Runner};
pub use crate::utils::error::Result;
