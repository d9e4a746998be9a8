use crate::domain::model::{Mode, RunOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the server's configuration text lives.
pub trait FlagStore: Send + Sync {
    fn read_config(&self) -> impl std::future::Future<Output = Result<String>> + Send;
    fn write_config(&self, content: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn describe(&self) -> String;
}

/// Starts the server once and reports how long it took to come up.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, mode: Mode) -> Result<RunOutcome>;
}
