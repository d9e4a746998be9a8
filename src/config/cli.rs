use crate::core::FlagStore;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// The server's YAML config on the local disk (`metal.yml` next to the jar).
#[derive(Debug, Clone)]
pub struct LocalFlagFile {
    path: PathBuf,
}

impl LocalFlagFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlagStore for LocalFlagFile {
    async fn read_config(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(content)
    }

    async fn write_config(&self, content: &str) -> Result<()> {
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
