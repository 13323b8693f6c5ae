use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use chatlet_core::services::ModelSource;

/// Model list loaded from a local JSON string array, the file also served at
/// `/models.json`.
pub struct FileModelSource {
    path: PathBuf,
}

impl FileModelSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ModelSource for FileModelSource {
    async fn load(&self) -> Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a JSON string array", self.path.display()))
    }
}
