use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Source of the available-models list, consumed once at startup.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Load the ordered list of model identifiers.
    async fn load(&self) -> Result<Vec<String>>;
}

/// Loads the model list from a static JSON resource (an array of strings).
pub struct HttpModelSource {
    client: reqwest::Client,
    url: String,
}

impl HttpModelSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ModelSource for HttpModelSource {
    async fn load(&self) -> Result<Vec<String>> {
        debug!(url = %self.url, "loading model list");
        let models = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("model list request failed")?
            .error_for_status()
            .context("model list request rejected")?
            .json::<Vec<String>>()
            .await
            .context("model list is not a JSON array of strings")?;
        Ok(models)
    }
}

/// Pick the effective selection: the persisted value if it is still a member
/// of the freshly loaded list, otherwise the first entry.
pub fn resolve_selection(models: &[String], persisted: Option<&str>) -> Option<String> {
    if let Some(persisted) = persisted
        && models.iter().any(|m| m == persisted)
    {
        return Some(persisted.to_string());
    }
    models.first().cloned()
}
