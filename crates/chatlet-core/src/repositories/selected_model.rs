use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::{RepositoryError, RepositoryResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persisted store for the single surviving piece of cross-reload state: the
/// last-selected model identifier.
pub trait SelectedModelRepository: Send + Sync + 'static {
    /// Load the persisted selection, if any.
    fn load(&self) -> BoxFuture<'static, RepositoryResult<Option<String>>>;

    /// Persist a new selection.
    fn save(&self, model: String) -> BoxFuture<'static, RepositoryResult<()>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SelectedModelRecord {
    selected_model: String,
}

/// JSON-file repository under the XDG config directory.
pub struct JsonSelectedModelRepository {
    file_path: PathBuf,
}

impl JsonSelectedModelRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> RepositoryResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepositoryError::InitializationError {
            message: "Cannot determine config directory".into(),
        })?;

        let file_path = config_dir.join("chatlet").join("selected_model.json");
        Ok(Self { file_path })
    }

    /// Create repository with an explicit path (tests, custom hosts).
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl SelectedModelRepository for JsonSelectedModelRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<Option<String>>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Ok(None);
            }

            let contents = tokio::fs::read_to_string(&path).await?;
            let record: SelectedModelRecord = serde_json::from_str(&contents)?;
            Ok(Some(record.selected_model))
        })
    }

    fn save(&self, model: String) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            let record = SelectedModelRecord {
                selected_model: model,
            };
            let json = serde_json::to_string_pretty(&record)?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Write atomically using temp file + rename
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, &json).await?;
            tokio::fs::rename(&temp_path, &path).await?;

            Ok(())
        })
    }
}

/// Non-persisting repository, used when no config directory is available and
/// by tests.
#[derive(Default)]
pub struct InMemorySelectedModelRepository {
    value: Mutex<Option<String>>,
}

impl InMemorySelectedModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_string())),
        }
    }
}

impl SelectedModelRepository for InMemorySelectedModelRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<Option<String>>> {
        let value = self.value.lock().clone();
        Box::pin(async move { Ok(value) })
    }

    fn save(&self, model: String) -> BoxFuture<'static, RepositoryResult<()>> {
        *self.value.lock() = Some(model);
        Box::pin(async move { Ok(()) })
    }
}
