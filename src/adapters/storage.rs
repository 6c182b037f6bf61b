use crate::domain::model::Snapshot;
use crate::domain::ports::SnapshotStore;
use crate::utils::error::{Result, WatchError};
use std::path::{Path, PathBuf};

/// Snapshot kept as a pretty-printed JSON file.
///
/// Saves go to a sibling temp file that is then renamed over the target, so a crash
/// mid-write leaves the previous snapshot intact. No locking: one run at a time.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, message: impl std::fmt::Display) -> WatchError {
        WatchError::StoreError {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("📭 No previous snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.store_error(e)),
        };

        match serde_json::from_slice::<Snapshot>(&data) {
            Ok(snapshot) => {
                tracing::debug!(
                    "Loaded snapshot from {} with {} cell(s)",
                    snapshot.taken_at,
                    snapshot.cells.len()
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                // 壞掉的檔案當作沒有，下一次儲存會覆蓋掉
                tracing::warn!(
                    "⚠️ Could not parse snapshot {}: {}; treating as missing",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.store_error(e))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| self.store_error(e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.store_error(e))?;

        tracing::debug!("Snapshot with {} cell(s) written to {}", snapshot.cells.len(), self.path.display());
        Ok(())
    }
}
