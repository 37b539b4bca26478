use anyhow::Context;
use shared::Error;
use std::fs;
use std::path::{Path, PathBuf};

use domain::entities::Routine;
use domain::services::TaskRepository;

/// The whole routine serialized as one JSON document, rewritten on every save.
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create task store directory")?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).context("Failed to write task store")?;
        fs::rename(&tmp, &self.path).context("Failed to replace task store")?;
        Ok(())
    }
}

impl TaskRepository for JsonTaskStore {
    fn load(&self) -> Result<Routine, Error> {
        if !self.path.exists() {
            return Ok(Routine::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Routine::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, routine: &Routine) -> Result<(), Error> {
        let contents = serde_json::to_string(routine)?;
        self.write_atomic(&contents)
            .map_err(|e| Error::Storage(format!("{:#}", e)))?;
        tracing::debug!(path = %self.path.display(), tasks = routine.len(), "Saved routine");
        Ok(())
    }
}
