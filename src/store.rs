//! Durable storage for the trained model.
//!
//! The fitted pipeline is written as a bincode artifact with a sibling
//! JSON metadata record (version, timestamp, accuracy, category list) in
//! one directory. Saves overwrite wholesale; no history is kept. A load
//! failure at startup is logged and treated as "no model available", never
//! as a startup failure.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::classifier::TrainedModel;
use crate::error::{CategorizerError, Result};

const MODEL_FILE: &str = "expense_categorizer.model";
const METADATA_FILE: &str = "model_metadata.json";

/// Metadata persisted next to the model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_version: String,
    pub last_trained: Option<chrono::DateTime<chrono::Utc>>,
    pub accuracy: Option<f64>,
    pub categories: Vec<String>,
}

/// Persists and restores trained models under a fixed directory.
#[derive(Debug)]
pub struct ModelStore {
    dir: PathBuf,
    // Serializes writers so concurrent saves cannot interleave.
    write_lock: Mutex<()>,
}

impl ModelStore {
    /// Open a store rooted at `dir`, creating the directory if absent.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Persist the model artifact and its metadata, overwriting any
    /// previous state.
    pub fn save(&self, model: &TrainedModel) -> Result<()> {
        let _guard = self.write_lock.lock();

        let artifact = bincode::serialize(model)
            .map_err(|e| CategorizerError::persistence(format!("encode model: {e}")))?;
        fs::write(self.model_path(), artifact)
            .map_err(|e| CategorizerError::persistence(format!("write model artifact: {e}")))?;

        let metadata = ModelMetadata {
            model_version: model.version.clone(),
            last_trained: model.trained_at,
            accuracy: model.accuracy,
            categories: Category::labels(),
        };
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(self.metadata_path(), json)
            .map_err(|e| CategorizerError::persistence(format!("write model metadata: {e}")))?;

        info!("model saved to {}", self.model_path().display());
        Ok(())
    }

    /// Restore the persisted model, if both the artifact and metadata are
    /// present and readable. Any read or decode error yields `None`.
    pub fn load(&self) -> Option<TrainedModel> {
        let model_path = self.model_path();
        let metadata_path = self.metadata_path();
        if !model_path.exists() || !metadata_path.exists() {
            info!("no persisted model found; rule-based fallback only");
            return None;
        }

        let artifact = match fs::read(&model_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to read model artifact: {e}");
                return None;
            }
        };
        let mut model: TrainedModel = match bincode::deserialize(&artifact) {
            Ok(model) => model,
            Err(e) => {
                warn!("failed to decode model artifact: {e}");
                return None;
            }
        };

        // The metadata file is authoritative for the audit fields.
        match fs::read_to_string(&metadata_path)
            .map_err(CategorizerError::from)
            .and_then(|json| serde_json::from_str::<ModelMetadata>(&json).map_err(Into::into))
        {
            Ok(metadata) => {
                model.version = metadata.model_version;
                model.trained_at = metadata.last_trained;
                model.accuracy = metadata.accuracy;
            }
            Err(e) => {
                warn!("failed to read model metadata: {e}");
                return None;
            }
        }

        info!("model loaded, version {}", model.version);
        Some(model)
    }
}
