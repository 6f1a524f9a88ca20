use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root of all imported dictionaries
    pub fn dictionaries_dir(&self) -> PathBuf {
        self.data_dir.join("Dictionaries")
    }

    /// Persisted catalog record
    pub fn catalog_path(&self) -> PathBuf {
        self.dictionaries_dir().join("config.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
