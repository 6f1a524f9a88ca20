use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::lookup::LookupConfig;
use self::storage::StorageConfig;

pub mod dictionary;
pub mod lookup;
pub mod storage;

pub use dictionary::{CatalogRecord, DictionaryConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub lookup: LookupConfig,
}

impl Config {
    pub fn new() -> Self {
        let mut storage = StorageConfig::default();
        if let Ok(dir) = env::var("HOSHI_DATA_DIR") {
            storage.data_dir = PathBuf::from(dir);
        }

        let mut lookup = LookupConfig::default();
        if let Some(max_results) = env_parse("HOSHI_MAX_RESULTS") {
            lookup.max_results = max_results;
        }
        if let Some(scan_length) = env_parse("HOSHI_SCAN_LENGTH") {
            lookup.scan_length = scan_length;
        }
        if let Some(depth) = env_parse("HOSHI_MAX_DEINFLECTION_DEPTH") {
            lookup.max_deinflection_depth = depth;
        }

        Config {
            storage,
            lookup: lookup.sanitized(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
