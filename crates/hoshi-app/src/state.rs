use std::sync::Arc;

use hoshi_config::Config;
use hoshi_dictionary::DictionaryStore;
use hoshi_lang_japanese::JapaneseProcessor;

pub struct AppState {
    pub config: Config,
    pub store: Arc<DictionaryStore>,
    pub processor: JapaneseProcessor,
}

impl AppState {
    /// Restores the persisted catalog from the configured data directory
    pub fn new(config: Config) -> Self {
        let store = Arc::new(DictionaryStore::open(config.storage.clone()));
        let processor = JapaneseProcessor::new(Arc::clone(&store), config.lookup.clone());

        Self {
            config,
            store,
            processor,
        }
    }
}
