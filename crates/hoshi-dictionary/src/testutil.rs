//! Builders for Yomitan archives and scratch stores used by tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use hoshi_config::storage::StorageConfig;
use hoshi_core::dictionary::{DictionaryInfo, DictionaryType};
use serde_json::{Value, json};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use crate::store::DictionaryStore;

/// In-memory description of a dictionary archive
pub struct ArchiveBuilder {
    files: Vec<(String, String)>,
}

impl ArchiveBuilder {
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// Archive with a format 3 manifest
    pub fn new(title: &str) -> Self {
        Self::empty().file(
            "index.json",
            json!({"title": title, "revision": "test", "format": 3, "sequenced": true}).to_string(),
        )
    }

    pub fn file(mut self, name: &str, contents: impl Into<String>) -> Self {
        self.files.push((name.to_string(), contents.into()));
        self
    }

    pub fn term_bank(self, number: u32, records: Value) -> Self {
        self.file(&format!("term_bank_{number}.json"), records.to_string())
    }

    pub fn meta_bank(self, number: u32, records: Value) -> Self {
        self.file(&format!("term_meta_bank_{number}.json"), records.to_string())
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let file = File::create(path).expect("create archive");
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in &self.files {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .expect("start zip entry");
            zip.write_all(contents.as_bytes()).expect("write zip entry");
        }
        zip.finish().expect("finish archive");
        path.to_path_buf()
    }
}

/// Term bank record with the fields tests care about
pub fn term(expression: &str, reading: &str, rules: &str, glossary: &str, sequence: i64) -> Value {
    json!([expression, reading, "", rules, 0, [glossary], sequence, ""])
}

pub fn frequency(expression: &str, reading: &str, value: i64) -> Value {
    json!([expression, "freq", {"reading": reading, "frequency": {"value": value, "displayValue": value.to_string()}}])
}

pub fn pitch(expression: &str, reading: &str, positions: &[u32]) -> Value {
    let pitches: Vec<Value> = positions.iter().map(|p| json!({"position": p})).collect();
    json!([expression, "pitch", {"reading": reading, "pitches": pitches}])
}

/// Store rooted in a temporary directory, removed on drop
pub struct TestStore {
    pub dir: TempDir,
    pub store: DictionaryStore,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DictionaryStore::new(StorageConfig::new(dir.path().join("data")));
        Self { dir, store }
    }

    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes the archive and imports it, panicking on failure
    pub fn import(&self, archive: ArchiveBuilder, kind: DictionaryType) -> DictionaryInfo {
        let path = archive.write(&self.archive_path(&format!("{}.zip", uuid::Uuid::new_v4())));
        self.store.import_dictionary(&path, kind).expect("import")
    }

    /// A second store over the same directory, as after a restart
    pub fn reopen(&self) -> DictionaryStore {
        DictionaryStore::open(self.store.storage().clone())
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
