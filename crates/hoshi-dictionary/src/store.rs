use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use hoshi_config::DictionaryConfig;
use hoshi_config::storage::StorageConfig;
use hoshi_core::dictionary::{DictionaryInfo, DictionaryType};
use hoshi_core::error::{CatalogError, ImportError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::index::{DictionaryIndex, FrequencyIndex, PitchIndex, TermIndex};
use crate::loaders::YomitanArchive;
use crate::loaders::yomitan::check_cancelled;
use crate::persist::{self, StagingDir};
use crate::types::StoredDictionary;

/// Fully committed catalog state. Lookups hold on to one snapshot for their
/// whole duration.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    catalog: Catalog,
    indices: HashMap<Uuid, Arc<DictionaryIndex>>,
    custom_css: String,
}

impl Snapshot {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn custom_css(&self) -> &str {
        &self.custom_css
    }

    /// None when the dictionary's data failed to load
    pub fn index(&self, info: &DictionaryInfo) -> Option<&DictionaryIndex> {
        self.indices.get(&info.id).map(Arc::as_ref)
    }

    pub fn term_index(&self, info: &DictionaryInfo) -> Option<&TermIndex> {
        self.index(info).and_then(DictionaryIndex::as_term)
    }

    pub fn frequency_index(&self, info: &DictionaryInfo) -> Option<&FrequencyIndex> {
        self.index(info).and_then(DictionaryIndex::as_frequency)
    }

    pub fn pitch_index(&self, info: &DictionaryInfo) -> Option<&PitchIndex> {
        self.index(info).and_then(DictionaryIndex::as_pitch)
    }
}

/// Held while an import runs; a second import fails fast instead of queuing
pub struct ImportGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns the dictionary catalog and the loaded indices
pub struct DictionaryStore {
    storage: StorageConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes catalog mutations
    mutation: Mutex<()>,
    importing: AtomicBool,
}

impl DictionaryStore {
    /// Empty store; call `load_dictionaries` to restore persisted state
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            mutation: Mutex::new(()),
            importing: AtomicBool::new(false),
        }
    }

    pub fn open(storage: StorageConfig) -> Self {
        let store = Self::new(storage);
        store.load_dictionaries();
        store
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn dictionaries(&self, kind: DictionaryType) -> Vec<DictionaryInfo> {
        self.snapshot().catalog.dictionaries(kind).to_vec()
    }

    pub fn custom_css(&self) -> String {
        self.snapshot().custom_css.clone()
    }

    pub fn is_importing(&self) -> bool {
        self.importing.load(Ordering::Acquire)
    }

    /// Claims the single import slot
    pub fn begin_import(&self) -> Result<ImportGuard<'_>, ImportError> {
        self.importing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImportError::ImportInProgress)?;
        Ok(ImportGuard {
            flag: &self.importing,
        })
    }

    fn type_dir(&self, kind: DictionaryType) -> PathBuf {
        self.storage.dictionaries_dir().join(kind.as_str())
    }

    fn lock_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    fn persist(&self, snapshot: &Snapshot) -> io::Result<()> {
        let config = snapshot.catalog.to_config(&snapshot.custom_css);
        let json = config.to_json().map_err(io::Error::other)?;
        persist::write_atomic(&self.storage.catalog_path(), json.as_bytes())
    }

    /// Applies `f` to a copy of the current state, persists the result and
    /// publishes it. Nothing changes if `f` or the write fails.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let _lock = self.lock_mutation();
        let mut next = Snapshot::clone(&self.snapshot());
        let value = f(&mut next)?;
        self.persist(&next)?;
        self.publish(next);
        Ok(value)
    }

    /// Restores catalog and indices from disk. Malformed records are
    /// skipped; dictionaries whose data cannot be read stay listed but
    /// contribute nothing to lookups.
    pub fn load_dictionaries(&self) {
        let _lock = self.lock_mutation();
        let catalog_path = self.storage.catalog_path();

        let config = match fs::read_to_string(&catalog_path) {
            Ok(json) => DictionaryConfig::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable catalog {}: {}", catalog_path.display(), e);
                DictionaryConfig::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => DictionaryConfig::default(),
            Err(e) => {
                tracing::warn!("Failed to read catalog {}: {}", catalog_path.display(), e);
                DictionaryConfig::default()
            }
        };

        let mut snapshot = Snapshot {
            custom_css: config.custom_css.clone(),
            ..Snapshot::default()
        };

        for kind in DictionaryType::ALL {
            let type_dir = self.type_dir(kind);
            persist::sweep_staging(&type_dir);

            let mut records = config.records(kind).to_vec();
            records.sort_by_key(|record| record.order);

            for record in records {
                if !persist::is_safe_file_name(&record.file_name) {
                    tracing::warn!("Skipping {} dictionary with invalid name {:?}", kind, record.file_name);
                    continue;
                }
                if snapshot.catalog.contains_file(kind, &record.file_name) {
                    tracing::warn!("Skipping duplicate {} dictionary {}", kind, record.file_name);
                    continue;
                }

                let path = type_dir.join(&record.file_name);
                let (name, index) = match persist::read_dictionary(&path) {
                    Ok(stored) if stored.content.kind() == kind => {
                        let index = DictionaryIndex::from_content(stored.content);
                        (stored.title, Some(index))
                    }
                    Ok(stored) => {
                        tracing::warn!(
                            "Dictionary {} holds {} data, expected {}",
                            record.file_name,
                            stored.content.kind(),
                            kind
                        );
                        (stored.title, None)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {} dictionary {}: {}", kind, record.file_name, e);
                        (record.file_name.clone(), None)
                    }
                };

                let mut info = DictionaryInfo::new(name, record.file_name, path, kind);
                info.is_enabled = record.is_enabled;
                let info = snapshot.catalog.push(info);
                if let Some(index) = index {
                    snapshot.indices.insert(info.id, Arc::new(index));
                }
            }
        }

        tracing::info!(
            "Loaded {} term, {} frequency, {} pitch dictionaries",
            snapshot.catalog.len(DictionaryType::Term),
            snapshot.catalog.len(DictionaryType::Frequency),
            snapshot.catalog.len(DictionaryType::Pitch),
        );

        self.publish(snapshot);
    }

    /// Imports a Yomitan archive. All-or-nothing: on error the catalog, its
    /// file and the dictionaries folder are left as they were.
    pub fn import_dictionary(
        &self,
        archive_path: &Path,
        kind: DictionaryType,
    ) -> Result<DictionaryInfo, ImportError> {
        self.import_with_cancel(archive_path, kind, &CancellationToken::new())
    }

    /// Like `import_dictionary`, but gives up with `Cancelled` once `cancel`
    /// fires. Cancellation is honored up to the catalog commit.
    pub fn import_with_cancel(
        &self,
        archive_path: &Path,
        kind: DictionaryType,
        cancel: &CancellationToken,
    ) -> Result<DictionaryInfo, ImportError> {
        check_cancelled(cancel)?;
        let _guard = self.begin_import()?;
        tracing::info!("Importing {} dictionary from {}", kind, archive_path.display());

        let mut archive = YomitanArchive::open(archive_path)?;
        let (manifest, manifest_json) = archive.manifest()?;

        let file_name = persist::file_name_for(&manifest.title);
        if self.snapshot().catalog.contains_file(kind, &file_name) {
            return Err(ImportError::DuplicateDictionary(manifest.title));
        }

        let content = archive.read_content(kind, cancel)?;
        let entry_count = content.len();
        let stored = StoredDictionary {
            title: manifest.title.clone(),
            revision: manifest.revision.clone(),
            content,
        };

        let type_dir = self.type_dir(kind);
        let staging = StagingDir::create(&type_dir)?;
        persist::write_dictionary(staging.path(), &manifest_json, &stored)?;
        check_cancelled(cancel)?;

        let index = DictionaryIndex::from_content(stored.content);
        let target = type_dir.join(&file_name);

        let info = {
            let _lock = self.lock_mutation();
            check_cancelled(cancel)?;

            let mut next = Snapshot::clone(&self.snapshot());
            if next.catalog.contains_file(kind, &file_name) {
                return Err(ImportError::DuplicateDictionary(stored.title));
            }
            if target.exists() {
                // Not in the catalog, so left behind by an interrupted import
                tracing::warn!("Replacing orphaned dictionary folder {}", target.display());
                fs::remove_dir_all(&target)?;
            }
            let installed = staging.install(&target)?;

            let info = DictionaryInfo::new(stored.title, file_name, target, kind);
            let info = next.catalog.push(info);
            next.indices.insert(info.id, Arc::new(index));
            self.persist(&next)?;
            installed.commit();
            self.publish(next);
            info
        };

        tracing::info!(
            "Imported {} dictionary {} ({} entries) at order {}",
            kind,
            info.name,
            entry_count,
            info.order
        );
        Ok(info)
    }

    /// Runs the import on the blocking pool. Dropping the returned future
    /// before it resolves cancels the import, leaving nothing behind.
    pub async fn import_in_background(
        self: Arc<Self>,
        archive_path: PathBuf,
        kind: DictionaryType,
    ) -> Result<DictionaryInfo, ImportError> {
        let cancel = CancellationToken::new();
        let _abandon = cancel.clone().drop_guard();

        tokio::task::spawn_blocking(move || self.import_with_cancel(&archive_path, kind, &cancel))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Import task failed: {e}");
                Err(ImportError::Cancelled)
            })
    }

    pub fn toggle_dictionary(
        &self,
        order: usize,
        enabled: bool,
        kind: DictionaryType,
    ) -> Result<(), CatalogError> {
        self.mutate(|snapshot| snapshot.catalog.toggle(order, enabled, kind))?;
        tracing::debug!("Set {} dictionary {} enabled={}", kind, order, enabled);
        Ok(())
    }

    pub fn move_dictionary(
        &self,
        from: usize,
        to: usize,
        kind: DictionaryType,
    ) -> Result<(), CatalogError> {
        self.mutate(|snapshot| snapshot.catalog.move_dictionary(from, to, kind))?;
        tracing::debug!("Moved {} dictionary {} -> {}", kind, from, to);
        Ok(())
    }

    /// Removes the dictionary and its index in one swap, then deletes its
    /// files. The files go before the lock is released so an import of the
    /// same title cannot install into the folder being removed.
    pub fn delete_dictionary(
        &self,
        at: usize,
        kind: DictionaryType,
    ) -> Result<DictionaryInfo, CatalogError> {
        let _lock = self.lock_mutation();
        let mut next = Snapshot::clone(&self.snapshot());
        let removed = next.catalog.remove(at, kind)?;
        next.indices.remove(&removed.id);
        self.persist(&next)?;
        self.publish(next);

        if let Err(e) = fs::remove_dir_all(&removed.path) {
            tracing::warn!("Failed to remove {}: {}", removed.path.display(), e);
        }
        tracing::info!("Deleted {} dictionary {}", kind, removed.name);
        Ok(removed)
    }

    pub fn set_custom_css(&self, css: impl Into<String>) -> Result<(), CatalogError> {
        let css = css.into();
        self.mutate(|snapshot| {
            snapshot.custom_css = css;
            Ok(())
        })
    }
}
