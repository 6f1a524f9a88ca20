use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hoshi_core::error::LoadError;
use uuid::Uuid;

use crate::types::StoredDictionary;

pub(crate) const MANIFEST_FILE: &str = "index.json";
pub(crate) const DATA_FILE: &str = "dictionary.json";
pub(crate) const STAGING_PREFIX: &str = ".staging-";

/// Writes `contents` next to `path` and renames it into place, so readers
/// only ever see the old or the new file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

pub(crate) fn write_dictionary(
    dir: &Path,
    manifest_json: &str,
    stored: &StoredDictionary,
) -> io::Result<()> {
    fs::write(dir.join(MANIFEST_FILE), manifest_json)?;
    let data = serde_json::to_vec(stored).map_err(io::Error::other)?;
    fs::write(dir.join(DATA_FILE), data)
}

pub(crate) fn read_dictionary(dir: &Path) -> Result<StoredDictionary, LoadError> {
    let path = dir.join(DATA_FILE);
    if !path.exists() {
        return Err(LoadError::FileNotFound(path));
    }
    let data = fs::read(&path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Removes leftovers of imports that never committed
pub(crate) fn sweep_staging(type_dir: &Path) {
    let Ok(entries) = fs::read_dir(type_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(STAGING_PREFIX) {
            tracing::warn!("Removing unfinished import {}", entry.path().display());
            if let Err(e) = fs::remove_dir_all(entry.path()) {
                tracing::warn!("Failed to remove {}: {}", entry.path().display(), e);
            }
        }
    }
}

/// Directory name derived from a dictionary title
pub(crate) fn file_name_for(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = name.trim_start_matches('.').trim();

    if name.is_empty() {
        "dictionary".to_string()
    } else {
        name.to_string()
    }
}

/// A file name from the persisted catalog that stays inside its type folder
pub(crate) fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).components().count() == 1
}

/// Scratch directory for an import in flight. Removed on drop unless it was
/// installed.
pub(crate) struct StagingDir {
    path: PathBuf,
    installed: bool,
}

impl StagingDir {
    pub(crate) fn create(type_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(type_dir)?;
        let path = type_dir.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        fs::create_dir(&path)?;
        Ok(Self {
            path,
            installed: false,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Renames the staging directory to `target`
    pub(crate) fn install(mut self, target: &Path) -> io::Result<InstalledDir> {
        fs::rename(&self.path, target)?;
        self.installed = true;
        Ok(InstalledDir {
            path: target.to_path_buf(),
            committed: false,
        })
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.installed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!("Failed to remove staging dir {}: {}", self.path.display(), e);
        }
    }
}

/// Installed dictionary directory that is rolled back unless the catalog
/// commit succeeds
pub(crate) struct InstalledDir {
    path: PathBuf,
    committed: bool,
}

impl InstalledDir {
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for InstalledDir {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_name_for("JMdict (English)"), "JMdict (English)");
        assert_eq!(file_name_for("a/b:c"), "a_b_c");
        assert_eq!(file_name_for("..hidden"), "hidden");
        assert_eq!(file_name_for("   "), "dictionary");
    }

    #[test]
    fn unsafe_catalog_names_are_rejected() {
        assert!(is_safe_file_name("JMdict"));
        assert!(!is_safe_file_name("../etc"));
        assert!(!is_safe_file_name(".staging-1"));
        assert!(!is_safe_file_name("a/b"));
        assert!(!is_safe_file_name(""));
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("nested").join("config.json.tmp").exists());
    }

    #[test]
    fn staging_dir_is_removed_unless_installed() {
        let dir = tempfile::tempdir().unwrap();

        let staging = StagingDir::create(dir.path()).unwrap();
        let staged = staging.path().to_path_buf();
        assert!(staged.exists());
        drop(staging);
        assert!(!staged.exists());

        let staging = StagingDir::create(dir.path()).unwrap();
        let target = dir.path().join("JMdict");
        let installed = staging.install(&target).unwrap();
        installed.commit();
        assert!(target.exists());
    }
}
