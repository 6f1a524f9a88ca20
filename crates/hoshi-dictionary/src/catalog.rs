use hoshi_config::{CatalogRecord, DictionaryConfig};
use hoshi_core::dictionary::{DictionaryInfo, DictionaryType};
use hoshi_core::error::CatalogError;

/// Ordered dictionary lists, one per type. Position in the list is the
/// dictionary's order; `order` fields are rewritten after every structural
/// change so they never drift from the position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    term: Vec<DictionaryInfo>,
    frequency: Vec<DictionaryInfo>,
    pitch: Vec<DictionaryInfo>,
}

impl Catalog {
    pub fn dictionaries(&self, kind: DictionaryType) -> &[DictionaryInfo] {
        match kind {
            DictionaryType::Term => &self.term,
            DictionaryType::Frequency => &self.frequency,
            DictionaryType::Pitch => &self.pitch,
        }
    }

    fn list_mut(&mut self, kind: DictionaryType) -> &mut Vec<DictionaryInfo> {
        match kind {
            DictionaryType::Term => &mut self.term,
            DictionaryType::Frequency => &mut self.frequency,
            DictionaryType::Pitch => &mut self.pitch,
        }
    }

    /// Enabled dictionaries of a type, in catalog order
    pub fn enabled(&self, kind: DictionaryType) -> impl Iterator<Item = &DictionaryInfo> {
        self.dictionaries(kind).iter().filter(|info| info.is_enabled)
    }

    pub fn len(&self, kind: DictionaryType) -> usize {
        self.dictionaries(kind).len()
    }

    pub fn contains_file(&self, kind: DictionaryType, file_name: &str) -> bool {
        self.dictionaries(kind)
            .iter()
            .any(|info| info.file_name == file_name)
    }

    /// Appends at the end of its type's list (order = current max + 1)
    pub fn push(&mut self, mut info: DictionaryInfo) -> DictionaryInfo {
        let list = self.list_mut(info.kind);
        info.order = list.len();
        list.push(info.clone());
        info
    }

    pub fn toggle(
        &mut self,
        order: usize,
        enabled: bool,
        kind: DictionaryType,
    ) -> Result<(), CatalogError> {
        self.check_index(order, kind)?;
        self.list_mut(kind)[order].is_enabled = enabled;
        Ok(())
    }

    /// Moves the dictionary at `from` so that it ends up at position `to`
    /// (clamped to the end of the list).
    pub fn move_dictionary(
        &mut self,
        from: usize,
        to: usize,
        kind: DictionaryType,
    ) -> Result<(), CatalogError> {
        self.check_index(from, kind)?;
        let list = self.list_mut(kind);
        let info = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, info);
        self.renumber(kind);
        Ok(())
    }

    pub fn remove(&mut self, at: usize, kind: DictionaryType) -> Result<DictionaryInfo, CatalogError> {
        self.check_index(at, kind)?;
        let info = self.list_mut(kind).remove(at);
        self.renumber(kind);
        Ok(info)
    }

    fn renumber(&mut self, kind: DictionaryType) {
        for (order, info) in self.list_mut(kind).iter_mut().enumerate() {
            info.order = order;
        }
    }

    fn check_index(&self, index: usize, kind: DictionaryType) -> Result<(), CatalogError> {
        let len = self.len(kind);
        if index < len {
            Ok(())
        } else {
            Err(CatalogError::OutOfRange { kind, index, len })
        }
    }

    /// Persisted form of the catalog
    pub fn to_config(&self, custom_css: &str) -> DictionaryConfig {
        let records = |kind: DictionaryType| -> Vec<CatalogRecord> {
            self.dictionaries(kind)
                .iter()
                .map(|info| CatalogRecord {
                    file_name: info.file_name.clone(),
                    is_enabled: info.is_enabled,
                    order: info.order,
                })
                .collect()
        };

        DictionaryConfig {
            term_dictionaries: records(DictionaryType::Term),
            frequency_dictionaries: records(DictionaryType::Frequency),
            pitch_dictionaries: records(DictionaryType::Pitch),
            custom_css: custom_css.to_string(),
        }
    }
}
