use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of data a dictionary provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryType {
    Term,
    Frequency,
    Pitch,
}

impl DictionaryType {
    pub const ALL: [DictionaryType; 3] = [
        DictionaryType::Term,
        DictionaryType::Frequency,
        DictionaryType::Pitch,
    ];

    /// Directory name used under the dictionaries root
    pub fn as_str(&self) -> &'static str {
        match self {
            DictionaryType::Term => "term",
            DictionaryType::Frequency => "frequency",
            DictionaryType::Pitch => "pitch",
        }
    }
}

impl fmt::Display for DictionaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Catalog entry for an imported dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryInfo {
    pub id: Uuid,
    /// Title from the archive manifest
    pub name: String,
    /// Directory name under the type's folder, the persisted key
    pub file_name: String,
    pub path: PathBuf,
    pub kind: DictionaryType,
    pub is_enabled: bool,
    /// Position within its type, always contiguous 0..N-1
    pub order: usize,
}

impl DictionaryInfo {
    pub fn new(name: String, file_name: String, path: PathBuf, kind: DictionaryType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            file_name,
            path,
            kind,
            is_enabled: true,
            order: 0,
        }
    }
}

/// Glossary block contributed by one term dictionary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryData {
    pub dictionary: String,
    /// JSON-encoded glossary list, strings or structured content
    pub content: String,
    pub definition_tags: String,
    pub term_tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyTag {
    pub value: i64,
    pub display_value: String,
}

/// Frequency annotations contributed by one frequency dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyData {
    pub dictionary: String,
    pub frequencies: Vec<FrequencyTag>,
}

/// Pitch-drop positions contributed by one pitch dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchData {
    pub dictionary: String,
    pub pitch_positions: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeinflectionTag {
    pub name: String,
    pub description: String,
}

/// One ranked lookup result. Never partially emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryData {
    pub expression: String,
    pub reading: String,
    /// Surface text the entry was found for
    pub matched: String,
    pub deinflection_trace: Vec<DeinflectionTag>,
    pub glossaries: Vec<GlossaryData>,
    pub frequencies: Vec<FrequencyData>,
    pub pitches: Vec<PitchData>,
    pub definition_tags: Vec<String>,
}

impl EntryData {
    /// Trace rule names, oldest first
    pub fn trace_names(&self) -> Vec<&str> {
        self.deinflection_trace
            .iter()
            .map(|tag| tag.name.as_str())
            .collect()
    }
}
