use hoshi_core::dictionary::DictionaryType;
use serde::{Deserialize, Serialize};

/// A term bank record after import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub expression: String, // e.g., "食べる"
    pub reading: String,    // e.g., "たべる", empty when same as expression
    pub definition_tags: Vec<String>,
    /// Inflection families, e.g. ["v1"]
    pub rules: Vec<String>,
    pub score: i64,
    /// Strings or structured-content objects, kept as imported
    pub glossary: Vec<serde_json::Value>,
    pub sequence: i64,
    pub term_tags: Vec<String>,
}

impl TermEntry {
    /// Reading with the kana-only convention resolved
    pub fn reading(&self) -> &str {
        if self.reading.is_empty() {
            &self.expression
        } else {
            &self.reading
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub expression: String,
    /// None applies to every reading of the expression
    pub reading: Option<String>,
    pub value: i64,
    pub display_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchEntry {
    pub expression: String,
    pub reading: String,
    pub positions: Vec<u32>,
}

/// Parsed contents of one dictionary, as written to `dictionary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entries", rename_all = "lowercase")]
pub enum DictionaryContent {
    Term(Vec<TermEntry>),
    Frequency(Vec<FrequencyEntry>),
    Pitch(Vec<PitchEntry>),
}

impl DictionaryContent {
    pub fn kind(&self) -> DictionaryType {
        match self {
            DictionaryContent::Term(_) => DictionaryType::Term,
            DictionaryContent::Frequency(_) => DictionaryType::Frequency,
            DictionaryContent::Pitch(_) => DictionaryType::Pitch,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DictionaryContent::Term(entries) => entries.len(),
            DictionaryContent::Frequency(entries) => entries.len(),
            DictionaryContent::Pitch(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDictionary {
    pub title: String,
    pub revision: String,
    pub content: DictionaryContent,
}
