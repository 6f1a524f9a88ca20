use std::collections::HashMap;

use hoshi_core::dictionary::FrequencyTag;

use crate::types::{DictionaryContent, FrequencyEntry, PitchEntry, TermEntry};

/// Exact-match index over one term dictionary
#[derive(Debug, Default)]
pub struct TermIndex {
    entries: Vec<TermEntry>,
    expression_index: HashMap<String, Vec<usize>>,
    reading_index: HashMap<String, Vec<usize>>,
}

impl TermIndex {
    pub fn new(entries: Vec<TermEntry>) -> Self {
        let mut expression_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut reading_index: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            expression_index
                .entry(entry.expression.clone())
                .or_default()
                .push(idx);
            if !entry.reading.is_empty() && entry.reading != entry.expression {
                reading_index
                    .entry(entry.reading.clone())
                    .or_default()
                    .push(idx);
            }
        }

        Self {
            entries,
            expression_index,
            reading_index,
        }
    }

    /// Entries whose expression or reading equals `text`; expression
    /// matches first, each group in bank order.
    pub fn lookup(&self, text: &str) -> Vec<&TermEntry> {
        let by_expression = self.expression_index.get(text).into_iter().flatten();
        let by_reading = self.reading_index.get(text).into_iter().flatten();

        by_expression
            .chain(by_reading)
            .filter_map(|&idx| self.entries.get(idx))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FrequencyIndex {
    expression_index: HashMap<String, Vec<FrequencyEntry>>,
}

impl FrequencyIndex {
    pub fn new(entries: Vec<FrequencyEntry>) -> Self {
        let mut expression_index: HashMap<String, Vec<FrequencyEntry>> = HashMap::new();
        for entry in entries {
            expression_index
                .entry(entry.expression.clone())
                .or_default()
                .push(entry);
        }
        Self { expression_index }
    }

    /// Frequencies recorded for (expression, reading). Entries without a
    /// reading apply to every reading.
    pub fn lookup(&self, expression: &str, reading: &str) -> Vec<FrequencyTag> {
        self.expression_index
            .get(expression)
            .into_iter()
            .flatten()
            .filter(|entry| entry.reading.as_deref().is_none_or(|r| r == reading))
            .map(|entry| FrequencyTag {
                value: entry.value,
                display_value: entry.display_value.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct PitchIndex {
    expression_index: HashMap<String, Vec<PitchEntry>>,
}

impl PitchIndex {
    pub fn new(entries: Vec<PitchEntry>) -> Self {
        let mut expression_index: HashMap<String, Vec<PitchEntry>> = HashMap::new();
        for entry in entries {
            expression_index
                .entry(entry.expression.clone())
                .or_default()
                .push(entry);
        }
        Self { expression_index }
    }

    /// Pitch-drop positions for (expression, reading), deduplicated in
    /// first-seen order
    pub fn lookup(&self, expression: &str, reading: &str) -> Vec<u32> {
        let mut positions = Vec::new();
        for entry in self.expression_index.get(expression).into_iter().flatten() {
            if entry.reading != reading {
                continue;
            }
            for &position in &entry.positions {
                if !positions.contains(&position) {
                    positions.push(position);
                }
            }
        }
        positions
    }
}

#[derive(Debug)]
pub enum DictionaryIndex {
    Term(TermIndex),
    Frequency(FrequencyIndex),
    Pitch(PitchIndex),
}

impl DictionaryIndex {
    pub fn from_content(content: DictionaryContent) -> Self {
        match content {
            DictionaryContent::Term(entries) => DictionaryIndex::Term(TermIndex::new(entries)),
            DictionaryContent::Frequency(entries) => {
                DictionaryIndex::Frequency(FrequencyIndex::new(entries))
            }
            DictionaryContent::Pitch(entries) => DictionaryIndex::Pitch(PitchIndex::new(entries)),
        }
    }

    pub fn as_term(&self) -> Option<&TermIndex> {
        match self {
            DictionaryIndex::Term(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_frequency(&self) -> Option<&FrequencyIndex> {
        match self {
            DictionaryIndex::Frequency(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_pitch(&self) -> Option<&PitchIndex> {
        match self {
            DictionaryIndex::Pitch(index) => Some(index),
            _ => None,
        }
    }
}
