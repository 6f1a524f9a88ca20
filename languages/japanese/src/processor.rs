use std::sync::Arc;

use hoshi_config::lookup::LookupConfig;
use hoshi_core::dictionary::{DictionaryInfo, DictionaryType, EntryData, GlossaryData};
use hoshi_core::language::{Deinflector, LanguageProcessor};
use hoshi_core::preprocess::{Preprocessor, is_lookup_char, is_sound_mark};
use hoshi_dictionary::{DictionaryStore, Snapshot};

use crate::deinflector::{DeinflectionCandidate, JapaneseDeinflector, WordClass};
use crate::frequency::frequency_annotations;
use crate::pitch_accent::pitch_annotations;
use crate::ranking::{self, MergedEntry, TermMatch};

/// Japanese lookup over the dictionaries of a store
pub struct JapaneseProcessor {
    store: Arc<DictionaryStore>,
    deinflector: JapaneseDeinflector,
    config: LookupConfig,
}

impl JapaneseProcessor {
    pub fn new(store: Arc<DictionaryStore>, config: LookupConfig) -> Self {
        let config = config.sanitized();
        let deinflector = JapaneseDeinflector::new(config.max_deinflection_depth);
        Self::with_deinflector(store, deinflector, config)
    }

    pub fn with_deinflector(
        store: Arc<DictionaryStore>,
        deinflector: JapaneseDeinflector,
        config: LookupConfig,
    ) -> Self {
        Self {
            store,
            deinflector,
            config,
        }
    }

    pub fn store(&self) -> &Arc<DictionaryStore> {
        &self.store
    }

    pub fn deinflector(&self) -> &JapaneseDeinflector {
        &self.deinflector
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Characters from `offset` up to the scan length, cut at the first
    /// character that cannot be part of a word. Voicing marks stay attached
    /// to the kana before them so `ﾃﾞｰﾀ` normalizes to `データ`.
    fn scan_window(&self, text: &str, offset: usize) -> Vec<char> {
        text.chars()
            .skip(offset)
            .enumerate()
            .take_while(|&(i, c)| is_lookup_char(c) || (i > 0 && is_sound_mark(c)))
            .map(|(_, c)| c)
            .take(self.config.scan_length)
            .collect()
    }

    fn find_matches<'a>(
        snapshot: &'a Snapshot,
        dictionaries: &[&'a DictionaryInfo],
        candidates: &'a [DeinflectionCandidate],
    ) -> Vec<TermMatch<'a>> {
        let mut matches = Vec::new();

        for &dictionary in dictionaries {
            let Some(index) = snapshot.term_index(dictionary) else {
                continue;
            };
            for candidate in candidates {
                for entry in index.lookup(&candidate.base_form) {
                    if candidate.conditions.is_empty()
                        || candidate
                            .conditions
                            .intersects(WordClass::from_tags(&entry.rules))
                    {
                        matches.push(TermMatch {
                            dictionary,
                            entry,
                            candidate,
                        });
                    }
                }
            }
        }

        matches
    }

    fn assemble(&self, snapshot: &Snapshot, merged: &MergedEntry<'_>, matched: &str) -> EntryData {
        let mut glossaries = Vec::new();
        for group in merged
            .matches
            .chunk_by(|a, b| a.dictionary.id == b.dictionary.id)
        {
            let glossary: Vec<&serde_json::Value> =
                group.iter().flat_map(|m| &m.entry.glossary).collect();
            glossaries.push(GlossaryData {
                dictionary: group[0].dictionary.name.clone(),
                content: serde_json::to_string(&glossary).unwrap_or_default(),
                definition_tags: unique_tags(group.iter().flat_map(|m| &m.entry.definition_tags))
                    .join(" "),
                term_tags: unique_tags(group.iter().flat_map(|m| &m.entry.term_tags)).join(" "),
            });
        }

        let deinflection_trace = merged
            .best()
            .candidate
            .trace
            .iter()
            .map(|rule| self.deinflector.describe(rule))
            .collect();

        EntryData {
            expression: merged.expression.to_string(),
            reading: merged.reading.to_string(),
            matched: matched.to_string(),
            deinflection_trace,
            glossaries,
            frequencies: frequency_annotations(snapshot, merged.expression, merged.reading),
            pitches: pitch_annotations(snapshot, merged.expression, merged.reading),
            definition_tags: unique_tags(
                merged.matches.iter().flat_map(|m| &m.entry.definition_tags),
            ),
        }
    }
}

fn unique_tags<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        if !tag.is_empty() && !unique.contains(tag) {
            unique.push(tag.clone());
        }
    }
    unique
}

impl Preprocessor for JapaneseProcessor {}

impl LanguageProcessor for JapaneseProcessor {
    fn language_code(&self) -> &str {
        "ja"
    }

    fn normalize(&self, text: &str) -> String {
        self.process(text)
    }

    fn lookup(&self, text: &str, offset: usize, max_results: usize) -> Vec<EntryData> {
        let window = self.scan_window(text, offset);
        if window.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let snapshot = self.store.snapshot();
        let dictionaries: Vec<&DictionaryInfo> =
            snapshot.catalog().enabled(DictionaryType::Term).collect();
        if dictionaries.is_empty() {
            tracing::debug!("No enabled term dictionaries");
            return Vec::new();
        }

        for len in (1..=window.len()).rev() {
            let matched: String = window[..len].iter().collect();
            let candidates = self.deinflector.deinflect(&self.normalize(&matched));
            let matches = Self::find_matches(&snapshot, &dictionaries, &candidates);
            if matches.is_empty() {
                continue;
            }

            tracing::debug!(
                "Matched {:?}: {} entries from {} candidates",
                matched,
                matches.len(),
                candidates.len()
            );
            let ranked = ranking::truncate(ranking::rank(matches), max_results);
            return ranked
                .iter()
                .map(|merged| self.assemble(&snapshot, merged, &matched))
                .collect();
        }

        tracing::debug!("No match at offset {} of {:?}", offset, text);
        Vec::new()
    }
}
