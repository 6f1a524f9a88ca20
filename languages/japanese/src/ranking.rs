use std::ptr;

use hoshi_core::dictionary::DictionaryInfo;
use hoshi_dictionary::TermEntry;

use crate::deinflector::DeinflectionCandidate;

/// A term entry found for one deinflection candidate
#[derive(Debug, Clone, Copy)]
pub(crate) struct TermMatch<'a> {
    pub dictionary: &'a DictionaryInfo,
    pub entry: &'a TermEntry,
    pub candidate: &'a DeinflectionCandidate,
}

impl TermMatch<'_> {
    /// Catalog order first, then the dictionary's own sequence
    pub fn rank_key(&self) -> (usize, i64) {
        (self.dictionary.order, self.entry.sequence)
    }

    fn is_same_entry(&self, other: &TermMatch<'_>) -> bool {
        ptr::eq(self.entry, other.entry)
    }
}

/// Matches sharing an (expression, reading), best-ranked first
#[derive(Debug)]
pub(crate) struct MergedEntry<'a> {
    pub expression: &'a str,
    pub reading: &'a str,
    pub matches: Vec<TermMatch<'a>>,
}

impl<'a> MergedEntry<'a> {
    pub fn best(&self) -> &TermMatch<'a> {
        &self.matches[0]
    }
}

/// Sorts matches by rank and merges them by (expression, reading). The
/// result is ordered by each group's best match; ties keep discovery order.
pub(crate) fn rank(matches: Vec<TermMatch<'_>>) -> Vec<MergedEntry<'_>> {
    let mut unique: Vec<TermMatch<'_>> = Vec::with_capacity(matches.len());
    for m in matches {
        if !unique.iter().any(|seen| seen.is_same_entry(&m)) {
            unique.push(m);
        }
    }
    unique.sort_by_key(|m| m.rank_key());

    let mut merged: Vec<MergedEntry<'_>> = Vec::new();
    for m in unique {
        let (expression, reading) = (m.entry.expression.as_str(), m.entry.reading());
        match merged
            .iter_mut()
            .find(|e| e.expression == expression && e.reading == reading)
        {
            Some(entry) => entry.matches.push(m),
            None => merged.push(MergedEntry {
                expression,
                reading,
                matches: vec![m],
            }),
        }
    }
    merged
}

/// Whole entries only; never more than `max_results`
pub(crate) fn truncate<T>(mut entries: Vec<T>, max_results: usize) -> Vec<T> {
    entries.truncate(max_results);
    entries
}
