use crate::dictionary::{DeinflectionTag, EntryData};

/// Text lookup interface for language implementations
pub trait LanguageProcessor: Send + Sync {
    /// Language identifier (ISO 639-1 code: "ja", "zh", "ko", etc.)
    fn language_code(&self) -> &str;

    /// Normalize text (Unicode normalization, width folding, etc.)
    fn normalize(&self, text: &str) -> String;

    /// Resolve the word starting at character `offset` of `text` into at most
    /// `max_results` ranked entries. Never fails; worst case is empty.
    fn lookup(&self, text: &str, offset: usize, max_results: usize) -> Vec<EntryData>;
}

/// Optional trait for languages with conjugation
pub trait Deinflector: Send + Sync {
    /// Grammatical class constraints carried by a candidate
    type Conditions: Copy;

    /// Candidate base forms of `word`, the identity candidate first
    fn deinflect(&self, word: &str) -> Vec<Deinflection<Self::Conditions>>;

    /// Display tag for a rule name found in a trace
    fn describe(&self, rule: &str) -> DeinflectionTag;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deinflection<C> {
    pub base_form: String,
    /// Rule names in the order they were stripped from the surface
    pub trace: Vec<String>,
    /// Classes the base form must belong to; empty for the identity candidate
    pub conditions: C,
}

impl<C> Deinflection<C> {
    pub fn is_identity(&self) -> bool {
        self.trace.is_empty()
    }
}
