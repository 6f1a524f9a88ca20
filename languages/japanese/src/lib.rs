pub mod deinflector;
pub mod frequency;
pub mod pitch_accent;
pub mod processor;
mod ranking;

#[cfg(test)]
mod tests;

pub use deinflector::{DeinflectionCandidate, JapaneseDeinflector, RuleTable, WordClass};
pub use frequency::frequency_annotations;
pub use pitch_accent::pitch_annotations;
pub use processor::JapaneseProcessor;
