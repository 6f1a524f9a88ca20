pub mod catalog;
pub mod index;
pub mod loaders;
mod persist;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;


pub use catalog::Catalog;
pub use index::{DictionaryIndex, FrequencyIndex, PitchIndex, TermIndex};
pub use store::{DictionaryStore, ImportGuard, Snapshot};
pub use types::{FrequencyEntry, PitchEntry, StoredDictionary, TermEntry};
