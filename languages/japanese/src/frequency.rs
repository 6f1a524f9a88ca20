use hoshi_core::dictionary::{DictionaryType, FrequencyData};
use hoshi_dictionary::Snapshot;

/// Frequency annotations for a headword, one block per enabled frequency
/// dictionary that knows it, in catalog order
pub fn frequency_annotations(snapshot: &Snapshot, expression: &str, reading: &str) -> Vec<FrequencyData> {
    snapshot
        .catalog()
        .enabled(DictionaryType::Frequency)
        .filter_map(|info| {
            let frequencies = snapshot.frequency_index(info)?.lookup(expression, reading);
            if frequencies.is_empty() {
                return None;
            }
            Some(FrequencyData {
                dictionary: info.name.clone(),
                frequencies,
            })
        })
        .collect()
}
