use hoshi_core::dictionary::{DictionaryType, PitchData};
use hoshi_dictionary::Snapshot;

/// Pitch-drop positions for a headword, one block per enabled pitch
/// dictionary that knows it, in catalog order
pub fn pitch_annotations(snapshot: &Snapshot, expression: &str, reading: &str) -> Vec<PitchData> {
    snapshot
        .catalog()
        .enabled(DictionaryType::Pitch)
        .filter_map(|info| {
            let pitch_positions = snapshot.pitch_index(info)?.lookup(expression, reading);
            (!pitch_positions.is_empty()).then(|| PitchData {
                dictionary: info.name.clone(),
                pitch_positions,
            })
        })
        .collect()
}
