use hoshi_core::dictionary::DictionaryType;
use serde::{Deserialize, Deserializer, Serialize};

fn default_enabled() -> bool {
    true
}

/// Persisted state of one dictionary within its type's list
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub file_name: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub order: usize,
}

/// On-disk dictionary catalog, one list per dictionary type
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DictionaryConfig {
    #[serde(deserialize_with = "lenient_records")]
    pub term_dictionaries: Vec<CatalogRecord>,
    #[serde(deserialize_with = "lenient_records")]
    pub frequency_dictionaries: Vec<CatalogRecord>,
    #[serde(deserialize_with = "lenient_records")]
    pub pitch_dictionaries: Vec<CatalogRecord>,
    #[serde(rename = "customCSS")]
    pub custom_css: String,
}

impl DictionaryConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn records(&self, kind: DictionaryType) -> &[CatalogRecord] {
        match kind {
            DictionaryType::Term => &self.term_dictionaries,
            DictionaryType::Frequency => &self.frequency_dictionaries,
            DictionaryType::Pitch => &self.pitch_dictionaries,
        }
    }
}

/// Keeps every well-formed record and drops the rest with a warning,
/// so one bad entry does not cost the whole catalog.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<CatalogRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<CatalogRecord>(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed catalog record {}: {}", value, e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_name: &str, is_enabled: bool, order: usize) -> CatalogRecord {
        CatalogRecord {
            file_name: file_name.to_string(),
            is_enabled,
            order,
        }
    }

    #[test]
    fn round_trip_preserves_enabled_and_order() {
        let config = DictionaryConfig {
            term_dictionaries: vec![record("JMdict", true, 0), record("新明解", false, 1)],
            frequency_dictionaries: vec![record("JPDB", false, 0)],
            pitch_dictionaries: vec![record("NHK", true, 0)],
            custom_css: ".glossary { color: red; }".to_string(),
        };

        let decoded = DictionaryConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn uses_original_field_names() {
        let config = DictionaryConfig {
            term_dictionaries: vec![record("JMdict", true, 0)],
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(json["termDictionaries"][0]["fileName"], "JMdict");
        assert_eq!(json["termDictionaries"][0]["isEnabled"], true);
        assert_eq!(json["termDictionaries"][0]["order"], 0);
        assert_eq!(json["customCSS"], "");
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "termDictionaries": [{"fileName": "JMdict"}],
            "frequencyDictionaries": []
        }"#;
        let config = DictionaryConfig::from_json(json).unwrap();

        assert_eq!(config.term_dictionaries, vec![record("JMdict", true, 0)]);
        assert!(config.pitch_dictionaries.is_empty());
        assert_eq!(config.custom_css, "");
    }

    #[test]
    fn malformed_records_are_skipped() {
        let json = r#"{
            "termDictionaries": [
                {"fileName": "JMdict", "isEnabled": true, "order": 0},
                {"isEnabled": false, "order": 1},
                42,
                {"fileName": "Daijirin", "isEnabled": false, "order": 2}
            ],
            "frequencyDictionaries": [],
            "pitchDictionaries": [],
            "unknownField": "ignored"
        }"#;
        let config = DictionaryConfig::from_json(json).unwrap();

        assert_eq!(
            config.records(DictionaryType::Term),
            &[record("JMdict", true, 0), record("Daijirin", false, 2)]
        );
    }
}
