use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use hoshi_core::dictionary::DictionaryType;
use hoshi_core::error::ImportError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use crate::types::{DictionaryContent, FrequencyEntry, PitchEntry, TermEntry};

pub const SUPPORTED_FORMAT: i64 = 3;

const MANIFEST_NAME: &str = "index.json";
const TERM_BANK_PREFIX: &str = "term_bank_";
const META_BANK_PREFIX: &str = "term_meta_bank_";

/// `index.json` of a Yomitan dictionary archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub revision: String,
    #[serde(default)]
    pub format: Option<i64>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub sequenced: bool,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Newer archives use `format`, older ones `version`
    pub fn format_version(&self) -> Option<i64> {
        self.format.or(self.version)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Read access to a Yomitan zip archive
pub struct YomitanArchive<R> {
    archive: ZipArchive<R>,
}

impl YomitanArchive<File> {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path)
            .map_err(|e| ImportError::InvalidArchive(format!("{}: {}", path.display(), e)))?;
        Self::new(file)
    }
}

impl<R: Read + Seek> YomitanArchive<R> {
    pub fn new(reader: R) -> Result<Self, ImportError> {
        let archive =
            ZipArchive::new(reader).map_err(|e| ImportError::InvalidArchive(e.to_string()))?;
        Ok(Self { archive })
    }

    /// Parses and validates the manifest. Returns it together with its raw
    /// text so the original can be stored unchanged.
    pub fn manifest(&mut self) -> Result<(Manifest, String), ImportError> {
        let raw = match self.read_file(MANIFEST_NAME)? {
            Some(raw) => raw,
            None => {
                return Err(ImportError::MissingOrMalformedManifest(format!(
                    "{MANIFEST_NAME} not found"
                )));
            }
        };

        let manifest: Manifest = serde_json::from_str(&raw)
            .map_err(|e| ImportError::MissingOrMalformedManifest(e.to_string()))?;

        if manifest.title.trim().is_empty() {
            return Err(ImportError::MissingOrMalformedManifest(
                "empty title".to_string(),
            ));
        }

        match manifest.format_version() {
            Some(SUPPORTED_FORMAT) => Ok((manifest, raw)),
            Some(other) => Err(ImportError::UnsupportedSchemaVersion(other)),
            None => Err(ImportError::MissingOrMalformedManifest(
                "missing format version".to_string(),
            )),
        }
    }

    /// Parses every bank relevant to `kind`. Fails on the first bad bank
    /// and stops between banks once `cancel` fires.
    pub fn read_content(
        &mut self,
        kind: DictionaryType,
        cancel: &CancellationToken,
    ) -> Result<DictionaryContent, ImportError> {
        let content = match kind {
            DictionaryType::Term => {
                let mut entries = Vec::new();
                for bank in self.bank_names(TERM_BANK_PREFIX) {
                    check_cancelled(cancel)?;
                    for record in self.read_bank(&bank)? {
                        entries.push(parse_term_record(&bank, record)?);
                    }
                }
                DictionaryContent::Term(entries)
            }
            DictionaryType::Frequency => {
                let mut entries = Vec::new();
                for bank in self.bank_names(META_BANK_PREFIX) {
                    check_cancelled(cancel)?;
                    for record in self.read_bank(&bank)? {
                        if let Some(MetaRecord::Frequency(entry)) = parse_meta_record(&bank, record)? {
                            entries.push(entry);
                        }
                    }
                }
                DictionaryContent::Frequency(entries)
            }
            DictionaryType::Pitch => {
                let mut entries = Vec::new();
                for bank in self.bank_names(META_BANK_PREFIX) {
                    check_cancelled(cancel)?;
                    for record in self.read_bank(&bank)? {
                        if let Some(MetaRecord::Pitch(entry)) = parse_meta_record(&bank, record)? {
                            entries.push(entry);
                        }
                    }
                }
                DictionaryContent::Pitch(entries)
            }
        };

        if content.is_empty() {
            return Err(ImportError::TypeMismatch { expected: kind });
        }

        Ok(content)
    }

    /// Bank files with the given prefix, ordered by bank number
    fn bank_names(&self, prefix: &str) -> Vec<String> {
        let mut banks: Vec<(u32, String)> = self
            .archive
            .file_names()
            .filter_map(|name| {
                let number = name
                    .strip_prefix(prefix)?
                    .strip_suffix(".json")?
                    .parse::<u32>()
                    .ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        banks.sort();
        banks.into_iter().map(|(_, name)| name).collect()
    }

    fn read_bank(&mut self, name: &str) -> Result<Vec<Value>, ImportError> {
        let raw = self.read_file(name)?.ok_or_else(|| ImportError::BankParseFailure {
            bank: name.to_string(),
            reason: "missing from archive".to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ImportError::BankParseFailure {
            bank: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn read_file(&mut self, name: &str) -> Result<Option<String>, ImportError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ImportError::InvalidArchive(format!("{name}: {e}"))),
        };

        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .map_err(|e| ImportError::InvalidArchive(format!("{name}: {e}")))?;
        Ok(Some(raw))
    }
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<(), ImportError> {
    if cancel.is_cancelled() {
        Err(ImportError::Cancelled)
    } else {
        Ok(())
    }
}

fn bank_error(bank: &str, reason: impl Into<String>) -> ImportError {
    ImportError::BankParseFailure {
        bank: bank.to_string(),
        reason: reason.into(),
    }
}

/// Space-separated tag string, null allowed
fn split_tags(value: &Value) -> Vec<String> {
    value
        .as_str()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// `[expression, reading, definitionTags, rules, score, glossary, sequence, termTags]`
fn parse_term_record(bank: &str, record: Value) -> Result<TermEntry, ImportError> {
    let fields = match record {
        Value::Array(fields) if fields.len() >= 8 => fields,
        other => return Err(bank_error(bank, format!("invalid term record: {other}"))),
    };

    let text = |idx: usize, what: &str| -> Result<String, ImportError> {
        fields[idx]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| bank_error(bank, format!("{what} is not a string: {}", fields[idx])))
    };

    let expression = text(0, "expression")?;
    let reading = text(1, "reading")?;
    let glossary = fields[5]
        .as_array()
        .cloned()
        .ok_or_else(|| bank_error(bank, format!("glossary of {expression} is not a list")))?;

    Ok(TermEntry {
        reading,
        definition_tags: split_tags(&fields[2]),
        rules: split_tags(&fields[3]),
        score: number(&fields[4]).unwrap_or_default(),
        glossary,
        sequence: number(&fields[6]).unwrap_or_default(),
        term_tags: split_tags(&fields[7]),
        expression,
    })
}

fn number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

enum MetaRecord {
    Frequency(FrequencyEntry),
    Pitch(PitchEntry),
}

/// Term meta bank record. Modes other than frequency and pitch are skipped.
fn parse_meta_record(bank: &str, record: Value) -> Result<Option<MetaRecord>, ImportError> {
    let fields = match record {
        Value::Array(fields) if fields.len() >= 3 => fields,
        other => return Err(bank_error(bank, format!("invalid meta record: {other}"))),
    };

    let expression = fields[0]
        .as_str()
        .ok_or_else(|| bank_error(bank, format!("expression is not a string: {}", fields[0])))?
        .to_string();

    match (&fields[1], &fields[2]) {
        (Value::String(mode), data) if mode == "freq" => {
            parse_frequency(bank, expression, data).map(|e| Some(MetaRecord::Frequency(e)))
        }
        (Value::String(mode), data) if mode == "pitch" => {
            let reading = data
                .get("reading")
                .and_then(Value::as_str)
                .ok_or_else(|| bank_error(bank, format!("pitch of {expression} has no reading")))?
                .to_string();
            let pitches = data.get("pitches").unwrap_or(&Value::Null);
            let positions = parse_pitches(bank, &expression, pitches)?;
            if positions.is_empty() {
                return Ok(None);
            }
            Ok(Some(MetaRecord::Pitch(PitchEntry {
                expression,
                reading,
                positions,
            })))
        }
        // Legacy `[expression, reading, [{position, tags}]]`
        (Value::String(reading), pitches @ Value::Array(_)) => {
            let positions = parse_pitches(bank, &expression, pitches)?;
            if positions.is_empty() {
                return Ok(None);
            }
            Ok(Some(MetaRecord::Pitch(PitchEntry {
                expression,
                reading: reading.clone(),
                positions,
            })))
        }
        _ => Ok(None),
    }
}

fn parse_pitches(bank: &str, expression: &str, pitches: &Value) -> Result<Vec<u32>, ImportError> {
    let pitches = pitches
        .as_array()
        .ok_or_else(|| bank_error(bank, format!("pitches of {expression} are not a list")))?;

    // Downstep positions only; high/low patterns such as "LHL" are skipped
    Ok(pitches
        .iter()
        .filter_map(|pitch| {
            let position = pitch
                .get("position")
                .and_then(Value::as_u64)
                .and_then(|p| u32::try_from(p).ok());
            if position.is_none() {
                tracing::warn!("Skipping pitch of {} in {}: {}", expression, bank, pitch);
            }
            position
        })
        .collect())
}

/// `value`, `{value, displayValue}` or `{reading, frequency}`
fn parse_frequency(bank: &str, expression: String, data: &Value) -> Result<FrequencyEntry, ImportError> {
    let (reading, frequency) = match data.get("frequency") {
        Some(frequency) => {
            let reading = data.get("reading").and_then(Value::as_str).map(str::to_string);
            (reading, frequency)
        }
        None => (None, data),
    };

    let (value, display_value) = match frequency {
        Value::Number(_) => {
            let value = number(frequency).unwrap_or_default();
            (value, value.to_string())
        }
        Value::String(display) => (leading_number(display), display.clone()),
        Value::Object(map) => {
            let value = map.get("value").and_then(number).ok_or_else(|| {
                bank_error(bank, format!("frequency of {expression} has no value"))
            })?;
            let display = map
                .get("displayValue")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            (value, display)
        }
        other => {
            return Err(bank_error(
                bank,
                format!("invalid frequency for {expression}: {other}"),
            ));
        }
    };

    Ok(FrequencyEntry {
        expression,
        reading,
        value,
        display_value,
    })
}

/// Numeric prefix of display strings such as "1234㋕"
fn leading_number(display: &str) -> i64 {
    let digits: String = display
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or_default()
}
