use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use hoshi_core::dictionary::{DictionaryInfo, DictionaryType, EntryData};
use hoshi_core::error::ImportError;
use hoshi_core::language::LanguageProcessor;
use hoshi_core::preprocess::character_count;
use serde_json::{Value, json};

use crate::cli::{Command, Kind};
use crate::state::AppState;

/// Executes one command and returns what should be printed
pub async fn run(state: &Arc<AppState>, command: Command, as_json: bool) -> anyhow::Result<String> {
    match command {
        Command::Import { archive, kind } => import(state, archive, kind.into()).await,
        Command::List { kind } => Ok(list(state, kind, as_json)),
        Command::Enable { kind, order } => {
            state.store.toggle_dictionary(order, true, kind.into())?;
            Ok(format!("Enabled {} dictionary {order}", DictionaryType::from(kind)))
        }
        Command::Disable { kind, order } => {
            state.store.toggle_dictionary(order, false, kind.into())?;
            Ok(format!("Disabled {} dictionary {order}", DictionaryType::from(kind)))
        }
        Command::Move { kind, from, to } => {
            state.store.move_dictionary(from, to, kind.into())?;
            Ok(list(state, Some(kind), as_json))
        }
        Command::Delete { kind, order } => {
            let removed = state.store.delete_dictionary(order, kind.into())?;
            Ok(format!("Deleted {}", removed.name))
        }
        Command::Lookup {
            text,
            offset,
            max_results,
        } => {
            let max_results = max_results.unwrap_or(state.config.lookup.max_results);
            let entries = state.processor.lookup(&text, offset, max_results);
            if as_json {
                Ok(serde_json::to_string_pretty(&entries)?)
            } else {
                Ok(render_entries(&entries))
            }
        }
        Command::Count { file } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            Ok(character_count(&html).to_string())
        }
        Command::Css { css: Some(css) } => {
            state.store.set_custom_css(css)?;
            Ok(String::new())
        }
        Command::Css { css: None } => Ok(state.store.custom_css()),
    }
}

async fn import(state: &Arc<AppState>, archive: PathBuf, kind: DictionaryType) -> anyhow::Result<String> {
    let display = archive.display().to_string();
    // Ctrl+C drops the import future, which cancels the import
    let result = tokio::select! {
        result = Arc::clone(&state.store).import_in_background(archive, kind) => result,
        _ = tokio::signal::ctrl_c() => Err(ImportError::Cancelled),
    };
    let info = result.with_context(|| format!("failed to import {display}"))?;

    Ok(format!("Imported {} as {} dictionary {}", info.name, kind, info.order))
}

fn list(state: &AppState, only: Option<Kind>, as_json: bool) -> String {
    let kinds: Vec<DictionaryType> = match only {
        Some(kind) => vec![kind.into()],
        None => DictionaryType::ALL.to_vec(),
    };

    if as_json {
        let listing: serde_json::Map<String, Value> = kinds
            .iter()
            .map(|&kind| {
                let dictionaries: Vec<Value> =
                    state.store.dictionaries(kind).iter().map(info_json).collect();
                (kind.to_string(), Value::Array(dictionaries))
            })
            .collect();
        return Value::Object(listing).to_string();
    }

    let mut out = String::new();
    for kind in kinds {
        for info in state.store.dictionaries(kind) {
            let marker = if info.is_enabled { '*' } else { ' ' };
            let _ = writeln!(out, "{kind:<9} {:>2} {marker} {}", info.order, info.name);
        }
    }
    out.trim_end().to_string()
}

fn info_json(info: &DictionaryInfo) -> Value {
    json!({
        "name": info.name,
        "fileName": info.file_name,
        "isEnabled": info.is_enabled,
        "order": info.order,
    })
}

/// Glossary content as plain lines; structured content is shown raw
fn glossary_lines(content: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<Value>>(content) {
        Ok(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect(),
        Err(_) => vec![content.to_string()],
    }
}

pub fn render_entries(entries: &[EntryData]) -> String {
    if entries.is_empty() {
        return "No results".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = write!(out, "{}", entry.expression);
        if entry.reading != entry.expression {
            let _ = write!(out, "【{}】", entry.reading);
        }
        if !entry.deinflection_trace.is_empty() {
            let _ = write!(out, " ({} ← {})", entry.matched, entry.trace_names().join(" ← "));
        }
        out.push('\n');

        for glossary in &entry.glossaries {
            let _ = writeln!(out, "  [{}] {}", glossary.dictionary, glossary_lines(&glossary.content).join("; "));
        }
        for frequency in &entry.frequencies {
            let values: Vec<&str> = frequency
                .frequencies
                .iter()
                .map(|f| f.display_value.as_str())
                .collect();
            let _ = writeln!(out, "  freq {}: {}", frequency.dictionary, values.join(", "));
        }
        for pitch in &entry.pitches {
            let positions: Vec<String> = pitch.pitch_positions.iter().map(u32::to_string).collect();
            let _ = writeln!(out, "  pitch {}: [{}]", pitch.dictionary, positions.join(", "));
        }
    }
    out.trim_end().to_string()
}
