use std::sync::Arc;

use hoshi_config::lookup::LookupConfig;
use hoshi_core::dictionary::{DictionaryType, EntryData};
use hoshi_core::language::LanguageProcessor;
use hoshi_dictionary::DictionaryStore;
use hoshi_dictionary::testutil::{ArchiveBuilder, TestStore, frequency, pitch, term};
use serde_json::json;

use crate::processor::JapaneseProcessor;

struct Fixture {
    _scratch: TestStore,
    store: Arc<DictionaryStore>,
    processor: JapaneseProcessor,
}

fn fixture(archives: Vec<(ArchiveBuilder, DictionaryType)>) -> Fixture {
    let scratch = TestStore::new();
    for (archive, kind) in archives {
        scratch.import(archive, kind);
    }
    let store = Arc::new(scratch.reopen());
    let processor = JapaneseProcessor::new(Arc::clone(&store), LookupConfig::default());
    Fixture {
        _scratch: scratch,
        store,
        processor,
    }
}

fn jmdict() -> (ArchiveBuilder, DictionaryType) {
    let archive = ArchiveBuilder::new("JMdict").term_bank(
        1,
        json!([
            term("食べる", "たべる", "v1", "to eat", 1),
            term("食べ物", "たべもの", "", "food", 2),
            term("時", "とき", "", "time", 3),
            term("今日", "きょう", "", "today", 4),
        ]),
    );
    (archive, DictionaryType::Term)
}

/// Two term dictionaries sharing the reading はし
fn bridges() -> Vec<(ArchiveBuilder, DictionaryType)> {
    let a = ArchiveBuilder::new("A").term_bank(
        1,
        json!([
            term("橋", "はし", "", "bridge", 2),
            term("箸", "はし", "", "chopsticks", 1),
        ]),
    );
    let b = ArchiveBuilder::new("B").term_bank(
        1,
        json!([
            term("端", "はし", "", "edge", 0),
            term("橋", "はし", "", "bridge (B)", 5),
        ]),
    );
    vec![(a, DictionaryType::Term), (b, DictionaryType::Term)]
}

fn expressions(entries: &[EntryData]) -> Vec<&str> {
    entries.iter().map(|e| e.expression.as_str()).collect()
}

fn glossary_sources(entry: &EntryData) -> Vec<&str> {
    entry.glossaries.iter().map(|g| g.dictionary.as_str()).collect()
}

#[test]
fn resolves_past_tense_at_cursor() {
    let f = fixture(vec![jmdict()]);

    let entries = f.processor.lookup("食べたとき", 0, 16);

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.matched, "食べた");
    assert_eq!(entry.expression, "食べる");
    assert_eq!(entry.reading, "たべる");
    assert_eq!(entry.trace_names(), vec!["past"]);
    assert!(!entry.deinflection_trace[0].description.is_empty());
    assert_eq!(glossary_sources(entry), vec!["JMdict"]);
    assert_eq!(entry.glossaries[0].content, r#"["to eat"]"#);
}

#[test]
fn offset_counts_characters() {
    let f = fixture(vec![jmdict()]);

    let entries = f.processor.lookup("今日は食べたとき", 3, 16);
    assert_eq!(entries[0].matched, "食べた");

    let entries = f.processor.lookup("今日は食べたとき", 0, 16);
    assert_eq!(expressions(&entries), vec!["今日"]);

    assert!(f.processor.lookup("食べた", 3, 16).is_empty());
    assert!(f.processor.lookup("食べた", 100, 16).is_empty());
}

#[test]
fn window_stops_at_non_word_characters() {
    let f = fixture(vec![jmdict()]);

    assert!(f.processor.lookup("、食べる", 0, 16).is_empty());
    assert!(f.processor.lookup("食べ、る", 0, 16).is_empty());
    assert_eq!(f.processor.lookup("食べる。", 0, 16)[0].matched, "食べる");
}

#[test]
fn scan_length_bounds_the_window() {
    let f = fixture(vec![jmdict()]);
    let config = LookupConfig {
        scan_length: 2,
        ..LookupConfig::default()
    };
    let processor = JapaneseProcessor::new(Arc::clone(&f.store), config);

    assert!(processor.lookup("食べた", 0, 16).is_empty());
    assert_eq!(f.processor.lookup("食べた", 0, 16).len(), 1);
}

#[test]
fn dictionary_form_has_empty_trace() {
    let f = fixture(vec![jmdict()]);

    let entries = f.processor.lookup("食べる", 0, 16);

    assert_eq!(expressions(&entries), vec!["食べる"]);
    assert!(entries[0].deinflection_trace.is_empty());
}

#[test]
fn inflected_forms_need_a_matching_word_class() {
    let archive = ArchiveBuilder::new("Untagged")
        .term_bank(1, json!([term("食べる", "たべる", "", "to eat", 1)]));
    let f = fixture(vec![(archive, DictionaryType::Term)]);

    assert!(f.processor.lookup("食べた", 0, 16).is_empty());
    assert_eq!(f.processor.lookup("食べる", 0, 16).len(), 1);
}

#[test]
fn longest_match_wins_exclusively() {
    let archive = ArchiveBuilder::new("Words").term_bank(
        1,
        json!([
            term("日", "ひ", "", "day", 1),
            term("日本", "にほん", "", "Japan", 2),
            term("日本語", "にほんご", "", "Japanese", 3),
        ]),
    );
    let f = fixture(vec![(archive, DictionaryType::Term)]);

    let entries = f.processor.lookup("日本語です", 0, 16);

    assert_eq!(expressions(&entries), vec!["日本語"]);
    assert!(entries.iter().all(|e| e.matched == "日本語"));
}

#[test]
fn matches_by_reading() {
    let f = fixture(vec![jmdict()]);

    let entries = f.processor.lookup("たべた", 0, 16);

    assert_eq!(expressions(&entries), vec!["食べる"]);
    assert_eq!(entries[0].matched, "たべた");
}

#[test]
fn normalizes_width_before_matching() {
    let archive = ArchiveBuilder::new("Loanwords")
        .term_bank(1, json!([term("CD", "シーディー", "", "compact disc", 1)]));
    let f = fixture(vec![(archive, DictionaryType::Term)]);

    let entries = f.processor.lookup("ＣＤを", 0, 16);

    assert_eq!(expressions(&entries), vec!["CD"]);
    assert_eq!(entries[0].matched, "ＣＤ");
}

#[test]
fn keeps_voicing_marks_with_their_kana() {
    let archive = ArchiveBuilder::new("Loanwords")
        .term_bank(1, json!([term("データ", "データ", "", "data", 1)]));
    let f = fixture(vec![(archive, DictionaryType::Term)]);

    let entries = f.processor.lookup("ﾃﾞｰﾀです", 0, 16);
    assert_eq!(expressions(&entries), vec!["データ"]);
    assert_eq!(entries[0].matched, "ﾃﾞｰﾀ");

    let entries = f.processor.lookup("テ\u{3099}ータ", 0, 16);
    assert_eq!(expressions(&entries), vec!["データ"]);

    assert!(f.processor.lookup("ﾞｰﾀ", 0, 16).is_empty());
}

#[test]
fn ranks_by_catalog_order_then_sequence() {
    let f = fixture(bridges());

    let entries = f.processor.lookup("はし", 0, 16);
    assert_eq!(expressions(&entries), vec!["箸", "橋", "端"]);
    assert_eq!(glossary_sources(&entries[1]), vec!["A", "B"]);
    assert_eq!(entries[1].glossaries[1].content, r#"["bridge (B)"]"#);

    f.store.move_dictionary(1, 0, DictionaryType::Term).unwrap();

    let entries = f.processor.lookup("はし", 0, 16);
    assert_eq!(expressions(&entries), vec!["端", "橋", "箸"]);
    assert_eq!(glossary_sources(&entries[1]), vec!["B", "A"]);
}

#[test]
fn truncation_keeps_whole_entries_in_rank_order() {
    let f = fixture(bridges());
    let all = f.processor.lookup("はし", 0, 16);

    for max_results in 0..=all.len() {
        let entries = f.processor.lookup("はし", 0, max_results);
        assert_eq!(entries.len(), max_results);
        assert_eq!(entries.as_slice(), &all[..max_results]);
    }
}

#[test]
fn disabled_and_deleted_dictionaries_are_ignored() {
    let f = fixture(bridges());

    f.store.toggle_dictionary(0, false, DictionaryType::Term).unwrap();
    let entries = f.processor.lookup("はし", 0, 16);
    assert_eq!(expressions(&entries), vec!["端", "橋"]);
    assert!(entries.iter().all(|e| glossary_sources(e) == vec!["B"]));

    f.store.delete_dictionary(1, DictionaryType::Term).unwrap();
    assert!(f.processor.lookup("はし", 0, 16).is_empty());
}

#[test]
fn unloadable_dictionary_does_not_block_others() {
    let scratch = TestStore::new();
    for (archive, kind) in bridges() {
        scratch.import(archive, kind);
    }
    let broken = scratch.store.dictionaries(DictionaryType::Term)[0].clone();
    std::fs::write(broken.path.join("dictionary.json"), "{ truncated").unwrap();

    let store = Arc::new(scratch.reopen());
    let processor = JapaneseProcessor::new(Arc::clone(&store), LookupConfig::default());

    assert_eq!(store.dictionaries(DictionaryType::Term).len(), 2);
    let entries = processor.lookup("はし", 0, 16);
    assert_eq!(expressions(&entries), vec!["端", "橋"]);
    assert!(entries.iter().all(|e| glossary_sources(e) == vec!["B"]));
}

#[test]
fn attaches_frequency_and_pitch_in_catalog_order() {
    let f = fixture(vec![
        jmdict(),
        (
            ArchiveBuilder::new("F1").meta_bank(1, json!([frequency("食べる", "たべる", 500)])),
            DictionaryType::Frequency,
        ),
        (
            ArchiveBuilder::new("F2").meta_bank(1, json!([["食べる", "freq", 1200]])),
            DictionaryType::Frequency,
        ),
        (
            ArchiveBuilder::new("F3").meta_bank(1, json!([frequency("食べる", "くう", 9)])),
            DictionaryType::Frequency,
        ),
        (
            ArchiveBuilder::new("P").meta_bank(
                1,
                json!([pitch("食べる", "たべる", &[2]), pitch("食べる", "くう", &[0])]),
            ),
            DictionaryType::Pitch,
        ),
    ]);

    let entry = &f.processor.lookup("食べた", 0, 16)[0];
    let sources: Vec<&str> = entry.frequencies.iter().map(|f| f.dictionary.as_str()).collect();
    assert_eq!(sources, vec!["F1", "F2"]);
    assert_eq!(entry.frequencies[0].frequencies[0].value, 500);
    assert_eq!(entry.frequencies[1].frequencies[0].value, 1200);
    assert_eq!(entry.pitches.len(), 1);
    assert_eq!(entry.pitches[0].pitch_positions, vec![2]);

    f.store.move_dictionary(1, 0, DictionaryType::Frequency).unwrap();
    f.store.toggle_dictionary(1, false, DictionaryType::Frequency).unwrap();

    let entry = &f.processor.lookup("食べた", 0, 16)[0];
    let sources: Vec<&str> = entry.frequencies.iter().map(|f| f.dictionary.as_str()).collect();
    assert_eq!(sources, vec!["F2"]);
}

#[test]
fn empty_catalog_yields_nothing() {
    let f = fixture(vec![]);

    assert!(f.processor.lookup("食べた", 0, 16).is_empty());
    assert_eq!(f.processor.language_code(), "ja");
}

#[test]
fn entries_serialize_in_camel_case() {
    let f = fixture(vec![jmdict()]);
    let entry = &f.processor.lookup("食べた", 0, 16)[0];

    let value = serde_json::to_value(entry).unwrap();

    assert_eq!(value["deinflectionTrace"][0]["name"], "past");
    assert_eq!(value["glossaries"][0]["definitionTags"], "");
    assert!(value["definitionTags"].is_array());
}
