use std::sync::Arc;

use hoshi_config::Config;
use hoshi_config::storage::StorageConfig;
use hoshi_dictionary::testutil::{ArchiveBuilder, frequency, term};
use serde_json::json;
use tempfile::TempDir;

use crate::cli::{Command, Kind};
use crate::commands::run;
use crate::state::AppState;

fn app(dir: &TempDir) -> Arc<AppState> {
    let config = Config {
        storage: StorageConfig::new(dir.path().join("data")),
        ..Config::default()
    };
    Arc::new(AppState::new(config))
}

async fn import(state: &Arc<AppState>, dir: &TempDir, archive: ArchiveBuilder, kind: Kind) -> String {
    let path = archive.write(&dir.path().join(format!("{}.zip", state.store.snapshot().catalog().len(kind.into()))));
    run(state, Command::Import { archive: path, kind }, false)
        .await
        .unwrap()
}

fn jmdict() -> ArchiveBuilder {
    ArchiveBuilder::new("JMdict").term_bank(1, json!([term("食べる", "たべる", "v1", "to eat", 1)]))
}

#[tokio::test]
async fn import_then_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let state = app(&dir);

    let message = import(&state, &dir, jmdict(), Kind::Term).await;
    assert_eq!(message, "Imported JMdict as term dictionary 0");

    let freq = ArchiveBuilder::new("JPDB").meta_bank(1, json!([frequency("食べる", "たべる", 713)]));
    let path = freq.write(&dir.path().join("freq.zip"));
    run(&state, Command::Import { archive: path, kind: Kind::Frequency }, false)
        .await
        .unwrap();

    let output = run(
        &state,
        Command::Lookup {
            text: "食べたとき".to_string(),
            offset: 0,
            max_results: None,
        },
        false,
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        "食べる【たべる】 (食べた ← past)\n  [JMdict] to eat\n  freq JPDB: 713"
    );
}

#[tokio::test]
async fn lookup_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let state = app(&dir);
    import(&state, &dir, jmdict(), Kind::Term).await;

    let output = run(
        &state,
        Command::Lookup {
            text: "食べた".to_string(),
            offset: 0,
            max_results: Some(1),
        },
        true,
    )
    .await
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value[0]["expression"], "食べる");
    assert_eq!(value[0]["matched"], "食べた");
    assert_eq!(value[0]["deinflectionTrace"][0]["name"], "past");
}

#[tokio::test]
async fn catalog_commands_persist() {
    let dir = tempfile::tempdir().unwrap();
    let state = app(&dir);
    import(&state, &dir, jmdict(), Kind::Term).await;
    import(
        &state,
        &dir,
        ArchiveBuilder::new("Daijirin").term_bank(1, json!([term("猫", "ねこ", "", "cat", 1)])),
        Kind::Term,
    )
    .await;

    run(&state, Command::Disable { kind: Kind::Term, order: 0 }, false)
        .await
        .unwrap();
    let listing = run(&state, Command::Move { kind: Kind::Term, from: 1, to: 0 }, false)
        .await
        .unwrap();
    assert_eq!(listing, "term       0 * Daijirin\nterm       1   JMdict");

    let reopened = app(&dir);
    let listing = run(&reopened, Command::List { kind: None }, true).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&listing).unwrap();
    assert_eq!(value["term"][0]["name"], "Daijirin");
    assert_eq!(value["term"][1]["isEnabled"], false);
    assert_eq!(value["frequency"], json!([]));

    let message = run(&reopened, Command::Delete { kind: Kind::Term, order: 1 }, false)
        .await
        .unwrap();
    assert_eq!(message, "Deleted JMdict");
}

#[tokio::test]
async fn failures_surface_as_errors() {
    let dir = tempfile::tempdir().unwrap();
    let state = app(&dir);

    let missing = dir.path().join("missing.zip");
    let err = run(&state, Command::Import { archive: missing, kind: Kind::Term }, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to import"));

    assert!(
        run(&state, Command::Enable { kind: Kind::Pitch, order: 0 }, false)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn counts_chapter_characters_and_stores_css() {
    let dir = tempfile::tempdir().unwrap();
    let state = app(&dir);
    let chapter = dir.path().join("chapter.xhtml");
    std::fs::write(
        &chapter,
        "<html><body><p><ruby>漢字<rt>かんじ</rt></ruby>です。</p></body></html>",
    )
    .unwrap();

    let count = run(&state, Command::Count { file: chapter }, false).await.unwrap();
    assert_eq!(count, "4");

    run(&state, Command::Css { css: Some("p { color: red; }".to_string()) }, false)
        .await
        .unwrap();
    let css = run(&state, Command::Css { css: None }, false).await.unwrap();
    assert_eq!(css, "p { color: red; }");
}
