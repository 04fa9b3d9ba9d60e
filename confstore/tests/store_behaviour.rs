//! End-to-end behaviour of `ConfigStore` across sources and formats.

use anyhow::{Result, anyhow, ensure};
use camino::Utf8Path;
use confstore::{ConfigStore, ConstantRegistry, Format, RegistryError, Source};
use rstest::rstest;
use serde_json::{Value, json};
use test_helpers::files::write_files;

fn store_with(tree: Value) -> ConfigStore {
    let mut store = ConfigStore::new();
    assert!(store.integrate([tree]).is_clean());
    store
}

#[rstest]
#[case::sibling_fallback(
    json!({"log": {"timeZone": "Europe/Berlin"}, "console": {"level": "INFO"}}),
    "console/timeZone",
    Some(json!("Europe/Berlin"))
)]
#[case::exact_match_wins(
    json!({"console": {"timeZone": "UTC"}, "log": {"timeZone": "Europe/Berlin"}}),
    "console/timeZone",
    Some(json!("UTC"))
)]
#[case::deeper_ancestor_wins(
    json!({"timeZone": "root", "app": {"timeZone": "app", "db": {}}}),
    "app/db/timeZone",
    Some(json!("app"))
)]
#[case::missing_everywhere(json!({"a": {"b": 1}}), "a/c", None)]
#[case::single_segment_has_no_fallback(json!({"a": {"c": 1}}), "c", None)]
fn path_lookup(#[case] tree: Value, #[case] path: &str, #[case] expected: Option<Value>) {
    let store = store_with(tree);
    assert_eq!(store.get(path), expected.as_ref());
}

#[test]
fn empty_store_answers_absent() {
    let store = ConfigStore::new();
    assert_eq!(store.get("missing/path"), None);
    assert_eq!(store.get(""), None);
}

#[test]
fn static_keys_survive_later_merges() {
    let mut store = store_with(json!({"a": {"b": 1}}));
    store.set_protected(json!({"a": {"b": true}}));
    assert!(store.integrate([json!({"a": {"b": 99, "c": 1}})]).is_clean());
    assert_eq!(store.export(), json!({"a": {"b": 1, "c": 1}}));
}

#[test]
fn later_scalars_replace_earlier_ones() {
    let mut store = ConfigStore::new();
    let report = store.integrate([
        Source::text("server:\n  port: 80\n  hosts: [a, b]\n"),
        Source::text(r#"{"server": {"port": 8080, "hosts": ["c"]}}"#),
    ]);
    assert!(report.is_clean());
    assert_eq!(
        store.export(),
        json!({"server": {"port": 8080, "hosts": ["c"]}})
    );
}

#[test]
fn files_in_every_format_merge_in_glob_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non UTF-8 tempdir"))?;
    write_files(
        root,
        &[
            ("conf.d/10-base.yaml", "app:\n  name: demo\n  workers: 2\n"),
            ("conf.d/20-tuning.json", r#"{"app": {"workers": 8}}"#),
            ("conf.d/30-legacy.ini", "[app]\ndebug = on\nname = \"legacy\"\n"),
            ("conf.d/notes.txt", "ignored"),
        ],
    )?;
    let mut store = ConfigStore::new();
    let report = store.integrate([Source::glob(root.join("conf.d/*-*.*").as_str())]);
    ensure!(report.is_clean(), "unexpected failures: {report}");
    ensure!(report.merged().len() == 3, "merged {:?}", report.merged());
    ensure!(
        store.export() == json!({"app": {"name": "legacy", "workers": 8, "debug": true}}),
        "unexpected tree {}",
        store.export()
    );
    Ok(())
}

#[test]
fn unreadable_and_unparseable_files_are_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non UTF-8 tempdir"))?;
    let written = write_files(root, &[("good.yaml", "a: 1\n"), ("bad.conf", "nothing here")])?;
    let mut store = ConfigStore::new();
    let mut sources: Vec<Source> = written.into_iter().map(Source::from).collect();
    sources.push(Source::file(root.join("absent.yaml")));
    let report = store.integrate(sources);

    let kinds: Vec<&str> = report
        .failures()
        .iter()
        .map(|err| match **err {
            RegistryError::ParseFailed { .. } => "parse",
            RegistryError::SourceUnreadable { .. } => "unreadable",
            _ => "other",
        })
        .collect();
    ensure!(kinds == ["parse", "unreadable"], "unexpected failures {kinds:?}");
    ensure!(store.export() == json!({"a": 1}), "good file should still merge");
    Ok(())
}

#[test]
fn zero_match_glob_is_silent() {
    let mut store = store_with(json!({"kept": 1}));
    let report = store.integrate(["*.nomatch"]);
    assert!(report.is_clean());
    assert_eq!(store.export(), json!({"kept": 1}));
}

#[test]
fn binary_export_restores_into_a_fresh_store() -> Result<()> {
    let original = store_with(json!({
        "z": {"nested": [1, 2.5, "three", null, true]},
        "a": {"big": u64::MAX, "negative": -7}
    }));
    let bytes = original
        .export_as(Format::Binary)
        .map_err(|err| anyhow!(err.to_string()))?;
    let mut restored = ConfigStore::new();
    ensure!(restored.integrate([bytes]).is_clean(), "binary payload rejected");
    ensure!(restored.export() == original.export(), "tree changed in transit");
    ensure!(
        restored.keys().collect::<Vec<_>>() == ["z", "a"],
        "key order changed in transit"
    );
    Ok(())
}

#[test]
fn constants_resolve_from_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non UTF-8 tempdir"))?;
    let written = write_files(
        root,
        &[
            ("ok.yaml", "log:\n  level: !const Level::WARN\n"),
            ("broken.yaml", "log:\n  sink: !const Sink::NOWHERE\n"),
        ],
    )?;
    let constants = ConstantRegistry::new().with("Level", "WARN", json!(300));
    let mut store = ConfigStore::builder().constants(constants).build();
    let report = store.integrate(written);
    ensure!(report.failures().len() == 1, "the unknown constant should fail its file");
    ensure!(store.get("log/level") == Some(&json!(300)), "constant not resolved");
    ensure!(store.get("log/sink").is_none(), "broken file must not merge");
    Ok(())
}
