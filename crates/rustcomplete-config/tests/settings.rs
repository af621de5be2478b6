use std::sync::Arc;
use std::time::Duration;

use rustcomplete_config::*;

#[test]
fn test_settings_default() {
    let settings = Settings::default();
    assert_eq!(settings.racer, "racer");
    assert_eq!(settings.cargo, "cargo");
    assert!(settings.search_paths.is_empty());
    assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert!(settings.has_cargo());
}

#[test]
fn test_empty_cargo_disables_project_lookup() {
    let settings = Settings {
        cargo: "  ".to_string(),
        ..Settings::default()
    };
    assert!(!settings.has_cargo());
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(*store.current(), Settings::default());
}

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let settings = Settings {
        racer: "/opt/racer/bin/racer".to_string(),
        cargo: String::new(),
        search_paths: vec!["~/src/rust/src".to_string(), "/usr/src/rust".to_string()],
        timeout_ms: 750,
    };
    std::fs::write(&path, toml::to_string(&settings).unwrap()).unwrap();

    let store = SettingsStore::load(&path).unwrap();
    assert_eq!(*store.current(), settings);
    assert_eq!(store.path(), Some(path.as_path()));
}

#[test]
fn test_partial_json_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "search_paths": ["/c"] }"#).unwrap();

    let store = SettingsStore::load(&path).unwrap();
    let current = store.current();
    assert_eq!(current.search_paths, vec!["/c".to_string()]);
    assert_eq!(current.racer, "racer");
    assert_eq!(current.timeout_ms, DEFAULT_TIMEOUT_MS);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "timeout_ms = 0\n").unwrap();

    assert!(matches!(
        SettingsStore::load(&path),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_reload_replaces_snapshot_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "racer = \"racer-a\"\nsearch_paths = [\"/a\"]\n").unwrap();

    let store = SettingsStore::load(&path).unwrap();
    let mut rx = store.subscribe();
    assert_eq!(store.current().racer, "racer-a");

    std::fs::write(&path, "racer = \"racer-b\"\n").unwrap();
    let reloaded = store.reload().unwrap();

    assert_eq!(reloaded.racer, "racer-b");
    assert!(reloaded.search_paths.is_empty());
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().racer, "racer-b");
}

#[test]
fn test_watch_requires_a_file() {
    let store = Arc::new(SettingsStore::default());
    assert!(matches!(store.watch(), Err(ConfigError::NotFound)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_reloads_on_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "racer = \"before\"\n").unwrap();

    let store = Arc::new(SettingsStore::load(&path).unwrap());
    let mut rx = store.subscribe();
    let watcher = store.watch().unwrap();
    assert_eq!(watcher.path(), path.as_path());

    std::fs::write(&path, "racer = \"after\"\n").unwrap();

    let changed = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            rx.changed().await.unwrap();
            if rx.borrow_and_update().racer == "after" {
                break;
            }
        }
    })
    .await;

    assert!(changed.is_ok(), "settings watcher never reloaded");
    assert_eq!(store.current().racer, "after");
}
