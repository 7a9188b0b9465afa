use padradio_proto::catalog::StationCatalog;
use std::path::PathBuf;
use tempfile::TempDir;

struct Sources {
    _dir: TempDir,
    custom: PathBuf,
    default: PathBuf,
}

fn sources(custom: Option<&str>, default: Option<&str>) -> Sources {
    let dir = TempDir::new().unwrap();
    let custom_path = dir.path().join("custom_stations.json");
    let default_path = dir.path().join("default_stations.json");
    if let Some(c) = custom {
        std::fs::write(&custom_path, c).unwrap();
    }
    if let Some(d) = default {
        std::fs::write(&default_path, d).unwrap();
    }
    Sources {
        _dir: dir,
        custom: custom_path,
        default: default_path,
    }
}

const DEFAULTS: &str = r#"{"fip": "http://fip", "nts1": {"url": "http://nts1"}}"#;

#[test]
fn custom_list_replaces_defaults_entirely() {
    let s = sources(Some(r#"{"x": "http://a"}"#), Some(DEFAULTS));
    let catalog = StationCatalog::load(&s.custom, &s.default);
    assert_eq!(catalog.names().collect::<Vec<_>>(), ["x"]);
    assert!(!catalog.contains("fip"));
}

#[test]
fn missing_custom_falls_back_to_defaults() {
    let s = sources(None, Some(DEFAULTS));
    let catalog = StationCatalog::load(&s.custom, &s.default);
    assert_eq!(catalog.names().collect::<Vec<_>>(), ["fip", "nts1"]);
    assert_eq!(catalog.url("nts1"), Some("http://nts1"));
}

#[test]
fn empty_or_broken_custom_falls_back_to_defaults() {
    for custom in ["{}", "{ broken", r#"{"bad": 1}"#] {
        let s = sources(Some(custom), Some(DEFAULTS));
        let catalog = StationCatalog::load(&s.custom, &s.default);
        assert_eq!(catalog.len(), 2, "custom source {custom:?}");
    }
}

#[test]
fn no_sources_gives_empty_catalog() {
    let s = sources(None, None);
    let catalog = StationCatalog::load(&s.custom, &s.default);
    assert!(catalog.is_empty());
    assert!(catalog.first().is_none());
}
