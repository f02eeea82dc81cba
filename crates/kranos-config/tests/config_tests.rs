use std::{fs, path::PathBuf};

use kranos_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_has_sensible_values() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert_eq!(cfg.renewal_window_days, 30);
    assert!(cfg.validate().is_ok());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("home")).expect("manager");

    assert!(manager.base_dir().exists());
    assert_eq!(manager.load().expect("load"), Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let cfg = Config {
        currency: "USD".to_string(),
        database_path: Some(PathBuf::from("gym.db")),
        log_filter: Some("kranos_reporter=debug".into()),
        renewal_window_days: 14,
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(manager.database_path(&loaded), dir.path().join("gym.db"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn invalid_values_are_not_saved() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    let cfg = Config {
        currency: "  ".into(),
        ..Config::default()
    };

    assert!(matches!(manager.save(&cfg), Err(ConfigError::Invalid(_))));
    assert!(!manager.config_path().exists());
}
