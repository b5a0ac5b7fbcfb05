use std::path::PathBuf;

use action_editor::config::Config;
use action_editor::form::ValidationMode;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file, None);
    assert_eq!(config.storage.database_path, None);
    assert_eq!(config.editor.validation_mode, ValidationMode::OnBlur);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("level = \"info\""));
    assert!(toml_str.contains("validation_mode = \"on_blur\""));
}

#[test]
fn test_partial_config_deserialization() {
    // Test that partial TOML configs merge with defaults
    let partial_toml = r#"
[logging]
enabled = true

[editor]
validation_mode = "on_submit"
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert!(config.logging.enabled);
    assert_eq!(config.editor.validation_mode, ValidationMode::OnSubmit);

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.storage.database_path, None);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[storage]
database_path = "/var/lib/action-editor/workspace.db"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();

    assert_eq!(
        config.database_path().unwrap(),
        PathBuf::from("/var/lib/action-editor/workspace.db")
    );
    assert_eq!(config.logging.level_filter().unwrap(), log::LevelFilter::Debug);
}

#[test]
fn test_invalid_level_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"verbose\"\n").unwrap();

    assert!(Config::load(Some(path.as_path())).is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(Some(dir.path().join("absent.toml").as_path())).is_err());
}

#[test]
fn test_unknown_validation_mode_is_rejected() {
    let result: Result<Config, _> = toml::from_str("[editor]\nvalidation_mode = \"sometimes\"\n");
    assert!(result.is_err());
}
