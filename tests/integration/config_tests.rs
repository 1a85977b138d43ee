use figment::providers::Serialized;
use pdfdedupe::actions::RemovalMode;
use pdfdedupe::config::Config;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

// Tests touching PDFDEDUPE_* variables must not interleave.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("PDFDEDUPE_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_config_load_defaults() {
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
source_dir = "/data/inbox"
final_dir = "/data/archive"
io_threads = 8
removal = "trash"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert_eq!(config.source_dir, PathBuf::from("/data/inbox"));
    assert_eq!(config.final_dir, PathBuf::from("/data/archive"));
    assert_eq!(config.io_threads, 8);
    assert_eq!(config.removal, RemovalMode::Trash);
    // untouched keys keep their defaults
    assert_eq!(config.log_dir, PathBuf::from("logs"));
    assert!(config.audit_log);
}

#[test]
fn test_config_zero_threads_clamped() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 0\n").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.io_threads, 1);
}

#[test]
fn test_config_invalid_toml_fails() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    assert!(Config::load_from_path(&config_path).is_err());

    fs::write(&config_path, "removal = \"shred\"\n").unwrap();
    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nfinal_dir = \"from_file\"\n").unwrap();

    std::env::set_var("PDFDEDUPE_IO_THREADS", "2");
    std::env::set_var("PDFDEDUPE_AUDIT_LOG", "false");
    let result = Config::load(Some(&config_path));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.io_threads, 2);
    assert!(!config.audit_log);
    assert_eq!(config.final_dir, PathBuf::from("from_file"));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();

    let err = Config::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}
