//! Behavioural coverage for loading configuration files from disk.

use std::cell::RefCell;
use std::fs;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use parley_config::{Config, ConfigError, NameMatching, default_log_filter, default_log_format};

struct Harness {
    temp_dir: TempDir,
    path: RefCell<Option<Utf8PathBuf>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<ConfigError>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            path: RefCell::new(None),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
        }
    }

    fn config_path(&self) -> Utf8PathBuf {
        let path = self.temp_dir.path().join("parley.toml");
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => panic!("temporary path is not UTF-8: {}", path.display()),
        }
    }

    fn write_config(&self, text: &str) {
        let path = self.config_path();
        if let Err(error) = fs::write(&path, text) {
            panic!("failed to write configuration: {error}");
        }
        *self.path.borrow_mut() = Some(path);
    }

    fn load(&self) {
        let path = self
            .path
            .borrow()
            .clone()
            .unwrap_or_else(|| self.config_path());
        match Config::load(&path) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error),
        }
    }

    fn loaded(&self) -> Config {
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the command prefix to \"{prefix}\"")]
fn given_prefix(harness: &Harness, prefix: String) {
    harness.write_config(&format!("command_prefix = \"{prefix}\"\nname_matching = \"ignore_case\"\n"));
}

#[given("an empty configuration file")]
fn given_empty_file(harness: &Harness) {
    harness.write_config("");
}

#[given("no configuration file exists")]
fn given_no_file(harness: &Harness) {
    let _ = harness;
}

#[when("the configuration loads")]
fn when_load(harness: &Harness) {
    harness.load();
}

#[then("the command prefix is \"{prefix}\"")]
fn then_prefix(harness: &Harness, prefix: String) {
    let config = harness.loaded();
    assert_eq!(config.command_prefix(), Some(prefix.as_str()));
    assert_eq!(config.name_matching(), NameMatching::IgnoreCase);
}

#[then("the built-in defaults apply")]
fn then_defaults(harness: &Harness) {
    let config = harness.loaded();
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert!(config.command_prefix().is_none());
}

#[then("loading fails with a read error")]
fn then_read_error(harness: &Harness) {
    let error = harness.error.borrow();
    assert!(
        matches!(error.as_ref(), Some(ConfigError::Read { .. })),
        "expected read error, got {:?}",
        error.as_ref()
    );
}

#[scenario(path = "tests/features/configuration_loading.feature")]
fn configuration_loading(#[from(harness)] harness: Harness) {
    let _ = harness;
}
