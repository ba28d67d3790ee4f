//! Configuration management for RW navigation.
//!
//! Parses `rw-nav.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `navigation.source`
//! - `store.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override navigation tree file.
    pub source: Option<PathBuf>,
    /// Override persisted store directory.
    pub store_dir: Option<PathBuf>,
    /// Override persisted store namespace key.
    pub namespace: Option<String>,
    /// Override persistence enabled flag.
    pub persist: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw-nav.toml";

/// Store key used when the config does not name one.
pub const DEFAULT_NAMESPACE: &str = "quartz-open-sections";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Navigation tree configuration (paths are relative strings from TOML).
    navigation: NavigationConfigRaw,
    /// Persisted store configuration (paths are relative strings from TOML).
    store: StoreConfigRaw,
    /// Scroll-spy tuning.
    pub scroll_spy: ScrollSpyConfig,
    /// Deferred scroll-into-view tuning.
    pub reveal: RevealConfig,

    /// Resolved navigation configuration (set after loading).
    #[serde(skip)]
    pub navigation_resolved: NavigationConfig,
    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw navigation configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct NavigationConfigRaw {
    source: Option<String>,
    default_open: Vec<String>,
}

/// Resolved navigation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct NavigationConfig {
    /// Navigation tree file (YAML or JSON).
    pub source: PathBuf,
    /// Titles of nodes that are open when no persisted entry exists.
    pub default_open: Vec<String>,
}

/// Raw store configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    dir: Option<String>,
    namespace: Option<String>,
    enabled: Option<bool>,
}

/// Resolved persisted store configuration.
#[derive(Debug, Default)]
pub struct StoreConfig {
    /// Directory holding the file-backed store.
    pub dir: PathBuf,
    /// Key the expansion state is stored under.
    pub namespace: String,
    /// Whether expansion state is persisted at all.
    pub enabled: bool,
}

/// Scroll-spy configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollSpyConfig {
    /// Top fraction of the viewport that counts as the activation zone.
    pub activation_zone: f64,
    /// Slack in pixels for the bottom-of-page rule.
    pub bottom_epsilon: f64,
    /// Visibility ratios at which the host reports intersection changes.
    pub thresholds: Vec<f64>,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            activation_zone: 0.4,
            bottom_epsilon: 10.0,
            thresholds: vec![0.0, 0.1, 0.5, 1.0],
        }
    }
}

/// Deferred scroll-into-view configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay before revealing the active sidebar node, in milliseconds.
    pub delay_ms: u64,
}

impl RevealConfig {
    /// Reveal delay as a [`Duration`].
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { delay_ms: 100 }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`store.dir`").
        field: String,
        /// Error message (e.g., "${`XDG_STATE_HOME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rw-nav.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source) = &settings.source {
            self.navigation_resolved.source.clone_from(source);
        }
        if let Some(dir) = &settings.store_dir {
            self.store_resolved.dir.clone_from(dir);
        }
        if let Some(namespace) = &settings.namespace {
            self.store_resolved.namespace.clone_from(namespace);
        }
        if let Some(persist) = settings.persist {
            self.store_resolved.enabled = persist;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        discover_from(&cwd)
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            navigation: NavigationConfigRaw::default(),
            store: StoreConfigRaw::default(),
            scroll_spy: ScrollSpyConfig::default(),
            reveal: RevealConfig::default(),
            navigation_resolved: NavigationConfig {
                source: base.join("navigation.yaml"),
                default_open: Vec::new(),
            },
            store_resolved: StoreConfig {
                dir: base.join(".rw").join("nav-state"),
                namespace: DEFAULT_NAMESPACE.to_owned(),
                enabled: true,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.store_resolved.namespace, "store.namespace")?;
        self.validate_scroll_spy()?;
        Ok(())
    }

    /// Validate scroll-spy configuration.
    fn validate_scroll_spy(&self) -> Result<(), ConfigError> {
        let spy = &self.scroll_spy;

        if spy.activation_zone.is_nan() || spy.activation_zone <= 0.0 || spy.activation_zone > 1.0 {
            return Err(ConfigError::Validation(
                "scroll_spy.activation_zone must be in (0, 1]".to_owned(),
            ));
        }
        if spy.bottom_epsilon.is_nan() || spy.bottom_epsilon < 0.0 {
            return Err(ConfigError::Validation(
                "scroll_spy.bottom_epsilon cannot be negative".to_owned(),
            ));
        }
        if spy.thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(ConfigError::Validation(
                "scroll_spy.thresholds must be within [0, 1]".to_owned(),
            ));
        }
        if spy.thresholds.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::Validation(
                "scroll_spy.thresholds must be sorted ascending".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref source) = self.navigation.source {
            self.navigation.source = Some(expand::expand_env(source, "navigation.source")?);
        }
        if let Some(ref dir) = self.store.dir {
            self.store.dir = Some(expand::expand_env(dir, "store.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.navigation_resolved = NavigationConfig {
            source: resolve(self.navigation.source.as_deref(), "navigation.yaml"),
            default_open: self.navigation.default_open.clone(),
        };

        self.store_resolved = StoreConfig {
            dir: resolve(self.store.dir.as_deref(), ".rw/nav-state"),
            namespace: self
                .store
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned()),
            enabled: self.store.enabled.unwrap_or(true),
        };
    }
}

/// Walk from `start` up through its parents looking for `rw-nav.toml`.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.navigation_resolved.source,
            PathBuf::from("/test/navigation.yaml")
        );
        assert!(config.navigation_resolved.default_open.is_empty());
        assert_eq!(
            config.store_resolved.dir,
            PathBuf::from("/test/.rw/nav-state")
        );
        assert_eq!(config.store_resolved.namespace, "quartz-open-sections");
        assert!(config.store_resolved.enabled);
        assert_eq!(config.scroll_spy, ScrollSpyConfig::default());
        assert_eq!(config.reveal.delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!((config.scroll_spy.activation_zone - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.reveal.delay_ms, 100);
    }

    #[test]
    fn test_parse_scroll_spy_config() {
        let toml = r"
[scroll_spy]
activation_zone = 0.25
bottom_epsilon = 2.5
thresholds = [0.0, 1.0]
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.scroll_spy,
            ScrollSpyConfig {
                activation_zone: 0.25,
                bottom_epsilon: 2.5,
                thresholds: vec![0.0, 1.0],
            }
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[navigation]
source = "site/nav.json"
default_open = ["Introduction"]

[store]
dir = "state"
namespace = "docs-sidebar"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.navigation_resolved.source,
            PathBuf::from("/project/site/nav.json")
        );
        assert_eq!(
            config.navigation_resolved.default_open,
            vec!["Introduction".to_owned()]
        );
        assert_eq!(config.store_resolved.dir, PathBuf::from("/project/state"));
        assert_eq!(config.store_resolved.namespace, "docs-sidebar");
        assert!(config.store_resolved.enabled);
    }

    #[test]
    fn test_store_can_be_disabled() {
        let mut config: Config = toml::from_str("[store]\nenabled = false\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert!(!config.store_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_source() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source: Some(PathBuf::from("/custom/nav.yaml")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.navigation_resolved.source,
            PathBuf::from("/custom/nav.yaml")
        );
        assert_eq!(
            config.store_resolved.dir,
            PathBuf::from("/test/.rw/nav-state")
        ); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_store() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            store_dir: Some(PathBuf::from("/tmp/state")),
            namespace: Some("other".to_owned()),
            persist: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.store_resolved.dir, PathBuf::from("/tmp/state"));
        assert_eq!(config.store_resolved.namespace, "other");
        assert!(!config.store_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.store_resolved.namespace, DEFAULT_NAMESPACE);
        assert!(config.store_resolved.enabled);
    }

    fn assert_validation_error(config: &Config, expected: &str) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(
            err.to_string().contains(expected),
            "'{err}' should mention '{expected}'"
        );
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_namespace() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.store_resolved.namespace = String::new();
        assert_validation_error(&config, "store.namespace");
    }

    #[test]
    fn test_validate_activation_zone_bounds() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.scroll_spy.activation_zone = 0.0;
        assert_validation_error(&config, "activation_zone");

        config.scroll_spy.activation_zone = 1.5;
        assert_validation_error(&config, "activation_zone");

        config.scroll_spy.activation_zone = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_negative_epsilon() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.scroll_spy.bottom_epsilon = -1.0;
        assert_validation_error(&config, "bottom_epsilon");
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.scroll_spy.thresholds = vec![0.0, 1.2];
        assert_validation_error(&config, "within [0, 1]");

        config.scroll_spy.thresholds = vec![0.5, 0.1];
        assert_validation_error(&config, "sorted");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/rw-nav.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rw-nav.toml");
        std::fs::write(&path, "[navigation]\nsource = \"nav.json\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.navigation_resolved.source, tmp.path().join("nav.json"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rw-nav.toml");
        std::fs::write(&path, "[scroll_spy]\nactivation_zone = 2.0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_applies_cli_settings_last() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rw-nav.toml");
        std::fs::write(&path, "[store]\nnamespace = \"from-file\"\n").unwrap();
        let settings = CliSettings {
            namespace: Some("from-cli".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.store_resolved.namespace, "from-cli");
    }

    #[test]
    fn test_load_rejects_empty_namespace_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rw-nav.toml");
        std::fs::write(&path, "[store]\nnamespace = \"from-file\"\n").unwrap();
        let settings = CliSettings {
            namespace: Some(String::new()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("store.namespace")));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("docs/guide");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            discover_from(&nested),
            Some(tmp.path().join(CONFIG_FILENAME))
        );
    }
}
