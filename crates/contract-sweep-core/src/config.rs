use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory used when a command is run without a target directory.
    pub default_root: Option<String>,
    /// Destination used by `copy-finals` and `extract` when none is given.
    pub default_destination: Option<String>,
    pub keywords_csv: String,
    pub fuzzy_threshold: f64,
    pub cleaner_substrings: Vec<String>,
    pub final_folder_names: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub summary_log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_root: None,
            default_destination: None,
            keywords_csv: "data/keywords.csv".to_string(),
            fuzzy_threshold: 80.0,
            cleaner_substrings: vec!["draft".to_string(), "working".to_string()],
            final_folder_names: vec!["final".to_string(), "finals".to_string()],
            ignore_patterns: Vec::new(),
            summary_log: "deletion_summary.md".to_string(),
        }
    }
}

impl AppConfig {
    /// Pick the explicit directory, else the configured default.
    pub fn resolve_root(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| self.default_root.as_ref().map(PathBuf::from))
    }

    pub fn resolve_destination(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| self.default_destination.as_ref().map(PathBuf::from))
    }

    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

/// Load `Config.*` from the working directory, overridden by
/// `CONTRACT_SWEEP_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("CONTRACT_SWEEP").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load configuration from an explicit file, without environment overrides.
pub fn load_from_file(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fuzzy_threshold, 80.0);
        assert_eq!(config.cleaner_substrings, vec!["draft", "working"]);
        assert_eq!(config.final_folder_names, vec!["final", "finals"]);
        assert!(config.default_root.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(
            &path,
            "default_root = \"/contracts\"\nfuzzy_threshold = 90.0\n",
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.default_root.as_deref(), Some("/contracts"));
        assert_eq!(config.fuzzy_threshold, 90.0);
        assert_eq!(config.keywords_csv, "data/keywords.csv");
    }

    #[test]
    fn test_resolve_root_prefers_explicit() {
        let config = AppConfig {
            default_root: Some("/fallback".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_root(Some(PathBuf::from("/given"))),
            Some(PathBuf::from("/given"))
        );
        assert_eq!(config.resolve_root(None), Some(PathBuf::from("/fallback")));
        assert_eq!(AppConfig::default().resolve_root(None), None);
    }

    #[test]
    fn test_to_toml_roundtrips_threshold() {
        let text = AppConfig::default().to_toml().unwrap();
        assert!(text.contains("fuzzy_threshold = 80.0"));
        assert!(text.contains("summary_log = \"deletion_summary.md\""));
    }
}
