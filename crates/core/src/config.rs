use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Tunables for the insights engine.
///
/// The connection rules currently run on the fixed thresholds in
/// `crate::insights`; these knobs are read from configuration, validated,
/// and surfaced by `servicemap config` so operators can see the effective
/// values, but rewiring the categorical rule onto `similarity_threshold`
/// (and proximity-based gap detection onto `gap_analysis_radius_km`) is a
/// deliberate, separate change because it alters which edges the report
/// contains.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub similarity_threshold: f64,
    pub gap_analysis_radius_km: f64,
    pub cluster_min_size: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub similarity_threshold: Option<f64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { similarity_threshold: 0.7, gap_analysis_radius_km: 50.0, cluster_min_size: 3 }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Loads configuration with precedence: programmatic overrides > env
    /// (`SERVICEMAP_*`) > config file > defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("servicemap.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(engine) = patch.engine {
            if let Some(similarity_threshold) = engine.similarity_threshold {
                self.engine.similarity_threshold = similarity_threshold;
            }
            if let Some(gap_analysis_radius_km) = engine.gap_analysis_radius_km {
                self.engine.gap_analysis_radius_km = gap_analysis_radius_km;
            }
            if let Some(cluster_min_size) = engine.cluster_min_size {
                self.engine.cluster_min_size = cluster_min_size;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD") {
            self.engine.similarity_threshold =
                parse_f64("SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("SERVICEMAP_ENGINE_GAP_ANALYSIS_RADIUS_KM") {
            self.engine.gap_analysis_radius_km =
                parse_f64("SERVICEMAP_ENGINE_GAP_ANALYSIS_RADIUS_KM", &value)?;
        }
        if let Some(value) = read_env("SERVICEMAP_ENGINE_CLUSTER_MIN_SIZE") {
            self.engine.cluster_min_size =
                parse_usize("SERVICEMAP_ENGINE_CLUSTER_MIN_SIZE", &value)?;
        }

        let log_level =
            read_env("SERVICEMAP_LOGGING_LEVEL").or_else(|| read_env("SERVICEMAP_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SERVICEMAP_LOGGING_FORMAT").or_else(|| read_env("SERVICEMAP_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(similarity_threshold) = overrides.similarity_threshold {
            self.engine.similarity_threshold = similarity_threshold;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("servicemap.toml"), PathBuf::from("config/servicemap.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if !(engine.similarity_threshold > 0.0 && engine.similarity_threshold <= 1.0) {
        return Err(ConfigError::Validation(
            "engine.similarity_threshold must be in range (0, 1]".to_string(),
        ));
    }

    if !(engine.gap_analysis_radius_km > 0.0) {
        return Err(ConfigError::Validation(
            "engine.gap_analysis_radius_km must be greater than zero".to_string(),
        ));
    }

    if engine.cluster_min_size < 2 {
        return Err(ConfigError::Validation(
            "engine.cluster_min_size must be at least 2".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    similarity_threshold: Option<f64>,
    gap_analysis_radius_km: Option<f64>,
    cluster_min_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_are_valid() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars(&[
            "SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD",
            "SERVICEMAP_LOGGING_LEVEL",
            "SERVICEMAP_LOG_LEVEL",
        ]);

        let config = AppConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.engine.similarity_threshold, 0.7);
        assert_eq!(config.engine.gap_analysis_radius_km, 50.0);
        assert_eq!(config.engine.cluster_min_size, 3);
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD", "0.85");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("servicemap.toml");
            fs::write(
                &path,
                r#"
[engine]
similarity_threshold = 0.6
cluster_min_size = 4

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            if config.engine.similarity_threshold != 0.85 {
                return Err("env similarity threshold should win over file".to_string());
            }
            if config.engine.cluster_min_size != 4 {
                return Err("file cluster_min_size should win over default".to_string());
            }
            if config.logging.level != "debug" {
                return Err("override log level should win over file".to_string());
            }
            Ok(())
        })();

        clear_vars(&["SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SERVICEMAP_LOG_LEVEL", "warn");
        env::set_var("SERVICEMAP_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            if config.logging.level != "warn" {
                return Err("warn log level should be set from env alias".to_string());
            }
            if !matches!(config.logging.format, LogFormat::Pretty) {
                return Err("pretty logging format should be set from env alias".to_string());
            }
            Ok(())
        })();

        clear_vars(&["SERVICEMAP_LOG_LEVEL", "SERVICEMAP_LOG_FORMAT"]);
        result
    }

    #[test]
    fn validation_rejects_out_of_range_threshold() {
        let _guard = env_lock().lock().expect("env lock");

        env::set_var("SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD", "1.5");
        let error = AppConfig::load(LoadOptions::default());
        clear_vars(&["SERVICEMAP_ENGINE_SIMILARITY_THRESHOLD"]);

        match error {
            Err(ConfigError::Validation(message)) => {
                assert!(message.contains("similarity_threshold"), "got: {message}");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_env_override_names_the_variable() {
        let _guard = env_lock().lock().expect("env lock");

        env::set_var("SERVICEMAP_ENGINE_CLUSTER_MIN_SIZE", "three");
        let error = AppConfig::load(LoadOptions::default());
        clear_vars(&["SERVICEMAP_ENGINE_CLUSTER_MIN_SIZE"]);

        assert!(matches!(
            error,
            Err(ConfigError::InvalidEnvOverride { ref key, .. })
                if key == "SERVICEMAP_ENGINE_CLUSTER_MIN_SIZE"
        ));
    }

    #[test]
    fn missing_required_file_is_reported() {
        let _guard = env_lock().lock().expect("env lock");

        let missing = std::path::PathBuf::from("does-not-exist/servicemap.toml");
        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        });

        assert!(matches!(error, Err(ConfigError::MissingConfigFile(path)) if path == missing));
    }
}
