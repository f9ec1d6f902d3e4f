use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shipping::DEFAULT_VOLUMETRIC_DIVISOR;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub shipping: ShippingConfig,
    pub recommendations: RecommendationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ShippingConfig {
    /// TOML tariff book replacing the built-in one.
    pub tariff_book: Option<PathBuf>,
    pub volumetric_divisor: Decimal,
}

#[derive(Clone, Debug)]
pub struct RecommendationsConfig {
    pub top_n: usize,
    pub history_window_days: u32,
    pub personal_ttl_secs: u64,
    pub popular_ttl_secs: u64,
    pub popular_limit: usize,
    pub popular_min_rating: Decimal,
    pub claim_ttl_secs: u64,
    pub worker_concurrency: usize,
}

#[derive(Clone, Debug)]
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
    pub tariff_book: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub top_n: Option<usize>,
    pub worker_concurrency: Option<usize>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self { tariff_book: None, volumetric_divisor: DEFAULT_VOLUMETRIC_DIVISOR }
    }
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            history_window_days: 90,
            personal_ttl_secs: 60 * 60,
            popular_ttl_secs: 10 * 60,
            popular_limit: 10,
            popular_min_rating: Decimal::new(4, 0),
            claim_ttl_secs: 5 * 60,
            worker_concurrency: 4,
        }
    }
}

impl RecommendationsConfig {
    pub fn personal_ttl(&self) -> Duration {
        Duration::from_secs(self.personal_ttl_secs)
    }

    pub fn popular_ttl(&self) -> Duration {
        Duration::from_secs(self.popular_ttl_secs)
    }

    pub fn claim_ttl(&self) -> Duration {
        Duration::from_secs(self.claim_ttl_secs)
    }

    pub fn history_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.history_window_days))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingConfig::default(),
            recommendations: RecommendationsConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
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
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("storefront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(shipping) = patch.shipping {
            if let Some(tariff_book) = shipping.tariff_book {
                self.shipping.tariff_book = Some(tariff_book);
            }
            if let Some(divisor) = shipping.volumetric_divisor {
                self.shipping.volumetric_divisor = divisor;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            let target = &mut self.recommendations;
            if let Some(top_n) = recommendations.top_n {
                target.top_n = top_n;
            }
            if let Some(days) = recommendations.history_window_days {
                target.history_window_days = days;
            }
            if let Some(secs) = recommendations.personal_ttl_secs {
                target.personal_ttl_secs = secs;
            }
            if let Some(secs) = recommendations.popular_ttl_secs {
                target.popular_ttl_secs = secs;
            }
            if let Some(limit) = recommendations.popular_limit {
                target.popular_limit = limit;
            }
            if let Some(rating) = recommendations.popular_min_rating {
                target.popular_min_rating = rating;
            }
            if let Some(secs) = recommendations.claim_ttl_secs {
                target.claim_ttl_secs = secs;
            }
            if let Some(concurrency) = recommendations.worker_concurrency {
                target.worker_concurrency = concurrency;
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
        if let Some(value) = read_env("STOREFRONT_SHIPPING_TARIFF_BOOK") {
            self.shipping.tariff_book = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("STOREFRONT_SHIPPING_VOLUMETRIC_DIVISOR") {
            self.shipping.volumetric_divisor =
                parse_decimal("STOREFRONT_SHIPPING_VOLUMETRIC_DIVISOR", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_TOP_N") {
            self.recommendations.top_n = parse_usize("STOREFRONT_RECOMMENDATIONS_TOP_N", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_HISTORY_WINDOW_DAYS") {
            self.recommendations.history_window_days =
                parse_u32("STOREFRONT_RECOMMENDATIONS_HISTORY_WINDOW_DAYS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_PERSONAL_TTL_SECS") {
            self.recommendations.personal_ttl_secs =
                parse_u64("STOREFRONT_RECOMMENDATIONS_PERSONAL_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS") {
            self.recommendations.popular_ttl_secs =
                parse_u64("STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_CLAIM_TTL_SECS") {
            self.recommendations.claim_ttl_secs =
                parse_u64("STOREFRONT_RECOMMENDATIONS_CLAIM_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY") {
            self.recommendations.worker_concurrency =
                parse_usize("STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY", &value)?;
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(tariff_book) = overrides.tariff_book {
            self.shipping.tariff_book = Some(tariff_book);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(top_n) = overrides.top_n {
            self.recommendations.top_n = top_n;
        }
        if let Some(worker_concurrency) = overrides.worker_concurrency {
            self.recommendations.worker_concurrency = worker_concurrency;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_shipping(&self.shipping)?;
        validate_recommendations(&self.recommendations)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_shipping(shipping: &ShippingConfig) -> Result<(), ConfigError> {
    if shipping.volumetric_divisor <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "shipping.volumetric_divisor must be greater than zero".to_string(),
        ));
    }

    if let Some(path) = &shipping.tariff_book {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "shipping.tariff_book must not be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_recommendations(recommendations: &RecommendationsConfig) -> Result<(), ConfigError> {
    if recommendations.top_n == 0 {
        return Err(ConfigError::Validation(
            "recommendations.top_n must be greater than zero".to_string(),
        ));
    }
    if recommendations.history_window_days == 0 {
        return Err(ConfigError::Validation(
            "recommendations.history_window_days must be greater than zero".to_string(),
        ));
    }

    let ttls = [
        ("personal_ttl_secs", recommendations.personal_ttl_secs),
        ("popular_ttl_secs", recommendations.popular_ttl_secs),
        ("claim_ttl_secs", recommendations.claim_ttl_secs),
    ];
    if let Some((name, _)) = ttls.iter().find(|(_, secs)| *secs == 0) {
        return Err(ConfigError::Validation(format!(
            "recommendations.{name} must be greater than zero"
        )));
    }

    if recommendations.popular_limit == 0 {
        return Err(ConfigError::Validation(
            "recommendations.popular_limit must be greater than zero".to_string(),
        ));
    }
    if recommendations.worker_concurrency == 0 {
        return Err(ConfigError::Validation(
            "recommendations.worker_concurrency must be greater than zero".to_string(),
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

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    shipping: Option<ShippingPatch>,
    recommendations: Option<RecommendationsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShippingPatch {
    tariff_book: Option<PathBuf>,
    volumetric_divisor: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecommendationsPatch {
    top_n: Option<usize>,
    history_window_days: Option<u32>,
    personal_ttl_secs: Option<u64>,
    popular_ttl_secs: Option<u64>,
    popular_limit: Option<usize>,
    popular_min_rating: Option<Decimal>,
    claim_ttl_secs: Option<u64>,
    worker_concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use rust_decimal::Decimal;
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

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_storefront_cache_policy() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let recommendations = &config.recommendations;

        ensure(recommendations.top_n == 10, "top_n should default to 10")?;
        ensure(
            recommendations.personal_ttl() == Duration::from_secs(3_600),
            "personal list should live an hour",
        )?;
        ensure(
            recommendations.popular_ttl() == Duration::from_secs(600),
            "popular list should live ten minutes",
        )?;
        ensure(
            recommendations.history_window() == chrono::Duration::days(90),
            "purchase window should be 90 days",
        )?;
        ensure(
            config.shipping.volumetric_divisor == Decimal::new(5_000, 0),
            "volumetric divisor should default to 5000",
        )?;
        ensure(config.shipping.tariff_book.is_none(), "built-in tariff book by default")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_TARIFF_BOOK_DIR", "/etc/storefront");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storefront.toml");
            fs::write(
                &path,
                r#"
[shipping]
tariff_book = "${TEST_TARIFF_BOOK_DIR}/tariffs.toml"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.shipping.tariff_book
                    == Some(PathBuf::from("/etc/storefront/tariffs.toml")),
                "tariff book path should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_TARIFF_BOOK_DIR"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("storefront.toml");
        fs::write(&path, "[logging]\nlevel = \"${TEST_STOREFRONT_UNSET_LEVEL}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_STOREFRONT_UNSET_LEVEL"),
            "missing variable should be named",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREFRONT_LOG_LEVEL", "warn");
        env::set_var("STOREFRONT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["STOREFRONT_LOG_LEVEL", "STOREFRONT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS", "120");
        env::set_var("STOREFRONT_RECOMMENDATIONS_TOP_N", "7");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storefront.toml");
            fs::write(
                &path,
                r#"
[recommendations]
top_n = 5
popular_ttl_secs = 300
personal_ttl_secs = 1800
popular_min_rating = "4.5"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    top_n: Some(3),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.recommendations.top_n == 3, "override top_n should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.recommendations.popular_ttl_secs == 120,
                "env popular ttl should win over file and defaults",
            )?;
            ensure(
                config.recommendations.personal_ttl_secs == 1_800,
                "file personal ttl should win over defaults",
            )?;
            ensure(
                config.recommendations.popular_min_rating == Decimal::new(45, 1),
                "file rating threshold should be parsed as decimal",
            )
        })();

        clear_vars(&[
            "STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS",
            "STOREFRONT_RECOMMENDATIONS_TOP_N",
        ]);
        result
    }

    #[test]
    fn malformed_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY", "many");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY"),
                "invalid override should name the variable",
            )
        })();

        clear_vars(&["STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let cases: [(ConfigOverrides, &str); 3] = [
            (ConfigOverrides { top_n: Some(0), ..ConfigOverrides::default() }, "recommendations.top_n"),
            (
                ConfigOverrides { worker_concurrency: Some(0), ..ConfigOverrides::default() },
                "recommendations.worker_concurrency",
            ),
            (
                ConfigOverrides { log_level: Some("verbose".to_string()), ..ConfigOverrides::default() },
                "logging.level",
            ),
        ];

        for (overrides, field) in cases {
            let error = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
                Ok(_) => return Err(format!("expected validation failure for {field}")),
                Err(error) => error,
            };
            let has_message =
                matches!(error, ConfigError::Validation(ref message) if message.contains(field));
            if !has_message {
                return Err(format!("validation failure should mention {field}, got {error}"));
            }
        }

        Ok(())
    }

    #[test]
    fn zero_ttl_in_file_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("storefront.toml");
        fs::write(&path, "[recommendations]\nclaim_ttl_secs = 0\n").map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected validation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("claim_ttl_secs")),
            "validation failure should mention claim_ttl_secs",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");
        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing file failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref missing) if *missing == path),
            "missing file should be reported",
        )
    }
}
