use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::currency::CurrencyCode;
use crate::rates::StaticRateTable;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub rates: RatesConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RatesConfig {
    pub include_builtin: bool,
    pub pairs: Vec<RatePair>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatePair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
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
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://pricewise.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            rates: RatesConfig { include_builtin: true, pairs: Vec::new() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
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
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("pricewise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Rate table for the configured pairs, layered over the built-in table
    /// unless `rates.include_builtin` is off.
    pub fn rate_table(&self) -> StaticRateTable {
        let base = if self.rates.include_builtin {
            StaticRateTable::with_defaults()
        } else {
            StaticRateTable::new()
        };
        self.rates.pairs.iter().fold(base, |table, pair| {
            table.with_rate(pair.from.clone(), pair.to.clone(), pair.rate)
        })
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(rates) = patch.rates {
            if let Some(include_builtin) = rates.include_builtin {
                self.rates.include_builtin = include_builtin;
            }
            if let Some(pairs) = rates.pairs {
                self.rates.pairs = pairs
                    .into_iter()
                    .map(|pair| parse_rate_pair(&pair.from, &pair.to, &pair.rate))
                    .collect::<Result<Vec<_>, _>>()?;
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

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PRICEWISE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("PRICEWISE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("PRICEWISE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("PRICEWISE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("PRICEWISE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PRICEWISE_RATES_INCLUDE_BUILTIN") {
            self.rates.include_builtin = parse_bool("PRICEWISE_RATES_INCLUDE_BUILTIN", &value)?;
        }
        if let Some(value) = read_env("PRICEWISE_RATES_PAIRS") {
            self.rates.pairs = parse_rate_pairs_env("PRICEWISE_RATES_PAIRS", &value)?;
        }

        let log_level =
            read_env("PRICEWISE_LOGGING_LEVEL").or_else(|| read_env("PRICEWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PRICEWISE_LOGGING_FORMAT").or_else(|| read_env("PRICEWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_rates(&self.rates)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pricewise.toml"), PathBuf::from("config/pricewise.toml")]
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

fn parse_rate_pair(from: &str, to: &str, rate: &str) -> Result<RatePair, ConfigError> {
    let from = CurrencyCode::parse(from)
        .map_err(|error| ConfigError::Validation(format!("rates.pairs.from: {error}")))?;
    let to = CurrencyCode::parse(to)
        .map_err(|error| ConfigError::Validation(format!("rates.pairs.to: {error}")))?;
    let rate = Decimal::from_str(rate.trim()).map_err(|_| {
        ConfigError::Validation(format!("rates.pairs.rate `{rate}` is not a decimal number"))
    })?;
    Ok(RatePair { from, to, rate })
}

/// `USD:CHF=0.88,EUR:CHF=0.95`
fn parse_rate_pairs_env(key: &str, value: &str) -> Result<Vec<RatePair>, ConfigError> {
    let invalid =
        || ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() };

    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (currencies, rate) = entry.split_once('=').ok_or_else(invalid)?;
            let (from, to) = currencies.split_once(':').ok_or_else(invalid)?;
            parse_rate_pair(from, to, rate).map_err(|_| invalid())
        })
        .collect()
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_rates(rates: &RatesConfig) -> Result<(), ConfigError> {
    for pair in &rates.pairs {
        if pair.from == pair.to {
            return Err(ConfigError::Validation(format!(
                "rates.pairs entry {}->{} is redundant: same-currency rate is always 1",
                pair.from, pair.to
            )));
        }
        if pair.rate <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "rates.pairs entry {}->{} must have a positive rate",
                pair.from, pair.to
            )));
        }
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

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    rates: Option<RatesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RatesPatch {
    include_builtin: Option<bool>,
    pairs: Option<Vec<RatePairPatch>>,
}

#[derive(Debug, Deserialize)]
struct RatePairPatch {
    from: String,
    to: String,
    rate: String,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
