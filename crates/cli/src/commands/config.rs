use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pricewise_core::config::LoadOptions;
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match pricewise_core::config::AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", &["PRICEWISE_DATABASE_URL"]),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", &["PRICEWISE_DATABASE_MAX_CONNECTIONS"]),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", &["PRICEWISE_DATABASE_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "rates.include_builtin",
        &config.rates.include_builtin.to_string(),
        source("rates.include_builtin", &["PRICEWISE_RATES_INCLUDE_BUILTIN"]),
    ));
    let pairs = if config.rates.pairs.is_empty() {
        "<none>".to_string()
    } else {
        config
            .rates
            .pairs
            .iter()
            .map(|pair| format!("{}->{}={}", pair.from, pair.to, pair.rate))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let pairs_source = source("rates.pairs", &["PRICEWISE_RATES_PAIRS"]);
    lines.push(render_line("rates.pairs", &pairs, pairs_source));
    lines.push(format!("- rates.effective_pairs = {}", config.rate_table().len()));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["PRICEWISE_LOGGING_LEVEL", "PRICEWISE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["PRICEWISE_LOGGING_FORMAT", "PRICEWISE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("pricewise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/pricewise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) =
        env_keys.iter().find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
