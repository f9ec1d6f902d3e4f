use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use storefront_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field<'a> {
    key_path: &'a str,
    env_keys: &'a [&'a str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let shipping = &config.shipping;
    let recommendations = &config.recommendations;

    let fields = [
        Field {
            key_path: "shipping.tariff_book",
            env_keys: &["STOREFRONT_SHIPPING_TARIFF_BOOK"],
            value: shipping
                .tariff_book
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<built-in>".to_string()),
        },
        Field {
            key_path: "shipping.volumetric_divisor",
            env_keys: &["STOREFRONT_SHIPPING_VOLUMETRIC_DIVISOR"],
            value: shipping.volumetric_divisor.to_string(),
        },
        Field {
            key_path: "recommendations.top_n",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_TOP_N"],
            value: recommendations.top_n.to_string(),
        },
        Field {
            key_path: "recommendations.history_window_days",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_HISTORY_WINDOW_DAYS"],
            value: recommendations.history_window_days.to_string(),
        },
        Field {
            key_path: "recommendations.personal_ttl_secs",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_PERSONAL_TTL_SECS"],
            value: recommendations.personal_ttl_secs.to_string(),
        },
        Field {
            key_path: "recommendations.popular_ttl_secs",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS"],
            value: recommendations.popular_ttl_secs.to_string(),
        },
        Field {
            key_path: "recommendations.popular_limit",
            env_keys: &[],
            value: recommendations.popular_limit.to_string(),
        },
        Field {
            key_path: "recommendations.popular_min_rating",
            env_keys: &[],
            value: recommendations.popular_min_rating.to_string(),
        },
        Field {
            key_path: "recommendations.claim_ttl_secs",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_CLAIM_TTL_SECS"],
            value: recommendations.claim_ttl_secs.to_string(),
        },
        Field {
            key_path: "recommendations.worker_concurrency",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY"],
            value: recommendations.worker_concurrency.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_lowercase(),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        lines.push(render_line(
            field.key_path,
            &field.value,
            field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("storefront.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/storefront.toml");
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
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
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
