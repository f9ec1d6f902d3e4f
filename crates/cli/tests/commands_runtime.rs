use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use storefront_cli::commands::cart::{self, CartArgs};
use storefront_cli::commands::quote::{self, QuoteArgs};
use storefront_cli::commands::recommend::{self, RecommendArgs};
use storefront_cli::commands::{doctor, popular};

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../store/fixtures/catalog.json")
}

fn quote_args(from: &str, to: &str, weight: &str, method: &str) -> QuoteArgs {
    QuoteArgs {
        from: from.to_string(),
        to: to.to_string(),
        weight: weight.to_string(),
        method: method.to_string(),
    }
}

#[test]
fn quote_prices_moscow_to_kazan_pickup_at_base_rate() {
    with_env(&[], || {
        let result = quote::run(&quote_args("Москва", "Казань", "1.0", "pickup"));
        assert_eq!(result.exit_code, 0, "expected successful quote: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["status"], "ok");
        assert!(message(&payload).ends_with(": 400.00"), "{}", message(&payload));
    });
}

#[test]
fn quote_treats_same_city_spellings_as_one_city() {
    with_env(&[], || {
        let result = quote::run(&quote_args("Москва", "  москва ", "2.5", "Курьером"));
        assert_eq!(result.exit_code, 0, "expected successful quote: {}", result.output);

        let payload = parse_payload(&result.output);
        assert!(message(&payload).ends_with(": 360.00"), "{}", message(&payload));
    });
}

#[test]
fn quote_reports_unknown_city_as_unquotable() {
    with_env(&[], || {
        let result = quote::run(&quote_args("Москва", "Атлантида", "1", "courier"));
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "unquotable");
    });
}

#[test]
fn quote_rejects_missing_method() {
    with_env(&[], || {
        let result = quote::run(&quote_args("Москва", "Казань", "1", " "));
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_request");
        assert_eq!(payload["message"], "provide city and method");
    });
}

#[test]
fn rejected_requests_carry_hint_and_correlation_id() {
    with_env(&[], || {
        let first = parse_payload(&quote::run(&quote_args("Москва", "", "1", "pickup")).output);
        let second = parse_payload(&quote::run(&quote_args("Москва", "", "1", "pickup")).output);

        assert_eq!(
            first["hint"],
            "The request could not be processed. Check inputs and try again."
        );
        let id = first["correlation_id"].as_str().unwrap_or_default();
        assert_eq!(id.len(), 36, "{id}");
        assert_ne!(first["correlation_id"], second["correlation_id"]);
    });
}

#[test]
fn successful_commands_omit_error_metadata() {
    with_env(&[], || {
        let result = quote::run(&quote_args("Москва", "Казань", "1", "pickup"));
        let payload = parse_payload(&result.output);
        assert!(payload.get("hint").is_none());
        assert!(payload.get("correlation_id").is_none());
    });
}

#[test]
fn invalid_configuration_fails_before_quoting() {
    with_env(&[("STOREFRONT_RECOMMENDATIONS_TOP_N", "0")], || {
        let result = quote::run(&quote_args("Москва", "Казань", "1", "pickup"));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
        assert_eq!(payload["hint"], "An unexpected internal error occurred.");
    });
}

#[test]
fn missing_tariff_book_is_reported() {
    with_env(&[("STOREFRONT_SHIPPING_TARIFF_BOOK", "/nonexistent/tariffs.toml")], || {
        let result = quote::run(&quote_args("Москва", "Казань", "1", "pickup"));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "tariff_book");
    });
}

#[test]
fn custom_tariff_book_replaces_builtin_rates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tariffs.toml");
    std::fs::write(
        &path,
        r#"
[zones]
"самара" = 1
"тольятти" = 1

[[matrix]]
from = 1
to = 1
class = 1

[[rates]]
class = 1
method = "courier"
base = "150.00"
per_kg = "10.00"

[[rates]]
class = 1
method = "pickup"
base = "90.00"
per_kg = "5.00"
"#,
    )
    .expect("write tariff book");

    with_env(&[("STOREFRONT_SHIPPING_TARIFF_BOOK", path.to_str().expect("utf-8 path"))], || {
        let result = quote::run(&quote_args("Самара", "Тольятти", "3", "courier"));
        assert_eq!(result.exit_code, 0, "expected successful quote: {}", result.output);

        let payload = parse_payload(&result.output);
        assert!(message(&payload).ends_with(": 170.00"), "{}", message(&payload));
    });
}

#[test]
fn cart_groups_lines_by_warehouse() {
    with_env(&[], || {
        let args = CartArgs {
            catalog: catalog_path(),
            to: "Тверь".to_string(),
            method: "courier".to_string(),
            items: vec!["1:2".to_string(), "3".to_string(), "12".to_string()],
        };
        let result = cart::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful cart quote: {}", result.output);

        let payload = parse_payload(&result.output);
        let text = message(&payload);
        assert!(text.starts_with("shipping to тверь by courier: "), "{text}");
        assert!(text.contains("- from москва: "), "{text}");
        assert!(text.contains("- from казань: "), "{text}");
        assert!(text.contains("(no weight for 12)"), "{text}");
    });
}

#[test]
fn cart_rejects_unknown_products() {
    with_env(&[], || {
        let args = CartArgs {
            catalog: catalog_path(),
            to: "Тверь".to_string(),
            method: "pickup".to_string(),
            items: vec!["404".to_string()],
        };
        let result = cart::run(&args);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_request");
    });
}

#[test]
fn cart_reports_unreadable_catalog() {
    with_env(&[], || {
        let args = CartArgs {
            catalog: PathBuf::from("/nonexistent/catalog.json"),
            to: "Тверь".to_string(),
            method: "pickup".to_string(),
            items: vec!["1".to_string()],
        };
        let result = cart::run(&args);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "catalog_fixture");
    });
}

#[test]
fn recommend_ranks_catalog_for_user_with_purchases() {
    with_env(&[], || {
        let args = RecommendArgs {
            catalog: catalog_path(),
            user: 1,
            viewed: Vec::new(),
            at: Some("2026-10-17T12:00:00Z".to_string()),
        };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful run: {}", result.output);

        let payload = parse_payload(&result.output);
        let text = message(&payload);
        assert!(text.starts_with("user 1: 8 personal recommendations"), "{text}");
        assert!(!text.contains("#1 Red dot sight"), "{text}");
        assert!(!text.contains("#7 Bipod"), "{text}");
    });
}

#[test]
fn recommend_falls_back_to_popular_without_history() {
    with_env(&[], || {
        let args = RecommendArgs {
            catalog: catalog_path(),
            user: 42,
            viewed: Vec::new(),
            at: Some("2026-10-17T12:00:00Z".to_string()),
        };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful run: {}", result.output);

        let text = message(&parse_payload(&result.output)).to_string();
        assert!(text.contains("serving 8 popular products"), "{text}");
    });
}

#[test]
fn popular_orders_by_purchase_count() {
    with_env(&[], || {
        let result = popular::run(&catalog_path());
        assert_eq!(result.exit_code, 0, "expected successful run: {}", result.output);

        let payload = parse_payload(&result.output);
        let mut lines = message(&payload).lines();
        assert_eq!(lines.next(), Some("8 popular products"));
        assert_eq!(lines.next(), Some("  1. #5 Tactical flashlight (7600.00)"));
        assert_eq!(lines.next(), Some("  2. #1 Red dot sight (12000.00)"));
    });
}

#[test]
fn doctor_passes_with_defaults_and_bundled_catalog() {
    with_env(&[], || {
        let catalog = catalog_path();
        let result = doctor::run(Some(catalog.as_path()), true);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][2]["name"], "catalog_fixture");
    });
}

#[test]
fn doctor_fails_when_configuration_is_invalid() {
    with_env(&[("STOREFRONT_LOG_LEVEL", "loud")], || {
        let result = doctor::run(None, false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] tariff_book"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn message(payload: &Value) -> &str {
    payload["message"].as_str().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOREFRONT_SHIPPING_TARIFF_BOOK",
        "STOREFRONT_SHIPPING_VOLUMETRIC_DIVISOR",
        "STOREFRONT_RECOMMENDATIONS_TOP_N",
        "STOREFRONT_RECOMMENDATIONS_HISTORY_WINDOW_DAYS",
        "STOREFRONT_RECOMMENDATIONS_PERSONAL_TTL_SECS",
        "STOREFRONT_RECOMMENDATIONS_POPULAR_TTL_SECS",
        "STOREFRONT_RECOMMENDATIONS_CLAIM_TTL_SECS",
        "STOREFRONT_RECOMMENDATIONS_WORKER_CONCURRENCY",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
