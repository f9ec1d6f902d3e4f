use std::path::Path;

use serde::Serialize;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::shipping::ShippingResolver;
use storefront_store::CatalogFixture;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(catalog: Option<&Path>, json_output: bool) -> CommandResult {
    let report = build_report(catalog);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(catalog: Option<&Path>) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_tariff_book(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "tariff_book",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    checks.push(check_catalog(catalog));

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_tariff_book(config: &AppConfig) -> DoctorCheck {
    let source = config
        .shipping
        .tariff_book
        .as_deref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "built-in book".to_string());

    match ShippingResolver::from_config(&config.shipping) {
        Ok(resolver) => DoctorCheck {
            name: "tariff_book",
            status: CheckStatus::Pass,
            details: format!("{source} loaded with {} rates", resolver.book().rates().len()),
        },
        Err(error) => DoctorCheck {
            name: "tariff_book",
            status: CheckStatus::Fail,
            details: format!("{source}: {error}"),
        },
    }
}

fn check_catalog(catalog: Option<&Path>) -> DoctorCheck {
    let Some(path) = catalog else {
        return DoctorCheck {
            name: "catalog_fixture",
            status: CheckStatus::Skipped,
            details: "no catalog given".to_string(),
        };
    };

    match CatalogFixture::load(path) {
        Ok(fixture) => {
            let recommendable =
                fixture.products.iter().filter(|product| product.is_recommendable()).count();
            DoctorCheck {
                name: "catalog_fixture",
                status: CheckStatus::Pass,
                details: format!(
                    "{} products ({recommendable} recommendable), {} order lines",
                    fixture.products.len(),
                    fixture.orders.len()
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "catalog_fixture",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
