use std::path::Path;

use chrono::Utc;

use crate::commands::recommend::service_for;
use crate::commands::{load_config, load_fixture, render_products, runtime, CommandResult};

pub fn run(catalog: &Path) -> CommandResult {
    let config = match load_config("popular") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let fixture = match load_fixture("popular", catalog) {
        Ok(fixture) => fixture,
        Err(result) => return result,
    };
    let runtime = match runtime("popular") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let service = service_for(fixture, config.recommendations, Utc::now());
    let popular = runtime.block_on(service.popular());

    let mut lines = vec![format!("{} popular products", popular.len())];
    lines.extend(render_products(&popular));
    CommandResult::success("popular", lines.join("\n"))
}
