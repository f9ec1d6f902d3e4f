use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use storefront_core::config::RecommendationsConfig;
use storefront_core::domain::order::UserId;
use storefront_core::domain::product::ProductId;
use storefront_core::domain::session::RecentlyViewed;
use storefront_store::{CatalogFixture, InMemoryProductCache};
use storefront_worker::{ComputeOutcome, FixedClock, RecommendationService, Viewer};

use crate::commands::{
    load_config, load_fixture, render_products, runtime, CommandResult, EXIT_COMPUTATION,
    EXIT_INVALID_REQUEST,
};

#[derive(Debug, Clone)]
pub struct RecommendArgs {
    pub catalog: PathBuf,
    pub user: u64,
    pub viewed: Vec<u64>,
    pub at: Option<String>,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let fixture = match load_fixture("recommend", &args.catalog) {
        Ok(fixture) => fixture,
        Err(result) => return result,
    };
    let now = match parse_instant(args.at.as_deref()) {
        Ok(now) => now,
        Err(message) => {
            return CommandResult::failure(
                "recommend",
                "invalid_request",
                message,
                EXIT_INVALID_REQUEST,
            );
        }
    };
    let runtime = match runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let user_id = UserId(args.user);
    let viewed = RecentlyViewed::from(args.viewed.iter().copied().map(ProductId).collect::<Vec<_>>());
    let service = service_for(fixture, config.recommendations, now);

    runtime.block_on(async {
        match service.compute_for_user(user_id, &viewed).await {
            Ok(ComputeOutcome::Cached { products }) => {
                let served = service.recommendations_for(Viewer::User(user_id), &viewed).await;
                let mut lines = vec![format!("user {user_id}: {products} personal recommendations")];
                lines.extend(render_products(&served));
                CommandResult::success("recommend", lines.join("\n"))
            }
            Ok(ComputeOutcome::Skipped) => {
                let popular = service.popular().await;
                let mut lines = vec![format!(
                    "user {user_id}: no purchases or views in the window, serving {} popular products",
                    popular.len()
                )];
                lines.extend(render_products(&popular));
                CommandResult::success("recommend", lines.join("\n"))
            }
            Err(error) => CommandResult::rejected(
                "recommend",
                "recommendation_failed",
                error,
                EXIT_COMPUTATION,
            ),
        }
    })
}

pub(crate) fn service_for(
    fixture: CatalogFixture,
    settings: RecommendationsConfig,
    now: DateTime<Utc>,
) -> RecommendationService {
    let (catalog, orders) = fixture.into_repositories();
    RecommendationService::new(
        Arc::new(catalog),
        Arc::new(orders),
        Arc::new(InMemoryProductCache::new()),
        settings,
    )
    .with_clock(Arc::new(FixedClock(now)))
}

fn parse_instant(raw: Option<&str>) -> Result<DateTime<Utc>, String> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<DateTime<Utc>>()
            .map_err(|error| format!("invalid instant `{raw}`: {error}")),
        None => Ok(Utc::now()),
    }
}
