use std::path::PathBuf;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use storefront_core::domain::order::UserId;
use storefront_core::domain::product::ProductId;
use storefront_core::shipping::{CartLine, CheckoutShippingRequest, ShippingResolver};
use storefront_store::{CatalogFixture, CatalogRepository, OrderRepository};

type FixtureTestResult<T = ()> = Result<T, String>;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join("catalog.json")
}

fn load() -> FixtureTestResult<CatalogFixture> {
    CatalogFixture::load(&fixture_path()).map_err(|error| error.to_string())
}

#[test]
fn bundled_catalog_is_valid() -> FixtureTestResult {
    let fixture = load()?;

    if fixture.products.len() != 12 {
        return Err(format!("expected 12 products, found {}", fixture.products.len()));
    }
    let recommendable = fixture.products.iter().filter(|p| p.is_recommendable()).count();
    if recommendable != 10 {
        return Err(format!("expected 10 recommendable products, found {recommendable}"));
    }
    Ok(())
}

#[test]
fn every_warehouse_city_is_served_by_the_builtin_book() -> FixtureTestResult {
    let fixture = load()?;
    let resolver = ShippingResolver::default();

    for product in &fixture.products {
        if resolver.resolve_zone(&product.warehouse_city).is_none() {
            return Err(format!(
                "product {} ships from unzoned city `{}`",
                product.id, product.warehouse_city
            ));
        }
    }
    Ok(())
}

#[test]
fn mixed_warehouse_cart_skips_product_without_weight() -> FixtureTestResult {
    let fixture = load()?;
    let resolver = ShippingResolver::default();
    let lines: Vec<CartLine<'_>> = [1, 3, 12]
        .into_iter()
        .map(|id| {
            fixture
                .product(ProductId(id))
                .map(|product| CartLine { product, quantity: 1 })
                .ok_or_else(|| format!("product {id} missing from fixture"))
        })
        .collect::<Result<_, _>>()?;
    let request =
        CheckoutShippingRequest::parse("Тверь", "Курьером").map_err(|error| error.to_string())?;

    let quote = resolver
        .estimate_cart(&request, &lines)
        .ok_or_else(|| "cart should be quotable".to_string())?;

    if quote.groups.len() != 2 {
        return Err(format!("expected moscow and kazan groups, got {:?}", quote.groups));
    }
    if quote.groups[0].skipped_products != vec![ProductId(12)] {
        return Err(format!("magnifier should be skipped, got {:?}", quote.groups[0]));
    }
    let sum: Decimal = quote.groups.iter().map(|group| group.cost).sum();
    if sum != quote.total {
        return Err(format!("total {} is not the sum of groups {}", quote.total, sum));
    }
    Ok(())
}

#[tokio::test]
async fn repositories_expose_fixture_data() -> FixtureTestResult {
    let (catalog, orders) = load()?.into_repositories();
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).single().ok_or("bad timestamp")?;

    let snapshot = catalog.snapshot().await.map_err(|error| error.to_string())?;
    if snapshot.first().map(|product| product.id) != Some(ProductId(1)) {
        return Err("snapshot should keep catalog order".to_string());
    }

    let recent = orders
        .lines_for_user_since(UserId(4), now - Duration::days(90))
        .await
        .map_err(|error| error.to_string())?;
    if recent.len() != 1 || recent[0].product_id != ProductId(5) {
        return Err(format!("user 4 should have one recent purchase, got {recent:?}"));
    }
    Ok(())
}
