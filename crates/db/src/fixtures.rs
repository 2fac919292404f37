use serde::Serialize;
use sqlx::Executor;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_SUPPLIER_IDS: &[i64] = &[1, 2, 3, 4];

const SEED_PRODUCT_SKUS: &[&str] = &["ABC123", "XYZ777", "QWE456"];

const SEED_PRICE_IDS: &[&str] = &[
    "0b7e9d3c-5a2f-4c61-8e0d-000000000201",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000202",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000203",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000204",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000205",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000206",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000207",
    "0b7e9d3c-5a2f-4c61-8e0d-000000000208",
];

/// Resolutions the seeded catalog is expected to produce with the built-in
/// rate table, one per decisive tie-break level plus the missing-rate case.
pub const SEED_SCENARIOS: &[SeedScenario] = &[
    SeedScenario {
        name: "lowest_price",
        sku: "ABC123",
        quantity: 120,
        currency: "EUR",
        date: "2025-06-15",
        expected: Some(ExpectedWinner {
            supplier_id: 2,
            unit_price: "9.20",
            total_price: "1104.00",
            decided_by: "lowest_price",
        }),
        description: "USD offer converts below the preferred EUR offer; GBP offer has no rate",
    },
    SeedScenario {
        name: "preferred_supplier",
        sku: "XYZ777",
        quantity: 10,
        currency: "USD",
        date: "2025-06-15",
        expected: Some(ExpectedWinner {
            supplier_id: 1,
            unit_price: "2.00",
            total_price: "20.00",
            decided_by: "preferred_supplier",
        }),
        description: "equal USD prices, only supplier 1 is preferred",
    },
    SeedScenario {
        name: "shortest_lead_time",
        sku: "QWE456",
        quantity: 5,
        currency: "EUR",
        date: "2025-06-15",
        expected: Some(ExpectedWinner {
            supplier_id: 3,
            unit_price: "4.00",
            total_price: "20.00",
            decided_by: "shortest_lead_time",
        }),
        description: "equal EUR prices, neither preferred, 5 vs 15 day lead time",
    },
    SeedScenario {
        name: "no_rate",
        sku: "QWE456",
        quantity: 5,
        currency: "GBP",
        date: "2025-06-15",
        expected: None,
        description: "EUR offers cannot be converted to GBP with the built-in table",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeedScenario {
    pub name: &'static str,
    pub sku: &'static str,
    pub quantity: i64,
    pub currency: &'static str,
    pub date: &'static str,
    pub expected: Option<ExpectedWinner>,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExpectedWinner {
    pub supplier_id: i64,
    pub unit_price: &'static str,
    pub total_price: &'static str,
    pub decided_by: &'static str,
}

/// Deterministic supplier catalog: four suppliers, three products and eight
/// prices valid through 2025.
pub struct CatalogSeed;

impl CatalogSeed {
    pub const SQL: &str = include_str!("../../../config/fixtures/catalog_seed.sql");

    /// Loads the catalog. Rows that already exist are left untouched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let result = SeedResult {
            suppliers: SEED_SUPPLIER_IDS.len(),
            products: SEED_PRODUCT_SKUS.len(),
            prices: SEED_PRICE_IDS.len(),
            scenarios: SEED_SCENARIOS.to_vec(),
        };
        info!(
            event_name = "db.seed.loaded",
            suppliers = result.suppliers,
            products = result.products,
            prices = result.prices,
            "catalog seed loaded"
        );
        Ok(result)
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let supplier_ids = sql_array_from_ints(SEED_SUPPLIER_IDS);
        let suppliers: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM supplier WHERE id IN {supplier_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("suppliers", suppliers == SEED_SUPPLIER_IDS.len() as i64));

        let inactive: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM supplier WHERE id = 4 AND active = 0)")
                .fetch_one(pool)
                .await?;
        checks.push(("inactive-supplier", inactive == 1));

        let skus = sql_array_from_ids(SEED_PRODUCT_SKUS);
        let products: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(1) FROM product WHERE sku IN {skus}"))
                .fetch_one(pool)
                .await?;
        checks.push(("products", products == SEED_PRODUCT_SKUS.len() as i64));

        let price_ids = sql_array_from_ids(SEED_PRICE_IDS);
        let prices: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM supplier_price WHERE id IN {price_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("prices", prices == SEED_PRICE_IDS.len() as i64));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes seeded rows, prices first so foreign keys hold.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let price_ids = sql_array_from_ids(SEED_PRICE_IDS);
        let skus = sql_array_from_ids(SEED_PRODUCT_SKUS);
        let supplier_ids = sql_array_from_ints(SEED_SUPPLIER_IDS);

        sqlx::query(&format!("DELETE FROM supplier_price WHERE id IN {price_ids}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM product WHERE sku IN {skus}")).execute(&mut *tx).await?;
        sqlx::query(&format!("DELETE FROM supplier WHERE id IN {supplier_ids}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

fn sql_array_from_ints(ids: &[i64]) -> String {
    let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub suppliers: usize,
    pub products: usize,
    pub prices: usize,
    pub scenarios: Vec<SeedScenario>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
