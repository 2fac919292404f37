use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use pricewise_core::domain::currency::CurrencyCode;
use pricewise_core::domain::offer::{Offer, OfferId, OfferTerms};
use pricewise_core::domain::product::ProductSku;
use pricewise_core::domain::supplier::{Supplier, SupplierId};
use pricewise_core::errors::ApplicationError;
use pricewise_core::service::OfferRepository;

use super::{decode_err, format_date, parse_date, Page, PriceFilter, RepositoryError};
use crate::DbPool;

const OFFER_COLUMNS: &str = "p.id, p.sku, p.valid_from, p.valid_to, p.currency, p.price_per_uom,
     p.min_qty, s.id AS supplier_id, s.name AS supplier_name, s.country AS supplier_country,
     s.active AS supplier_active, s.preferred AS supplier_preferred,
     s.lead_time_days AS supplier_lead_time_days";

const PRICE_FILTER_CLAUSE: &str = "(?1 IS NULL OR p.sku = ?1)
     AND (?2 IS NULL OR (p.valid_from <= ?2 AND p.valid_to >= ?2))
     AND (?3 IS NULL OR UPPER(p.currency) = UPPER(?3))
     AND (?4 IS NULL OR p.supplier_id = ?4)";

/// Supplier price list backed by the `supplier_price` table, joined with the
/// owning supplier so every row decodes into a self-contained [`Offer`].
pub struct SqlOfferRepository {
    pool: DbPool,
}

impl SqlOfferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_prices(&self, filter: &PriceFilter) -> Result<Page<Offer>, RepositoryError> {
        let (page_number, page_size) = filter.normalized_paging();
        let sku = filter.sku.as_ref().map(|sku| sku.as_str().to_string());
        let valid_on = filter.valid_on.map(format_date);
        let currency = filter.currency.as_ref().map(|code| code.as_str().to_string());
        let supplier_id = filter.supplier_id.map(|id| id.0);

        let count_sql = format!(
            "SELECT COUNT(1) FROM supplier_price p JOIN supplier s ON s.id = p.supplier_id
             WHERE {PRICE_FILTER_CLAUSE}"
        );
        let total_count: i64 = sqlx::query_scalar(&count_sql)
            .bind(&sku)
            .bind(&valid_on)
            .bind(&currency)
            .bind(supplier_id)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "SELECT {OFFER_COLUMNS}
             FROM supplier_price p JOIN supplier s ON s.id = p.supplier_id
             WHERE {PRICE_FILTER_CLAUSE}
             ORDER BY p.sku ASC, s.id ASC, p.valid_from ASC, p.id ASC
             LIMIT ?5 OFFSET ?6"
        );
        let offset = i64::from(page_number - 1) * i64::from(page_size);
        let rows = sqlx::query(&page_sql)
            .bind(&sku)
            .bind(&valid_on)
            .bind(&currency)
            .bind(supplier_id)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items: rows.iter().map(row_to_offer).collect::<Result<Vec<_>, _>>()?,
            total_count: u64::try_from(total_count).map_err(decode_err)?,
            page_number,
            page_size,
        })
    }

    /// Inserts all prices in one transaction; either every row lands or none do.
    ///
    /// A supplier may hold at most one price per sku on any given day, so a
    /// row whose window overlaps one already stored (or earlier in the same
    /// batch) rejects the whole batch.
    pub async fn insert_prices(&self, offers: &[Offer]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for offer in offers {
            let overlapping: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM supplier_price
                 WHERE supplier_id = ?1 AND sku = ?2 AND valid_from <= ?4 AND valid_to >= ?3",
            )
            .bind(offer.supplier.id.0)
            .bind(offer.sku.as_str())
            .bind(format_date(offer.valid_from))
            .bind(format_date(offer.valid_to))
            .fetch_one(&mut *tx)
            .await?;
            if overlapping > 0 {
                return Err(RepositoryError::OverlappingPrice {
                    supplier_id: offer.supplier.id.0,
                    sku: offer.sku.as_str().to_string(),
                    valid_from: offer.valid_from,
                    valid_to: offer.valid_to,
                });
            }

            sqlx::query(
                "INSERT INTO supplier_price
                     (id, supplier_id, sku, valid_from, valid_to, currency, price_per_uom, min_qty)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(offer.id.0.to_string())
            .bind(offer.supplier.id.0)
            .bind(offer.sku.as_str())
            .bind(format_date(offer.valid_from))
            .bind(format_date(offer.valid_to))
            .bind(offer.currency.as_str())
            .bind(offer.unit_price.to_string())
            .bind(i64::from(offer.min_quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(offers.len())
    }

    async fn query_candidates(
        &self,
        sku: &ProductSku,
        as_of: NaiveDate,
        min_quantity_hint: u32,
    ) -> Result<Vec<Offer>, RepositoryError> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS}
             FROM supplier_price p JOIN supplier s ON s.id = p.supplier_id
             WHERE p.sku = ?1
               AND s.active = 1
               AND p.valid_from <= ?2 AND p.valid_to >= ?2
               AND p.min_qty <= ?3
             ORDER BY s.id ASC, p.valid_from ASC, p.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(sku.as_str())
            .bind(format_date(as_of))
            .bind(i64::from(min_quantity_hint))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_offer).collect()
    }
}

#[async_trait]
impl OfferRepository for SqlOfferRepository {
    async fn fetch_candidates(
        &self,
        sku: &ProductSku,
        as_of: NaiveDate,
        min_quantity_hint: u32,
    ) -> Result<Vec<Offer>, ApplicationError> {
        let offers = self.query_candidates(sku, as_of, min_quantity_hint).await?;
        debug!(
            event_name = "db.offers.fetched",
            sku = %sku,
            as_of = %as_of,
            count = offers.len(),
            "fetched candidate offers"
        );
        Ok(offers)
    }
}

fn row_to_offer(row: &sqlx::sqlite::SqliteRow) -> Result<Offer, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let sku: String = row.try_get("sku").map_err(decode_err)?;
    let valid_from: String = row.try_get("valid_from").map_err(decode_err)?;
    let valid_to: String = row.try_get("valid_to").map_err(decode_err)?;
    let currency: String = row.try_get("currency").map_err(decode_err)?;
    let price_text: String = row.try_get("price_per_uom").map_err(decode_err)?;
    let min_qty: i64 = row.try_get("min_qty").map_err(decode_err)?;
    let supplier_id: i64 = row.try_get("supplier_id").map_err(decode_err)?;
    let lead_time_days: i64 = row.try_get("supplier_lead_time_days").map_err(decode_err)?;

    let supplier = Supplier {
        id: SupplierId(supplier_id),
        name: row.try_get("supplier_name").map_err(decode_err)?,
        country: row.try_get("supplier_country").map_err(decode_err)?,
        active: row.try_get("supplier_active").map_err(decode_err)?,
        preferred: row.try_get("supplier_preferred").map_err(decode_err)?,
        lead_time_days: u32::try_from(lead_time_days).map_err(decode_err)?,
    };
    let terms = OfferTerms {
        sku: ProductSku(sku),
        valid_from: parse_date("valid_from", &valid_from)?,
        valid_to: parse_date("valid_to", &valid_to)?,
        currency: CurrencyCode::parse(&currency).map_err(decode_err)?,
        unit_price: Decimal::from_str(&price_text).map_err(|error| {
            RepositoryError::Decode(format!("price_per_uom `{price_text}`: {error}"))
        })?,
        min_quantity: u32::try_from(min_qty).map_err(decode_err)?,
    };

    Offer::new(OfferId(Uuid::parse_str(&id).map_err(decode_err)?), supplier, terms)
        .map_err(decode_err)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use pricewise_core::domain::currency::CurrencyCode;
    use pricewise_core::domain::offer::{Offer, OfferId, OfferTerms};
    use pricewise_core::domain::product::{Product, ProductId, ProductSku};
    use pricewise_core::domain::supplier::{Supplier, SupplierId};
    use pricewise_core::service::OfferRepository;

    use super::SqlOfferRepository;
    use crate::repositories::{
        PriceFilter, ProductRepository, RepositoryError, SqlProductRepository,
        SqlSupplierRepository, SupplierRepository,
    };
    use crate::{connect_with_settings, migrations};

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, d).expect("valid date")
    }

    fn supplier(id: i64, active: bool) -> Supplier {
        Supplier {
            id: SupplierId(id),
            name: format!("Supplier {id}"),
            country: "Germany".to_string(),
            active,
            preferred: id == 1,
            lead_time_days: 5,
        }
    }

    fn offer(supplier: &Supplier, sku: &str, currency: &str, cents: i64, min_qty: u32) -> Offer {
        Offer::new(
            OfferId(Uuid::new_v4()),
            supplier.clone(),
            OfferTerms {
                sku: ProductSku::from(sku),
                valid_from: day(3, 1),
                valid_to: day(3, 31),
                currency: CurrencyCode::parse(currency).expect("currency"),
                unit_price: Decimal::new(cents, 2),
                min_quantity: min_qty,
            },
        )
        .expect("valid offer")
    }

    async fn setup() -> (SqlOfferRepository, Vec<Supplier>) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let suppliers = vec![supplier(1, true), supplier(2, true), supplier(3, false)];
        let supplier_repo = SqlSupplierRepository::new(pool.clone());
        for supplier in &suppliers {
            supplier_repo.save(supplier.clone()).await.expect("save supplier");
        }
        let product_repo = SqlProductRepository::new(pool.clone());
        for sku in ["ABC123", "XYZ777"] {
            product_repo
                .save(Product {
                    id: ProductId(Uuid::new_v4()),
                    sku: ProductSku::from(sku),
                    name: sku.to_string(),
                    uom: "PIECE".to_string(),
                    hazard_class: "N/A".to_string(),
                })
                .await
                .expect("save product");
        }

        (SqlOfferRepository::new(pool), suppliers)
    }

    #[tokio::test]
    async fn inserted_prices_round_trip_with_supplier_snapshot() {
        let (repo, suppliers) = setup().await;
        let stored = offer(&suppliers[0], "ABC123", "eur", 950, 100);

        assert_eq!(repo.insert_prices(std::slice::from_ref(&stored)).await.expect("insert"), 1);

        let page = repo.list_prices(&PriceFilter::default()).await.expect("list");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items, vec![stored]);
    }

    #[tokio::test]
    async fn insert_is_all_or_nothing() {
        let (repo, suppliers) = setup().await;
        let good = offer(&suppliers[0], "ABC123", "EUR", 950, 1);
        let unknown_product = offer(&suppliers[1], "NOPE", "EUR", 100, 1);

        assert!(repo.insert_prices(&[good, unknown_product]).await.is_err());

        let page = repo.list_prices(&PriceFilter::default()).await.expect("list");
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn overlapping_window_for_same_supplier_and_sku_is_rejected() {
        let (repo, suppliers) = setup().await;
        let march = offer(&suppliers[0], "ABC123", "EUR", 950, 1);
        repo.insert_prices(std::slice::from_ref(&march)).await.expect("insert");

        let mut late_march = offer(&suppliers[0], "ABC123", "EUR", 900, 1);
        late_march.valid_from = day(3, 31);
        late_march.valid_to = day(4, 30);
        let error = repo.insert_prices(&[late_march]).await.expect_err("overlap");
        assert!(matches!(
            error,
            RepositoryError::OverlappingPrice { supplier_id: 1, ref sku, .. } if sku == "ABC123"
        ));

        let mut april = offer(&suppliers[0], "ABC123", "EUR", 900, 1);
        april.valid_from = day(4, 1);
        april.valid_to = day(4, 30);
        let other_supplier = offer(&suppliers[1], "ABC123", "EUR", 950, 1);
        let in_batch_duplicate = offer(&suppliers[1], "ABC123", "USD", 1000, 1);
        assert!(repo
            .insert_prices(&[april.clone(), other_supplier.clone(), in_batch_duplicate])
            .await
            .is_err());

        assert_eq!(repo.insert_prices(&[april, other_supplier]).await.expect("insert"), 2);
        let page = repo.list_prices(&PriceFilter::default()).await.expect("list");
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn fetch_candidates_scopes_by_sku_date_quantity_and_active_supplier() {
        let (repo, suppliers) = setup().await;
        let keep = offer(&suppliers[1], "ABC123", "USD", 1000, 100);
        let other_sku = offer(&suppliers[0], "XYZ777", "EUR", 200, 1);
        let inactive = offer(&suppliers[2], "ABC123", "USD", 500, 1);
        let min_qty_too_high = offer(&suppliers[0], "ABC123", "EUR", 950, 500);
        repo.insert_prices(&[keep.clone(), other_sku, inactive, min_qty_too_high])
            .await
            .expect("insert");

        let found = repo
            .fetch_candidates(&ProductSku::from("ABC123"), day(3, 31), 120)
            .await
            .expect("fetch");
        assert_eq!(found, vec![keep]);

        let outside_window = repo
            .fetch_candidates(&ProductSku::from("ABC123"), day(4, 1), 120)
            .await
            .expect("fetch");
        assert!(outside_window.is_empty());
    }

    #[tokio::test]
    async fn list_prices_filters_currency_case_insensitively_and_pages() {
        let (repo, suppliers) = setup().await;
        repo.insert_prices(&[
            offer(&suppliers[0], "ABC123", "EUR", 950, 1),
            offer(&suppliers[1], "ABC123", "USD", 1000, 1),
            offer(&suppliers[0], "XYZ777", "EUR", 200, 1),
            offer(&suppliers[1], "XYZ777", "EUR", 210, 1),
        ])
        .await
        .expect("insert");

        let eur = PriceFilter {
            currency: Some(CurrencyCode::parse("eur").expect("currency")),
            page_size: 2,
            ..PriceFilter::default()
        };
        let first = repo.list_prices(&eur).await.expect("first page");
        assert_eq!(first.total_count, 3);
        assert_eq!(first.items.len(), 2);
        assert!(first.has_next_page());

        let second =
            repo.list_prices(&PriceFilter { page_number: 2, ..eur }).await.expect("second page");
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].sku, ProductSku::from("XYZ777"));
        assert_eq!(second.items[0].supplier.id, SupplierId(2));

        let by_supplier = repo
            .list_prices(&PriceFilter {
                supplier_id: Some(SupplierId(2)),
                valid_on: Some(day(3, 15)),
                ..PriceFilter::default()
            })
            .await
            .expect("by supplier");
        assert_eq!(by_supplier.total_count, 2);

        let expired = repo
            .list_prices(&PriceFilter { valid_on: Some(day(5, 1)), ..PriceFilter::default() })
            .await
            .expect("expired");
        assert_eq!(expired.total_count, 0);
    }
}
