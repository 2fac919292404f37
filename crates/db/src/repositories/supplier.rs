use sqlx::Row;

use pricewise_core::domain::supplier::{Supplier, SupplierId};

use super::{decode_err, RepositoryError, SupplierRepository};
use crate::DbPool;

pub struct SqlSupplierRepository {
    pool: DbPool,
}

impl SqlSupplierRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_supplier(row: &sqlx::sqlite::SqliteRow) -> Result<Supplier, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_err)?;
    let name: String = row.try_get("name").map_err(decode_err)?;
    let country: String = row.try_get("country").map_err(decode_err)?;
    let active: bool = row.try_get("active").map_err(decode_err)?;
    let preferred: bool = row.try_get("preferred").map_err(decode_err)?;
    let lead_time_days: i64 = row.try_get("lead_time_days").map_err(decode_err)?;

    Ok(Supplier {
        id: SupplierId(id),
        name,
        country,
        active,
        preferred,
        lead_time_days: u32::try_from(lead_time_days).map_err(|_| {
            RepositoryError::Decode(format!("supplier {id} has lead time {lead_time_days}"))
        })?,
    })
}

#[async_trait::async_trait]
impl SupplierRepository for SqlSupplierRepository {
    async fn find_by_id(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, country, active, preferred, lead_time_days
             FROM supplier WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_supplier).transpose()
    }

    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, country, active, preferred, lead_time_days
             FROM supplier ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_supplier).collect()
    }

    async fn save(&self, supplier: Supplier) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO supplier (id, name, country, active, preferred, lead_time_days)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 country = excluded.country,
                 active = excluded.active,
                 preferred = excluded.preferred,
                 lead_time_days = excluded.lead_time_days",
        )
        .bind(supplier.id.0)
        .bind(&supplier.name)
        .bind(&supplier.country)
        .bind(supplier.active)
        .bind(supplier.preferred)
        .bind(i64::from(supplier.lead_time_days))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM supplier WHERE id = ?").bind(id.0).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "supplier", key: id.to_string() });
        }
        Ok(())
    }
}
