use sqlx::Row;
use uuid::Uuid;

use pricewise_core::domain::product::{Product, ProductId, ProductSku};

use super::{decode_err, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let sku: String = row.try_get("sku").map_err(decode_err)?;
    let name: String = row.try_get("name").map_err(decode_err)?;
    let uom: String = row.try_get("uom").map_err(decode_err)?;
    let hazard_class: String = row.try_get("hazard_class").map_err(decode_err)?;

    Ok(Product {
        id: ProductId(Uuid::parse_str(&id).map_err(decode_err)?),
        sku: ProductSku(sku),
        name,
        uom,
        hazard_class,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, sku, name, uom, hazard_class FROM product WHERE id = ?")
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn find_by_sku(&self, sku: &ProductSku) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, sku, name, uom, hazard_class FROM product WHERE sku = ?")
            .bind(sku.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query("SELECT id, sku, name, uom, hazard_class FROM product ORDER BY sku ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_product).collect()
    }

    /// Inserts or updates by id. The sku of an existing product is kept, since
    /// stored prices reference it.
    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, sku, name, uom, hazard_class)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 uom = excluded.uom,
                 hazard_class = excluded.hazard_class",
        )
        .bind(product.id.0.to_string())
        .bind(product.sku.as_str())
        .bind(&product.name)
        .bind(&product.uom)
        .bind(&product.hazard_class)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "product", key: id.0.to_string() });
        }
        Ok(())
    }
}
