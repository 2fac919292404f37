use std::collections::BTreeMap;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use pricewise_core::domain::offer::Offer;
use pricewise_core::domain::product::{Product, ProductId, ProductSku};
use pricewise_core::domain::supplier::{Supplier, SupplierId};
use pricewise_core::errors::ApplicationError;
use pricewise_core::service::OfferRepository;

use super::{ProductRepository, RepositoryError, SupplierRepository};

#[derive(Default)]
pub struct InMemorySupplierRepository {
    suppliers: RwLock<BTreeMap<SupplierId, Supplier>>,
}

#[async_trait]
impl SupplierRepository for InMemorySupplierRepository {
    async fn find_by_id(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let suppliers = self.suppliers.read().await;
        Ok(suppliers.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let suppliers = self.suppliers.read().await;
        Ok(suppliers.values().cloned().collect())
    }

    async fn save(&self, supplier: Supplier) -> Result<(), RepositoryError> {
        let mut suppliers = self.suppliers.write().await;
        suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let mut suppliers = self.suppliers.write().await;
        suppliers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound { entity: "supplier", key: id.to_string() })
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn find_by_sku(&self, sku: &ProductSku) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().find(|product| &product.sku == sku).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products.values().cloned().collect();
        listed.sort_by(|left, right| left.sku.cmp(&right.sku));
        Ok(listed)
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id, product);
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound { entity: "product", key: id.0.to_string() })
    }
}

/// Offer list held in memory. Scopes by sku only; date, quantity and supplier
/// status are left to the engine.
#[derive(Default)]
pub struct InMemoryOfferRepository {
    offers: RwLock<Vec<Offer>>,
}

impl InMemoryOfferRepository {
    pub fn with_offers(offers: Vec<Offer>) -> Self {
        Self { offers: RwLock::new(offers) }
    }

    pub async fn insert(&self, offer: Offer) {
        self.offers.write().await.push(offer);
    }

    pub async fn len(&self) -> usize {
        self.offers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.offers.read().await.is_empty()
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn fetch_candidates(
        &self,
        sku: &ProductSku,
        _as_of: NaiveDate,
        _min_quantity_hint: u32,
    ) -> Result<Vec<Offer>, ApplicationError> {
        let offers = self.offers.read().await;
        Ok(offers.iter().filter(|offer| &offer.sku == sku).cloned().collect())
    }
}
