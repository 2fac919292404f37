use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use pricewise_core::domain::currency::CurrencyCode;
use pricewise_core::domain::product::{Product, ProductId, ProductSku};
use pricewise_core::domain::supplier::{Supplier, SupplierId};
use pricewise_core::errors::ApplicationError;

pub mod memory;
pub mod offer;
pub mod product;
pub mod supplier;

pub use memory::{InMemoryOfferRepository, InMemoryProductRepository, InMemorySupplierRepository};
pub use offer::SqlOfferRepository;
pub use product::SqlProductRepository;
pub use supplier::SqlSupplierRepository;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{entity} `{key}` was not found")]
    NotFound { entity: &'static str, key: String },
    #[error("supplier {supplier_id} already prices `{sku}` within {valid_from}..{valid_to}")]
    OverlappingPrice { supplier_id: i64, sku: String, valid_from: NaiveDate, valid_to: NaiveDate },
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn find_by_id(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError>;
    async fn save(&self, supplier: Supplier) -> Result<(), RepositoryError>;
    async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_sku(&self, sku: &ProductSku) -> Result<Option<Product>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError>;
}

/// Optional filters over the stored price list. `None` means "any".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceFilter {
    pub sku: Option<ProductSku>,
    pub valid_on: Option<NaiveDate>,
    pub currency: Option<CurrencyCode>,
    pub supplier_id: Option<SupplierId>,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            sku: None,
            valid_on: None,
            currency: None,
            supplier_id: None,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PriceFilter {
    /// Page number clamped to at least 1 and page size to `1..=MAX_PAGE_SIZE`.
    pub fn normalized_paging(&self) -> (u32, u32) {
        (self.page_number.max(1), self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_number) < self.total_pages()
    }
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|error| RepositoryError::Decode(format!("{field} `{value}`: {error}")))
}

#[cfg(test)]
mod tests {
    use pricewise_core::errors::ApplicationError;

    use super::{Page, PriceFilter, RepositoryError, MAX_PAGE_SIZE};

    #[test]
    fn repository_errors_surface_as_persistence_failures() {
        let error = RepositoryError::NotFound { entity: "supplier", key: "7".to_string() };
        let application: ApplicationError = error.into();

        assert_eq!(application, ApplicationError::Persistence("supplier `7` was not found".into()));
    }

    #[test]
    fn paging_is_clamped() {
        let filter = PriceFilter { page_number: 0, page_size: 10_000, ..PriceFilter::default() };
        assert_eq!(filter.normalized_paging(), (1, MAX_PAGE_SIZE));
    }

    #[test]
    fn page_reports_remaining_pages() {
        let page = Page { items: vec![1, 2], total_count: 5, page_number: 2, page_size: 2 };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next_page());

        let last = Page { items: vec![5], total_count: 5, page_number: 3, page_size: 2 };
        assert!(!last.has_next_page());
    }
}
