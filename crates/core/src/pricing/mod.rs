//! Best-offer resolution.
//!
//! Given the candidate offers for a product, picks the single cheapest eligible
//! supplier offer in the requested currency and explains which tie-break level
//! decided it. Everything in here is synchronous and free of I/O; rate lookups
//! and offer fetching happen in [`crate::service`] before the engine runs.

pub mod eligibility;
pub mod engine;
pub mod normalization;
pub mod ranking;
pub mod reasoning;

#[cfg(test)]
pub(crate) mod testing;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::CurrencyCode;
use crate::domain::offer::OfferId;
use crate::domain::product::ProductSku;
use crate::domain::supplier::SupplierRef;
use crate::errors::{ApplicationError, DomainError};

pub use self::engine::{BestOfferEngine, DeterministicBestOfferEngine};
pub use self::ranking::TieBreakLevel;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub sku: ProductSku,
    pub quantity: u32,
    pub currency: CurrencyCode,
    pub date: NaiveDate,
}

impl ResolutionRequest {
    /// Validates raw caller input. The engine assumes every request it sees
    /// went through here.
    pub fn new(
        sku: &str,
        quantity: i64,
        currency: &str,
        date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let sku = ProductSku::parse(sku)?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(DomainError::NonPositiveQuantity)?;
        let currency = CurrencyCode::parse(currency)?;

        Ok(Self { sku, quantity, currency, date })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub supplier: SupplierRef,
    pub offer_id: OfferId,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub currency: CurrencyCode,
    pub reasoning: String,
    pub decided_by: TieBreakLevel,
    pub considered: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved(ResolutionResult),
    /// Nothing survived eligibility filtering and rate conversion.
    NoEligibleOffer { eligible: usize, dropped_for_rate: usize },
}

impl ResolutionOutcome {
    pub fn resolved(&self) -> Option<&ResolutionResult> {
        match self {
            Self::Resolved(result) => Some(result),
            Self::NoEligibleOffer { .. } => None,
        }
    }

    pub fn into_result(self, sku: &ProductSku) -> Result<ResolutionResult, ApplicationError> {
        match self {
            Self::Resolved(result) => Ok(result),
            Self::NoEligibleOffer { .. } => Err(ApplicationError::NoEligibleOffer(sku.clone())),
        }
    }
}
