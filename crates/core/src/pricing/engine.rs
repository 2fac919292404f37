use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::offer::Offer;
use crate::domain::supplier::SupplierRef;
use crate::errors::DomainError;
use crate::pricing::eligibility::filter_eligible;
use crate::pricing::normalization::normalize;
use crate::pricing::ranking::select_winner;
use crate::pricing::reasoning::Reasoning;
use crate::pricing::{ResolutionOutcome, ResolutionRequest, ResolutionResult};
use crate::rates::RateLookup;

pub trait BestOfferEngine: Send + Sync {
    fn resolve(
        &self,
        request: &ResolutionRequest,
        candidates: &[Offer],
        rates: &dyn RateLookup,
    ) -> Result<ResolutionOutcome, DomainError>;
}

#[derive(Default)]
pub struct DeterministicBestOfferEngine;

impl BestOfferEngine for DeterministicBestOfferEngine {
    fn resolve(
        &self,
        request: &ResolutionRequest,
        candidates: &[Offer],
        rates: &dyn RateLookup,
    ) -> Result<ResolutionOutcome, DomainError> {
        resolve_best_offer(request, candidates, rates)
    }
}

/// Fails only when the winning total does not fit in a `Decimal`.
pub fn resolve_best_offer(
    request: &ResolutionRequest,
    candidates: &[Offer],
    rates: &dyn RateLookup,
) -> Result<ResolutionOutcome, DomainError> {
    let eligible = filter_eligible(candidates, request);
    let normalized = normalize(&eligible, &request.currency, rates);
    if normalized.dropped_for_overflow > 0 {
        debug!(
            event_name = "pricing.conversion.overflow",
            sku = %request.sku,
            currency = %request.currency,
            dropped = normalized.dropped_for_overflow,
            "converted unit price out of range; offers skipped"
        );
    }

    let Some(winner) = select_winner(&normalized.candidates) else {
        return Ok(ResolutionOutcome::NoEligibleOffer {
            eligible: eligible.len(),
            dropped_for_rate: normalized.dropped_for_rate,
        });
    };
    let reasoning = Reasoning::explain(winner, &normalized.candidates);
    let total_price =
        winner.unit_price.checked_mul(Decimal::from(request.quantity)).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "total price for {} x {} overflows",
                winner.unit_price, request.quantity
            ))
        })?;

    Ok(ResolutionOutcome::Resolved(ResolutionResult {
        supplier: SupplierRef::from(&winner.offer.supplier),
        offer_id: winner.offer.id,
        unit_price: winner.unit_price,
        total_price,
        currency: request.currency.clone(),
        reasoning: reasoning.to_string(),
        decided_by: reasoning.level,
        considered: reasoning.considered,
    }))
}
