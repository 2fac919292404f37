//! Resolution entry point: fetches candidates, gathers rates, runs the engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info};

use crate::domain::currency::CurrencyCode;
use crate::domain::offer::Offer;
use crate::domain::product::ProductSku;
use crate::errors::ApplicationError;
use crate::pricing::eligibility::filter_eligible;
use crate::pricing::{
    BestOfferEngine, DeterministicBestOfferEngine, ResolutionOutcome, ResolutionRequest,
};
use crate::rates::{RateSource, ResolvedRates};

/// Source of raw candidate offers for a product.
///
/// Implementations must scope by sku. Date, quantity and supplier-active
/// filtering are optional hints; the engine checks all three again.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn fetch_candidates(
        &self,
        sku: &ProductSku,
        as_of: NaiveDate,
        min_quantity_hint: u32,
    ) -> Result<Vec<Offer>, ApplicationError>;
}

pub struct BestOfferService<R, S, E = DeterministicBestOfferEngine> {
    offers: R,
    rates: S,
    engine: E,
}

impl<R, S> BestOfferService<R, S, DeterministicBestOfferEngine> {
    pub fn new(offers: R, rates: S) -> Self {
        Self::with_engine(offers, rates, DeterministicBestOfferEngine)
    }
}

impl<R, S, E> BestOfferService<R, S, E> {
    pub fn with_engine(offers: R, rates: S, engine: E) -> Self {
        Self { offers, rates, engine }
    }
}

impl<R, S, E> BestOfferService<R, S, E>
where
    R: OfferRepository,
    S: RateSource,
    E: BestOfferEngine,
{
    pub async fn resolve(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionOutcome, ApplicationError> {
        let candidates =
            self.offers.fetch_candidates(&request.sku, request.date, request.quantity).await?;
        let eligible = filter_eligible(&candidates, request);
        let rates = self.collect_rates(&eligible, &request.currency).await?;

        let outcome = self.engine.resolve(request, &candidates, &rates)?;

        match &outcome {
            ResolutionOutcome::Resolved(result) => info!(
                event_name = "pricing.best_offer.resolved",
                sku = %request.sku,
                quantity = request.quantity,
                currency = %request.currency,
                supplier_id = result.supplier.id.0,
                unit_price = %result.unit_price,
                decided_by = result.decided_by.as_str(),
                considered = result.considered,
                "best offer resolved"
            ),
            ResolutionOutcome::NoEligibleOffer { eligible, dropped_for_rate } => info!(
                event_name = "pricing.best_offer.none_eligible",
                sku = %request.sku,
                quantity = request.quantity,
                currency = %request.currency,
                fetched = candidates.len(),
                eligible = *eligible,
                dropped_for_rate = *dropped_for_rate,
                "no eligible offer"
            ),
        }

        Ok(outcome)
    }

    /// Looks up each distinct source currency once, concurrently. `join_all`
    /// yields results in request order, so the map is the same whichever
    /// lookup finishes first.
    async fn collect_rates(
        &self,
        eligible: &[&Offer],
        target: &CurrencyCode,
    ) -> Result<ResolvedRates, ApplicationError> {
        let mut sources: Vec<&CurrencyCode> = Vec::new();
        for offer in eligible {
            if offer.currency != *target && !sources.contains(&&offer.currency) {
                sources.push(&offer.currency);
            }
        }

        let lookups = sources.iter().map(|source| self.rates.get_rate(source, target));
        let answers = join_all(lookups).await;

        let mut resolved = ResolvedRates::default();
        for (source, answer) in sources.into_iter().zip(answers) {
            match answer.map_err(|error| ApplicationError::Integration(error.to_string()))? {
                Some(rate) => resolved.insert(source.clone(), target.clone(), rate),
                None => debug!(
                    event_name = "pricing.rate.unavailable",
                    from = %source,
                    to = %target,
                    "no conversion rate; offers in this currency are skipped"
                ),
            }
        }

        Ok(resolved)
    }
}
