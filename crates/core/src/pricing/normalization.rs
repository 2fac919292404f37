use rust_decimal::Decimal;

use crate::domain::currency::CurrencyCode;
use crate::domain::offer::Offer;
use crate::rates::RateLookup;

/// An eligible offer with its unit price expressed in the requested currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertedCandidate<'a> {
    pub offer: &'a Offer,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized<'a> {
    pub candidates: Vec<ConvertedCandidate<'a>>,
    pub dropped_for_rate: usize,
    pub dropped_for_overflow: usize,
}

/// Converts every eligible offer into `target`, dropping the ones without a rate.
///
/// Same-currency offers use a multiplier of exactly one and never reach
/// `rates`. The converted price is `unit_price * rate` with no rounding; an
/// offer whose converted price does not fit in a `Decimal` is dropped too.
pub fn normalize<'a>(
    eligible: &[&'a Offer],
    target: &CurrencyCode,
    rates: &dyn RateLookup,
) -> Normalized<'a> {
    let mut candidates = Vec::with_capacity(eligible.len());
    let mut dropped_for_rate = 0;
    let mut dropped_for_overflow = 0;

    for offer in eligible.iter().copied() {
        let rate = if offer.currency == *target {
            Some(Decimal::ONE)
        } else {
            rates.rate(&offer.currency, target)
        };
        let Some(rate) = rate else {
            dropped_for_rate += 1;
            continue;
        };

        match offer.unit_price.checked_mul(rate) {
            Some(unit_price) => candidates.push(ConvertedCandidate { offer, unit_price }),
            None => dropped_for_overflow += 1,
        }
    }

    Normalized { candidates, dropped_for_rate, dropped_for_overflow }
}
