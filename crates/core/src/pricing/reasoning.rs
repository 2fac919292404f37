use std::cmp::Ordering;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::supplier::SupplierId;
use crate::pricing::normalization::ConvertedCandidate;
use crate::pricing::ranking::TieBreakLevel;

/// Finds the first level at which the winner stops sharing its key with any
/// other candidate.
///
/// Walks the levels in precedence order and narrows the tied set with the same
/// per-level comparison the ranking uses, so the level reported here is always
/// the one that separated the winner in [`super::ranking::compare_candidates`].
pub fn decisive_level(
    winner: &ConvertedCandidate<'_>,
    candidates: &[ConvertedCandidate<'_>],
) -> TieBreakLevel {
    let mut tied: Vec<&ConvertedCandidate<'_>> = candidates.iter().collect();

    for level in TieBreakLevel::PRECEDENCE {
        tied.retain(|candidate| level.compare(candidate, winner) == Ordering::Equal);
        if tied.len() <= 1 {
            return level;
        }
    }

    TieBreakLevel::LowestSupplierId
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reasoning {
    pub level: TieBreakLevel,
    pub considered: usize,
    pub unit_price: Decimal,
    pub lead_time_days: u32,
    pub supplier_id: SupplierId,
}

impl Reasoning {
    pub fn explain(winner: &ConvertedCandidate<'_>, candidates: &[ConvertedCandidate<'_>]) -> Self {
        Self {
            level: decisive_level(winner, candidates),
            considered: candidates.len(),
            unit_price: winner.unit_price,
            lead_time_days: winner.offer.supplier.lead_time_days,
            supplier_id: winner.offer.supplier.id,
        }
    }
}

impl fmt::Display for Reasoning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let price = format_amount(self.unit_price);
        write!(f, "selected from {} valid offer(s); ", self.considered)?;

        match self.level {
            TieBreakLevel::LowestPrice => write!(f, "winning factor: lowest unit price of {price}"),
            TieBreakLevel::PreferredSupplier => {
                write!(f, "price tie of {price} broken by preferred-supplier status")
            }
            TieBreakLevel::ShortestLeadTime => write!(
                f,
                "price tie of {price} broken by shortest lead time of {} days",
                self.lead_time_days
            ),
            TieBreakLevel::LowestSupplierId => write!(
                f,
                "price tie of {price} broken by lowest supplier identifier ({})",
                self.supplier_id
            ),
        }
    }
}

/// Two decimal places, midpoints rounded away from zero. Display only.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{decisive_level, format_amount, Reasoning};
    use crate::domain::offer::Offer;
    use crate::pricing::normalization::ConvertedCandidate;
    use crate::pricing::ranking::{select_winner, TieBreakLevel};
    use crate::pricing::testing::{offer, supplier};

    fn converted(offers: &[Offer]) -> Vec<ConvertedCandidate<'_>> {
        offers
            .iter()
            .map(|offer| ConvertedCandidate { offer, unit_price: offer.unit_price })
            .collect()
    }

    fn explain(offers: &[Offer]) -> Reasoning {
        let candidates = converted(offers);
        let winner = select_winner(&candidates).expect("winner");
        Reasoning::explain(winner, &candidates)
    }

    #[test]
    fn unique_lowest_price_is_named() {
        let offers = [
            offer(supplier(1, true, 5), "EUR", Decimal::new(950, 2)),
            offer(supplier(2, false, 15), "EUR", Decimal::new(920, 2)),
        ];

        let reasoning = explain(&offers);

        assert_eq!(reasoning.level, TieBreakLevel::LowestPrice);
        assert_eq!(
            reasoning.to_string(),
            "selected from 2 valid offer(s); winning factor: lowest unit price of 9.20"
        );
    }

    #[test]
    fn preference_breaks_price_tie() {
        let offers = [
            offer(supplier(1, true, 20), "EUR", Decimal::TEN),
            offer(supplier(2, false, 3), "EUR", Decimal::TEN),
        ];

        let reasoning = explain(&offers);

        assert_eq!(reasoning.level, TieBreakLevel::PreferredSupplier);
        assert_eq!(reasoning.supplier_id.0, 1);
        assert!(reasoning
            .to_string()
            .ends_with("price tie of 10.00 broken by preferred-supplier status"));
    }

    #[test]
    fn lead_time_breaks_tie_between_preferred_suppliers() {
        let offers = [
            offer(supplier(1, true, 9), "EUR", Decimal::TEN),
            offer(supplier(2, true, 4), "EUR", Decimal::TEN),
            offer(supplier(3, false, 1), "EUR", Decimal::TEN),
        ];

        let reasoning = explain(&offers);

        assert_eq!(reasoning.level, TieBreakLevel::ShortestLeadTime);
        assert_eq!(
            reasoning.to_string(),
            "selected from 3 valid offer(s); price tie of 10.00 broken by shortest lead time of 4 days"
        );
    }

    #[test]
    fn non_preferred_price_tie_falls_through_to_lead_time() {
        let offers = [
            offer(supplier(1, false, 9), "EUR", Decimal::TEN),
            offer(supplier(2, false, 4), "EUR", Decimal::TEN),
        ];

        assert_eq!(explain(&offers).level, TieBreakLevel::ShortestLeadTime);
    }

    #[test]
    fn full_fallthrough_names_supplier_id() {
        let offers = [
            offer(supplier(7, false, 5), "EUR", Decimal::TEN),
            offer(supplier(3, false, 5), "EUR", Decimal::TEN),
        ];

        let reasoning = explain(&offers);

        assert_eq!(reasoning.level, TieBreakLevel::LowestSupplierId);
        assert_eq!(
            reasoning.to_string(),
            "selected from 2 valid offer(s); price tie of 10.00 broken by lowest supplier identifier (3)"
        );
    }

    #[test]
    fn single_candidate_wins_on_price() {
        let offers = [offer(supplier(1, false, 5), "EUR", Decimal::new(12_345, 3))];

        let reasoning = explain(&offers);

        assert_eq!(reasoning.level, TieBreakLevel::LowestPrice);
        assert_eq!(
            reasoning.to_string(),
            "selected from 1 valid offer(s); winning factor: lowest unit price of 12.35"
        );
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        assert_eq!(format_amount(Decimal::new(92, 1)), "9.20");
        assert_eq!(format_amount(Decimal::new(12_345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(12_344_9, 4)), "12.34");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    /// Every combination of a small key grid: the reported level must be the
    /// first key on which the winner differs from all remaining tied rivals,
    /// and the winner must be price-minimal.
    #[test]
    fn reasoning_agrees_with_ranking_over_generated_grid() {
        let prices = [Decimal::new(900, 2), Decimal::new(9, 0), Decimal::new(950, 2)];
        let flags = [false, true];
        let lead_times = [3_u32, 7];

        let mut keys = Vec::new();
        for price in prices {
            for preferred in flags {
                for lead_time in lead_times {
                    keys.push((price, preferred, lead_time));
                }
            }
        }

        for first in &keys {
            for second in &keys {
                for third in &keys {
                    let offers: Vec<Offer> = [first, second, third]
                        .iter()
                        .enumerate()
                        .map(|(index, (price, preferred, lead_time))| {
                            let id = 10 - index as i64;
                            offer(supplier(id, *preferred, *lead_time), "EUR", *price)
                        })
                        .collect();
                    let candidates = converted(&offers);
                    let winner = select_winner(&candidates).expect("winner");
                    let level = decisive_level(winner, &candidates);

                    assert!(candidates.iter().all(|c| winner.unit_price <= c.unit_price));
                    assert_eq!(level, expected_level(winner, &candidates));
                }
            }
        }
    }

    fn expected_level(
        winner: &ConvertedCandidate<'_>,
        candidates: &[ConvertedCandidate<'_>],
    ) -> TieBreakLevel {
        let rivals: Vec<_> = candidates
            .iter()
            .filter(|c| c.offer.supplier.id != winner.offer.supplier.id)
            .collect();
        let price_tied: Vec<_> =
            rivals.iter().filter(|c| c.unit_price == winner.unit_price).collect();
        if price_tied.is_empty() {
            return TieBreakLevel::LowestPrice;
        }
        let preference_tied: Vec<_> = price_tied
            .iter()
            .filter(|c| c.offer.supplier.preferred == winner.offer.supplier.preferred)
            .collect();
        if preference_tied.is_empty() && winner.offer.supplier.preferred {
            return TieBreakLevel::PreferredSupplier;
        }
        let lead_tied = preference_tied
            .iter()
            .filter(|c| c.offer.supplier.lead_time_days == winner.offer.supplier.lead_time_days)
            .count();
        if lead_tied == 0 {
            return TieBreakLevel::ShortestLeadTime;
        }
        TieBreakLevel::LowestSupplierId
    }
}
