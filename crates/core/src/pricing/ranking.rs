use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::pricing::normalization::ConvertedCandidate;

/// The keys a winner is chosen by, in precedence order. Each level only
/// matters when every level before it compared equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakLevel {
    LowestPrice,
    PreferredSupplier,
    ShortestLeadTime,
    LowestSupplierId,
}

impl TieBreakLevel {
    pub const PRECEDENCE: [TieBreakLevel; 4] = [
        TieBreakLevel::LowestPrice,
        TieBreakLevel::PreferredSupplier,
        TieBreakLevel::ShortestLeadTime,
        TieBreakLevel::LowestSupplierId,
    ];

    /// `Less` means `left` ranks ahead of `right` on this key alone.
    pub fn compare(
        self,
        left: &ConvertedCandidate<'_>,
        right: &ConvertedCandidate<'_>,
    ) -> Ordering {
        match self {
            Self::LowestPrice => left.unit_price.cmp(&right.unit_price),
            Self::PreferredSupplier => {
                right.offer.supplier.preferred.cmp(&left.offer.supplier.preferred)
            }
            Self::ShortestLeadTime => {
                left.offer.supplier.lead_time_days.cmp(&right.offer.supplier.lead_time_days)
            }
            Self::LowestSupplierId => left.offer.supplier.id.cmp(&right.offer.supplier.id),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowestPrice => "lowest_price",
            Self::PreferredSupplier => "preferred_supplier",
            Self::ShortestLeadTime => "shortest_lead_time",
            Self::LowestSupplierId => "lowest_supplier_id",
        }
    }
}

pub fn compare_candidates(
    left: &ConvertedCandidate<'_>,
    right: &ConvertedCandidate<'_>,
) -> Ordering {
    TieBreakLevel::PRECEDENCE
        .iter()
        .fold(Ordering::Equal, |ordering, level| ordering.then_with(|| level.compare(left, right)))
}

/// First candidate under [`compare_candidates`]; on a full tie the earlier one wins.
pub fn select_winner<'c, 'a>(
    candidates: &'c [ConvertedCandidate<'a>],
) -> Option<&'c ConvertedCandidate<'a>> {
    candidates.iter().min_by(|left, right| compare_candidates(left, right))
}
