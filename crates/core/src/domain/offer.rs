use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::currency::CurrencyCode;
use crate::domain::product::ProductSku;
use crate::domain::supplier::Supplier;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

/// One supplier's price for one product over an inclusive validity window.
///
/// The supplier attributes are a snapshot taken when the offer was loaded, so
/// the resolution engine never has to look them up separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OfferRecord")]
pub struct Offer {
    pub id: OfferId,
    pub supplier: Supplier,
    pub sku: ProductSku,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub currency: CurrencyCode,
    pub unit_price: Decimal,
    pub min_quantity: u32,
}

/// Wire shape of an [`Offer`]; deserializing goes through [`Offer::new`].
#[derive(Clone, Debug, Deserialize)]
pub struct OfferRecord {
    pub id: OfferId,
    pub supplier: Supplier,
    pub sku: ProductSku,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub currency: CurrencyCode,
    pub unit_price: Decimal,
    pub min_quantity: u32,
}

impl TryFrom<OfferRecord> for Offer {
    type Error = DomainError;

    fn try_from(record: OfferRecord) -> Result<Self, Self::Error> {
        let terms = OfferTerms {
            sku: record.sku,
            valid_from: record.valid_from,
            valid_to: record.valid_to,
            currency: record.currency,
            unit_price: record.unit_price,
            min_quantity: record.min_quantity,
        };
        Self::new(record.id, record.supplier, terms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfferTerms {
    pub sku: ProductSku,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub currency: CurrencyCode,
    pub unit_price: Decimal,
    pub min_quantity: u32,
}

impl Offer {
    pub fn new(id: OfferId, supplier: Supplier, terms: OfferTerms) -> Result<Self, DomainError> {
        if terms.valid_from > terms.valid_to {
            return Err(DomainError::InvalidValidityWindow {
                from: terms.valid_from,
                to: terms.valid_to,
            });
        }
        if terms.unit_price < Decimal::ZERO {
            return Err(DomainError::NegativeUnitPrice);
        }

        Ok(Self {
            id,
            supplier,
            sku: terms.sku,
            valid_from: terms.valid_from,
            valid_to: terms.valid_to,
            currency: terms.currency,
            unit_price: terms.unit_price,
            min_quantity: terms.min_quantity,
        })
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{Offer, OfferId, OfferTerms};
    use crate::domain::currency::CurrencyCode;
    use crate::domain::product::ProductSku;
    use crate::domain::supplier::{Supplier, SupplierId};
    use crate::errors::DomainError;

    fn supplier() -> Supplier {
        Supplier {
            id: SupplierId(1),
            name: "Acme Metals".to_string(),
            country: "DE".to_string(),
            active: true,
            preferred: false,
            lead_time_days: 7,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
    }

    fn terms(from: NaiveDate, to: NaiveDate, unit_price: Decimal) -> OfferTerms {
        OfferTerms {
            sku: ProductSku::from("BOLT-M8"),
            valid_from: from,
            valid_to: to,
            currency: CurrencyCode::parse("EUR").expect("currency"),
            unit_price,
            min_quantity: 10,
        }
    }

    #[test]
    fn rejects_inverted_validity_window() {
        let error = Offer::new(
            OfferId(Uuid::new_v4()),
            supplier(),
            terms(date(10), date(9), Decimal::ONE),
        )
        .expect_err("window should be rejected");

        assert!(matches!(error, DomainError::InvalidValidityWindow { .. }));
    }

    #[test]
    fn rejects_negative_price_but_allows_zero() {
        let error = Offer::new(
            OfferId(Uuid::new_v4()),
            supplier(),
            terms(date(1), date(2), Decimal::NEGATIVE_ONE),
        )
        .expect_err("negative price should be rejected");
        assert_eq!(error, DomainError::NegativeUnitPrice);

        Offer::new(OfferId(Uuid::new_v4()), supplier(), terms(date(1), date(2), Decimal::ZERO))
            .expect("zero price is allowed");
    }

    #[test]
    fn validity_bounds_are_inclusive() {
        let offer = Offer::new(
            OfferId(Uuid::new_v4()),
            supplier(),
            terms(date(10), date(20), Decimal::ONE),
        )
        .expect("offer");

        assert!(offer.is_valid_on(date(10)));
        assert!(offer.is_valid_on(date(20)));
        assert!(!offer.is_valid_on(date(9)));
        assert!(!offer.is_valid_on(date(21)));
    }

    #[test]
    fn deserializing_runs_the_same_checks_as_new() {
        let offer = Offer::new(
            OfferId(Uuid::new_v4()),
            supplier(),
            terms(date(10), date(20), Decimal::ONE),
        )
        .expect("offer");
        let mut json = serde_json::to_value(&offer).expect("serialize");

        let round_tripped: Offer = serde_json::from_value(json.clone()).expect("valid offer");
        assert_eq!(round_tripped, offer);

        json["valid_from"] = serde_json::json!("2025-03-21");
        let error = serde_json::from_value::<Offer>(json.clone()).expect_err("inverted window");
        assert!(error.to_string().contains("validity window"));

        json["valid_from"] = serde_json::json!("2025-03-10");
        json["unit_price"] = serde_json::json!("-1");
        let error = serde_json::from_value::<Offer>(json).expect_err("negative price");
        assert!(error.to_string().contains("must not be negative"));
    }
}
