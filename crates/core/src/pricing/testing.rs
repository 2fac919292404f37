use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::currency::CurrencyCode;
use crate::domain::offer::{Offer, OfferId, OfferTerms};
use crate::domain::product::ProductSku;
use crate::domain::supplier::{Supplier, SupplierId};
use crate::pricing::ResolutionRequest;

pub(crate) const SKU: &str = "BOLT-M8";

pub(crate) fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

pub(crate) fn currency(code: &str) -> CurrencyCode {
    CurrencyCode::parse(code).expect("valid currency")
}

pub(crate) fn supplier(id: i64, preferred: bool, lead_time_days: u32) -> Supplier {
    Supplier {
        id: SupplierId(id),
        name: format!("Supplier {id}"),
        country: "DE".to_string(),
        active: true,
        preferred,
        lead_time_days,
    }
}

pub(crate) fn offer(supplier: Supplier, code: &str, unit_price: Decimal) -> Offer {
    Offer::new(
        OfferId(Uuid::new_v4()),
        supplier,
        OfferTerms {
            sku: ProductSku::from(SKU),
            valid_from: day(1),
            valid_to: day(30),
            currency: currency(code),
            unit_price,
            min_quantity: 1,
        },
    )
    .expect("valid offer")
}

pub(crate) fn request(quantity: i64, code: &str) -> ResolutionRequest {
    ResolutionRequest::new(SKU, quantity, code, day(15)).expect("valid request")
}
