use crate::domain::offer::Offer;
use crate::pricing::ResolutionRequest;

/// Keeps the offers a request may be served from, in their original order.
pub fn filter_eligible<'a>(offers: &'a [Offer], request: &ResolutionRequest) -> Vec<&'a Offer> {
    offers.iter().filter(|offer| is_eligible(offer, request)).collect()
}

pub fn is_eligible(offer: &Offer, request: &ResolutionRequest) -> bool {
    offer.sku == request.sku
        && offer.supplier.active
        && offer.is_valid_on(request.date)
        && request.quantity >= offer.min_quantity
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{filter_eligible, is_eligible};
    use crate::domain::product::ProductSku;
    use crate::pricing::testing::{day, offer, request, supplier};
    use crate::pricing::ResolutionRequest;

    #[test]
    fn drops_inactive_suppliers_and_other_products() {
        let mut inactive = offer(supplier(1, false, 5), "EUR", Decimal::ONE);
        inactive.supplier.active = false;
        let mut other_product = offer(supplier(2, false, 5), "EUR", Decimal::ONE);
        other_product.sku = ProductSku::from("NUT-M8");
        let kept = offer(supplier(3, false, 5), "EUR", Decimal::ONE);

        let offers = vec![inactive, other_product, kept.clone()];
        let eligible = filter_eligible(&offers, &request(10, "EUR"));

        assert_eq!(eligible, vec![&kept]);
    }

    #[test]
    fn validity_window_is_inclusive_on_both_ends() {
        let mut candidate = offer(supplier(1, false, 5), "EUR", Decimal::ONE);
        candidate.valid_from = day(10);
        candidate.valid_to = day(20);

        let on = |date| {
            let request =
                ResolutionRequest::new("BOLT-M8", 10, "EUR", day(date)).expect("valid request");
            is_eligible(&candidate, &request)
        };

        assert!(on(10));
        assert!(on(20));
        assert!(!on(9));
        assert!(!on(21));
    }

    #[test]
    fn requested_quantity_must_reach_minimum_order() {
        let mut candidate = offer(supplier(1, false, 5), "EUR", Decimal::ONE);
        candidate.min_quantity = 100;

        assert!(is_eligible(&candidate, &request(100, "EUR")));
        assert!(is_eligible(&candidate, &request(101, "EUR")));
        assert!(!is_eligible(&candidate, &request(99, "EUR")));
    }

    #[test]
    fn preserves_input_order() {
        let offers: Vec<_> =
            (1..=4).map(|id| offer(supplier(5 - id, false, 5), "EUR", Decimal::ONE)).collect();

        let eligible = filter_eligible(&offers, &request(10, "EUR"));
        let ids: Vec<i64> = eligible.iter().map(|offer| offer.supplier.id.0).collect();

        assert_eq!(ids, vec![4, 3, 2, 1]);
    }
}
