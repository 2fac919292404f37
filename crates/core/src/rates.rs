use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::currency::CurrencyCode;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RateSourceError {
    #[error("rate source unavailable: {0}")]
    Unavailable(String),
}

/// External provider of conversion multipliers.
///
/// `Ok(None)` means the source answered but has no rate for the pair; the
/// offer priced in that currency is skipped rather than failing the request.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<Decimal>, RateSourceError>;
}

/// Synchronous view over rates that were already fetched.
pub trait RateLookup {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedRates {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

impl ResolvedRates {
    pub fn insert(&mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) {
        self.rates.insert((from, to), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateLookup for ResolvedRates {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(&(from.clone(), to.clone())).copied()
    }
}

/// Fixed in-memory rate table.
/// `(from, to, mantissa, scale)`
const BUILTIN_RATES: [(&str, &str, i64, u32); 4] =
    [("USD", "EUR", 92, 2), ("EUR", "USD", 109, 2), ("USD", "GBP", 80, 2), ("GBP", "USD", 125, 2)];

#[derive(Clone, Debug, Default)]
pub struct StaticRateTable {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

impl StaticRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table: USD/EUR and USD/GBP in both directions.
    pub fn with_defaults() -> Self {
        BUILTIN_RATES
            .into_iter()
            .filter_map(|(from, to, mantissa, scale)| {
                let from = CurrencyCode::parse(from).ok()?;
                let to = CurrencyCode::parse(to).ok()?;
                Some((from, to, Decimal::new(mantissa, scale)))
            })
            .fold(Self::new(), |table, (from, to, rate)| table.with_rate(from, to, rate))
    }

    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateLookup for StaticRateTable {
    fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.rates.get(&(from.clone(), to.clone())).copied()
    }
}

#[async_trait]
impl RateSource for StaticRateTable {
    async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<Decimal>, RateSourceError> {
        Ok(self.rate(from, to))
    }
}
