pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod rates;
pub mod service;

pub use domain::currency::CurrencyCode;
pub use domain::offer::{Offer, OfferId, OfferTerms};
pub use domain::product::{Product, ProductId, ProductSku};
pub use domain::supplier::{Supplier, SupplierId, SupplierRef};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    BestOfferEngine, DeterministicBestOfferEngine, ResolutionOutcome, ResolutionRequest,
    ResolutionResult, TieBreakLevel,
};
pub use rates::{RateLookup, RateSource, RateSourceError, ResolvedRates, StaticRateTable};
pub use service::{BestOfferService, OfferRepository};
