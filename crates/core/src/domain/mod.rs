pub mod currency;
pub mod offer;
pub mod product;
pub mod supplier;
