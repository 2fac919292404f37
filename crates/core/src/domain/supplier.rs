use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SupplierId(pub i64);

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub country: String,
    pub active: bool,
    pub preferred: bool,
    pub lead_time_days: u32,
}

/// Identity of a supplier as reported back to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: SupplierId,
    pub name: String,
}

impl From<&Supplier> for SupplierRef {
    fn from(supplier: &Supplier) -> Self {
        Self { id: supplier.id, name: supplier.name.clone() }
    }
}
