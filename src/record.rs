//! Record models for the two billing sources.

use crate::currency::Currency;
use indexmap::IndexMap;
use std::fmt;

/// TAR records keyed by composite key, in file order.
pub type TarMap = IndexMap<RecordKey, TarRecord>;

/// ECB records keyed by composite key, in file order.
pub type EcbMap = IndexMap<RecordKey, EcbRecord>;

/// Which billing extract a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The minimal-schema extract.
    Tar,
    /// The extract that also carries descriptive fields.
    Ecb,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Tar => f.write_str("TAR"),
            Source::Ecb => f.write_str("ECB"),
        }
    }
}

/// Composite join key: SPA identifier plus service code, both trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub spa: String,
    pub service_code: String,
}

impl RecordKey {
    /// Builds a key, trimming surrounding whitespace from both parts.
    pub fn new(spa: &str, service_code: &str) -> Self {
        RecordKey {
            spa: spa.trim().to_string(),
            service_code: service_code.trim().to_string(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.spa, self.service_code)
    }
}

/// The fields compared between the two sources.
pub trait BillingFields {
    fn charge(&self) -> Currency;
    fn stop_date(&self) -> &str;
    fn new_charge(&self) -> Currency;
}

/// A normalized TAR row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarRecord {
    pub charge: Currency,
    pub stop_date: String,
    pub new_charge: Currency,
}

impl BillingFields for TarRecord {
    fn charge(&self) -> Currency {
        self.charge
    }

    fn stop_date(&self) -> &str {
        &self.stop_date
    }

    fn new_charge(&self) -> Currency {
        self.new_charge
    }
}

/// A normalized ECB row.
///
/// The descriptive fields give reporting context and are never compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcbRecord {
    pub charge: Currency,
    pub stop_date: String,
    pub new_charge: Currency,
    pub record_desc: String,
    pub system: String,
    pub prin: String,
    pub agent: String,
}

impl BillingFields for EcbRecord {
    fn charge(&self) -> Currency {
        self.charge
    }

    fn stop_date(&self) -> &str {
        &self.stop_date
    }

    fn new_charge(&self) -> Currency {
        self.new_charge
    }
}
