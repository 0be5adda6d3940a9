//! Key matching and discrepancy detection.
//!
//! Comparison is a pure function of the two loaded maps: every call builds
//! and returns its own discrepancy list, so one set of maps can be compared
//! any number of times, from any number of threads.

use crate::currency::Currency;
use crate::record::{BillingFields, RecordKey};
use indexmap::IndexMap;
use log::debug;
use serde::{Serialize, Serializer};
use std::fmt;

/// The kind of a [`Discrepancy`], in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscrepancyKind {
    MissingFromEcb,
    MissingFromTar,
    ChargeMismatch,
    StopDateMismatch,
    NewChargeMismatch,
}

impl DiscrepancyKind {
    /// All kinds, in reporting order.
    pub const ALL: [DiscrepancyKind; 5] = [
        DiscrepancyKind::MissingFromEcb,
        DiscrepancyKind::MissingFromTar,
        DiscrepancyKind::ChargeMismatch,
        DiscrepancyKind::StopDateMismatch,
        DiscrepancyKind::NewChargeMismatch,
    ];

    /// Stable snake_case code used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingFromEcb => "missing_from_ecb",
            DiscrepancyKind::MissingFromTar => "missing_from_tar",
            DiscrepancyKind::ChargeMismatch => "charge_mismatch",
            DiscrepancyKind::StopDateMismatch => "stop_date_mismatch",
            DiscrepancyKind::NewChargeMismatch => "new_charge_mismatch",
        }
    }

    /// Short label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingFromEcb => "Missing from ECB",
            DiscrepancyKind::MissingFromTar => "Missing from TAR",
            DiscrepancyKind::ChargeMismatch => "Charge Mismatch",
            DiscrepancyKind::StopDateMismatch => "Stop Date Mismatch",
            DiscrepancyKind::NewChargeMismatch => "New Charge Mismatch",
        }
    }

    /// Human-readable heading.
    pub fn title(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingFromEcb => "Transaction missing from ECB file",
            DiscrepancyKind::MissingFromTar => "Transaction missing from TAR file",
            DiscrepancyKind::ChargeMismatch => "Charge mismatch found",
            DiscrepancyKind::StopDateMismatch => "Stop Date mismatch found",
            DiscrepancyKind::NewChargeMismatch => "New Charge mismatch found",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiscrepancyKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single inconsistency between the two sources.
///
/// Mismatch variants carry the TAR-side value first, then the ECB-side value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    MissingFromEcb {
        key: RecordKey,
    },
    MissingFromTar {
        key: RecordKey,
    },
    ChargeMismatch {
        key: RecordKey,
        tar: Currency,
        ecb: Currency,
    },
    StopDateMismatch {
        key: RecordKey,
        tar: String,
        ecb: String,
    },
    NewChargeMismatch {
        key: RecordKey,
        tar: Currency,
        ecb: Currency,
    },
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Discrepancy::MissingFromEcb { .. } => DiscrepancyKind::MissingFromEcb,
            Discrepancy::MissingFromTar { .. } => DiscrepancyKind::MissingFromTar,
            Discrepancy::ChargeMismatch { .. } => DiscrepancyKind::ChargeMismatch,
            Discrepancy::StopDateMismatch { .. } => DiscrepancyKind::StopDateMismatch,
            Discrepancy::NewChargeMismatch { .. } => DiscrepancyKind::NewChargeMismatch,
        }
    }

    pub fn key(&self) -> &RecordKey {
        match self {
            Discrepancy::MissingFromEcb { key }
            | Discrepancy::MissingFromTar { key }
            | Discrepancy::ChargeMismatch { key, .. }
            | Discrepancy::StopDateMismatch { key, .. }
            | Discrepancy::NewChargeMismatch { key, .. } => key,
        }
    }
}

/// Compares a TAR map against an ECB map.
///
/// Output order is fixed: for each TAR key in map order, either
/// `MissingFromEcb` or the field mismatches in the order Charge, Stop Date,
/// New Charge; then `MissingFromTar` for each ECB-only key in map order.
///
/// Currency fields use exact decimal equality. New Charge is only flagged
/// when at least one side is non-zero, so an empty cell and `0` never differ.
pub fn compare<T, E>(
    tar: &IndexMap<RecordKey, T>,
    ecb: &IndexMap<RecordKey, E>,
) -> Vec<Discrepancy>
where
    T: BillingFields,
    E: BillingFields,
{
    let mut discrepancies = Vec::new();

    for (key, tar_record) in tar {
        let ecb_record = match ecb.get(key) {
            Some(record) => record,
            None => {
                discrepancies.push(Discrepancy::MissingFromEcb { key: key.clone() });
                continue;
            }
        };

        if tar_record.charge() != ecb_record.charge() {
            discrepancies.push(Discrepancy::ChargeMismatch {
                key: key.clone(),
                tar: tar_record.charge(),
                ecb: ecb_record.charge(),
            });
        }

        if tar_record.stop_date() != ecb_record.stop_date() {
            discrepancies.push(Discrepancy::StopDateMismatch {
                key: key.clone(),
                tar: tar_record.stop_date().to_string(),
                ecb: ecb_record.stop_date().to_string(),
            });
        }

        let (tar_new, ecb_new) = (tar_record.new_charge(), ecb_record.new_charge());
        if (!tar_new.is_zero() || !ecb_new.is_zero()) && tar_new != ecb_new {
            discrepancies.push(Discrepancy::NewChargeMismatch {
                key: key.clone(),
                tar: tar_new,
                ecb: ecb_new,
            });
        }
    }

    for key in ecb.keys() {
        if !tar.contains_key(key) {
            discrepancies.push(Discrepancy::MissingFromTar { key: key.clone() });
        }
    }

    for d in &discrepancies {
        debug!("{} {}", d.kind(), d.key());
    }

    discrepancies
}
