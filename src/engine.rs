//! Reconciliation run orchestration.
//!
//! A run loads both extracts, compares them, and renders the result. The two
//! loads are independent and run on separate threads; comparison starts only
//! after both have succeeded. Every run owns its maps and discrepancy list,
//! so one [`Reconciler`] can serve concurrent callers.

use crate::compare::{compare, Discrepancy};
use crate::error::Result;
use crate::loader::{load_ecb, load_tar, Loaded, ValuePolicy, ValueWarning};
use crate::record::{EcbRecord, TarRecord};
use crate::report::{attach_ecb_context, format, summary_count, DisplayRecord, Summary};
use log::info;
use std::panic;
use std::path::Path;
use std::thread;

/// Options for a reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Handling of malformed currency cells.
    pub value_policy: ValuePolicy,
}

/// The outcome of one run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Discrepancies in comparison order.
    pub discrepancies: Vec<Discrepancy>,
    /// Display form of `discrepancies`, with ECB context attached.
    pub records: Vec<DisplayRecord>,
    pub summary: Summary,
    /// Currency cells that were coerced to zero, TAR first.
    pub warnings: Vec<ValueWarning>,
}

/// Runs reconciliations with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Reconciler { options }
    }

    /// Loads both files and reconciles them.
    ///
    /// Any load failure aborts the run; when both fail the TAR error is
    /// returned.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, tar_path: P, ecb_path: Q) -> Result<Reconciliation> {
        let (tar_path, ecb_path) = (tar_path.as_ref(), ecb_path.as_ref());
        let policy = self.options.value_policy;

        let (tar, ecb) = thread::scope(|scope| {
            let tar = scope.spawn(move || load_tar(tar_path, policy));
            let ecb = load_ecb(ecb_path, policy);
            let tar = tar.join().unwrap_or_else(|payload| panic::resume_unwind(payload));
            (tar, ecb)
        });

        Ok(self.reconcile(tar?, ecb?))
    }

    /// Reconciles two already-loaded sources, consuming them.
    pub fn reconcile(&self, tar: Loaded<TarRecord>, ecb: Loaded<EcbRecord>) -> Reconciliation {
        let discrepancies = compare(&tar.records, &ecb.records);
        let summary = Summary::new(&discrepancies, summary_count(&tar.records, &ecb.records));

        let mut records = format(&discrepancies);
        attach_ecb_context(&mut records, &ecb.records);

        let mut warnings = tar.warnings;
        warnings.extend(ecb.warnings);

        info!(
            "Reconciled {} distinct records: {} discrepancies, {} coerced values",
            summary.total_records,
            summary.total_discrepancies(),
            warnings.len()
        );

        Reconciliation {
            discrepancies,
            records,
            summary,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::DiscrepancyKind;
    use crate::loader::{read_ecb, read_tar};
    use std::io::Cursor;

    const TAR: &str = "SPA,Service Code,Charge,Stop Date,New Charge\n\
                       S1,C1,10.00,010125,\n\
                       S2,C2,5.00,,\n\
                       S4,C4,oops,,\n";

    const ECB: &str = "SPA,Service Code,Charge,Stop Date,New Charge,Record Desc,System,Prin,Agent\n\
                       S1,C1,$12.00,010125,0,Basic,VP001,1000,200\n\
                       S3,C3,1.00,,,Extra,VP068,1000,300\n\
                       S4,C4,0,,,Other,VP227,1000,400\n";

    fn loaded() -> (Loaded<TarRecord>, Loaded<EcbRecord>) {
        (
            read_tar(Cursor::new(TAR), ValuePolicy::Coerce).unwrap(),
            read_ecb(Cursor::new(ECB), ValuePolicy::Coerce).unwrap(),
        )
    }

    #[test]
    fn test_reconcile_collects_everything() {
        let (tar, ecb) = loaded();
        let result = Reconciler::default().reconcile(tar, ecb);

        let kinds: Vec<_> = result.discrepancies.iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DiscrepancyKind::ChargeMismatch,
                DiscrepancyKind::MissingFromEcb,
                DiscrepancyKind::MissingFromTar,
            ]
        );
        assert_eq!(result.summary.total_records, 4);
        assert_eq!(result.records[0].system.as_deref(), Some("VP001"));
        assert_eq!(result.records[1].system, None);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].value, "oops");
    }

    #[test]
    fn test_reconcile_twice_is_identical() {
        let (tar, ecb) = loaded();
        let first = compare(&tar.records, &ecb.records);
        let second = compare(&tar.records, &ecb.records);
        assert_eq!(first, second);
    }
}
