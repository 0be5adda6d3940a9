//! Rendering discrepancies for people and spreadsheets.

use crate::compare::{Discrepancy, DiscrepancyKind};
use crate::error::Result;
use crate::record::{EcbMap, RecordKey};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

const RULE_WIDTH: usize = 80;

/// One discrepancy prepared for display or export.
///
/// Currency values are rendered as `$1,234.56`; stop dates are shown as-is.
/// The descriptive ECB fields are filled by [`attach_ecb_context`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    #[serde(rename = "type")]
    pub kind: DiscrepancyKind,
    pub title: &'static str,
    pub spa: String,
    pub service_code: String,
    pub tar_value: Option<String>,
    pub ecb_value: Option<String>,
    pub record_desc: Option<String>,
    pub system: Option<String>,
    pub prin: Option<String>,
    pub agent: Option<String>,
}

impl DisplayRecord {
    fn new(kind: DiscrepancyKind, key: &RecordKey) -> Self {
        DisplayRecord {
            kind,
            title: kind.title(),
            spa: key.spa.clone(),
            service_code: key.service_code.clone(),
            tar_value: None,
            ecb_value: None,
            record_desc: None,
            system: None,
            prin: None,
            agent: None,
        }
    }

    fn with_values(mut self, tar: String, ecb: String) -> Self {
        self.tar_value = Some(tar);
        self.ecb_value = Some(ecb);
        self
    }
}

/// Converts discrepancies to display records, preserving order.
pub fn format(discrepancies: &[Discrepancy]) -> Vec<DisplayRecord> {
    discrepancies
        .iter()
        .map(|d| {
            let record = DisplayRecord::new(d.kind(), d.key());
            match d {
                Discrepancy::MissingFromEcb { .. } | Discrepancy::MissingFromTar { .. } => record,
                Discrepancy::ChargeMismatch { tar, ecb, .. }
                | Discrepancy::NewChargeMismatch { tar, ecb, .. } => {
                    record.with_values(tar.to_dollars(), ecb.to_dollars())
                }
                Discrepancy::StopDateMismatch { tar, ecb, .. } => {
                    record.with_values(tar.clone(), ecb.clone())
                }
            }
        })
        .collect()
}

/// Copies the ECB descriptive fields onto records whose key exists in ECB.
pub fn attach_ecb_context(records: &mut [DisplayRecord], ecb: &EcbMap) {
    for record in records.iter_mut() {
        let key = RecordKey::new(&record.spa, &record.service_code);
        if let Some(ecb_record) = ecb.get(&key) {
            record.record_desc = Some(ecb_record.record_desc.clone());
            record.system = Some(ecb_record.system.clone());
            record.prin = Some(ecb_record.prin.clone());
            record.agent = Some(ecb_record.agent.clone());
        }
    }
}

/// Number of distinct keys seen across both sources.
pub fn summary_count<T, E>(tar: &IndexMap<RecordKey, T>, ecb: &IndexMap<RecordKey, E>) -> usize {
    tar.len() + ecb.keys().filter(|key| !tar.contains_key(*key)).count()
}

/// Totals for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Distinct keys across both sources.
    pub total_records: usize,
    counts: BTreeMap<DiscrepancyKind, usize>,
}

impl Summary {
    pub fn new(discrepancies: &[Discrepancy], total_records: usize) -> Self {
        let mut counts: BTreeMap<DiscrepancyKind, usize> =
            DiscrepancyKind::ALL.iter().map(|&kind| (kind, 0)).collect();
        for d in discrepancies {
            *counts.entry(d.kind()).or_insert(0) += 1;
        }
        Summary {
            total_records,
            counts,
        }
    }

    /// Discrepancies of one kind.
    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_discrepancies(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Writes a plain-text report.
pub fn write_text<W: Write>(records: &[DisplayRecord], summary: &Summary, mut writer: W) -> Result<()> {
    let rule = "-".repeat(RULE_WIDTH);

    writeln!(writer, "Discrepancy Report")?;
    writeln!(writer, "{}", rule)?;

    for record in records {
        writeln!(writer, "{}:", record.title)?;
        writeln!(writer, "    SPA: {}", record.spa)?;
        writeln!(writer, "    Service Code: {}", record.service_code)?;
        if let (Some(tar), Some(ecb)) = (&record.tar_value, &record.ecb_value) {
            writeln!(writer, "    TAR value: {}", tar)?;
            writeln!(writer, "    ECB value: {}", ecb)?;
        }
        let context = [
            ("Record Desc", &record.record_desc),
            ("System", &record.system),
            ("Prin", &record.prin),
            ("Agent", &record.agent),
        ];
        for (label, value) in context {
            match value {
                Some(value) if !value.is_empty() => writeln!(writer, "    {}: {}", label, value)?,
                _ => {}
            }
        }
        writeln!(writer, "{}", rule)?;
    }

    writeln!(writer, "Summary")?;
    writeln!(writer, "    Total records: {}", summary.total_records)?;
    for kind in DiscrepancyKind::ALL {
        writeln!(writer, "    {}: {}", kind.label(), summary.count(kind))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the display records as CSV with a header row.
pub fn write_csv<W: Write>(records: &[DisplayRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::record::{EcbRecord, TarMap};
    use std::str::FromStr;

    fn amount(s: &str) -> Currency {
        Currency::from_str(s).unwrap()
    }

    fn key(spa: &str, code: &str) -> RecordKey {
        RecordKey::new(spa, code)
    }

    fn ecb_record(desc: &str, system: &str) -> EcbRecord {
        EcbRecord {
            charge: Currency::ZERO,
            stop_date: String::new(),
            new_charge: Currency::ZERO,
            record_desc: desc.to_string(),
            system: system.to_string(),
            prin: "1000".to_string(),
            agent: "200".to_string(),
        }
    }

    fn sample() -> Vec<Discrepancy> {
        vec![
            Discrepancy::MissingFromEcb { key: key("S2", "C2") },
            Discrepancy::ChargeMismatch {
                key: key("S1", "C1"),
                tar: amount("1200.5"),
                ecb: amount("12"),
            },
            Discrepancy::StopDateMismatch {
                key: key("S1", "C1"),
                tar: "010125".to_string(),
                ecb: "1/1/25".to_string(),
            },
            Discrepancy::MissingFromTar { key: key("S3", "C3") },
        ]
    }

    #[test]
    fn test_format_titles_and_values() {
        let records = format(&sample());

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].title, "Transaction missing from ECB file");
        assert_eq!(records[0].tar_value, None);
        assert_eq!(records[1].title, "Charge mismatch found");
        assert_eq!(records[1].tar_value.as_deref(), Some("$1,200.50"));
        assert_eq!(records[1].ecb_value.as_deref(), Some("$12.00"));
        assert_eq!(records[2].tar_value.as_deref(), Some("010125"));
        assert_eq!(records[2].ecb_value.as_deref(), Some("1/1/25"));
        assert_eq!(records[3].kind, DiscrepancyKind::MissingFromTar);
    }

    #[test]
    fn test_attach_ecb_context_only_for_ecb_keys() {
        let mut ecb = EcbMap::new();
        ecb.insert(key("S1", "C1"), ecb_record("Basic cable", "VP001"));
        ecb.insert(key("S3", "C3"), ecb_record("Premium", "VP068"));

        let mut records = format(&sample());
        attach_ecb_context(&mut records, &ecb);

        assert_eq!(records[0].record_desc, None);
        assert_eq!(records[1].system.as_deref(), Some("VP001"));
        assert_eq!(records[3].record_desc.as_deref(), Some("Premium"));
    }

    #[test]
    fn test_summary_count_distinct_keys() {
        let mut tar = TarMap::new();
        let mut ecb = EcbMap::new();
        for spa in ["A", "B", "C"] {
            tar.insert(
                key(spa, "X"),
                crate::record::TarRecord {
                    charge: Currency::ZERO,
                    stop_date: String::new(),
                    new_charge: Currency::ZERO,
                },
            );
        }
        ecb.insert(key("C", "X"), ecb_record("", ""));
        ecb.insert(key("D", "X"), ecb_record("", ""));

        assert_eq!(summary_count(&tar, &ecb), 4);
        assert_eq!(summary_count(&TarMap::new(), &EcbMap::new()), 0);
    }

    #[test]
    fn test_summary_counts_per_kind() {
        let summary = Summary::new(&sample(), 3);

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.count(DiscrepancyKind::MissingFromEcb), 1);
        assert_eq!(summary.count(DiscrepancyKind::NewChargeMismatch), 0);
        assert_eq!(summary.total_discrepancies(), 4);
    }

    #[test]
    fn test_write_text() {
        let records = format(&sample());
        let mut output = Vec::new();
        write_text(&records, &Summary::new(&sample(), 3), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Discrepancy Report\n"));
        assert!(text.contains("Charge mismatch found:\n    SPA: S1\n    Service Code: C1\n    TAR value: $1,200.50\n    ECB value: $12.00\n"));
        assert!(text.contains("    Total records: 3\n"));
        assert!(text.contains("    Missing from TAR: 1\n"));
    }

    #[test]
    fn test_write_csv() {
        let records = format(&sample());
        let mut output = Vec::new();
        write_csv(&records, &mut output).unwrap();

        let csv = String::from_utf8(output).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("type,title,spa,service_code,tar_value,ecb_value,record_desc,system,prin,agent")
        );
        assert_eq!(
            lines.next(),
            Some("missing_from_ecb,Transaction missing from ECB file,S2,C2,,,,,,")
        );
        assert_eq!(
            lines.next(),
            Some("charge_mismatch,Charge mismatch found,S1,C1,\"$1,200.50\",$12.00,,,,")
        );
    }
}
