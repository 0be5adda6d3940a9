//! CSV loading for the TAR and ECB extracts.
//!
//! Columns are located by header name once per file; a missing required
//! column fails the whole load before any row is read. Rows are normalized as
//! they stream past and collected into an insertion-ordered map where a
//! repeated key keeps its first position but takes the last row's values.

use crate::currency::Currency;
use crate::error::{MalformedValue, ReconcileError, Result};
use crate::normalize::{normalize_currency, normalize_date};
use crate::record::{EcbRecord, RecordKey, Source, TarRecord};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub const SPA: &str = "SPA";
pub const SERVICE_CODE: &str = "Service Code";
pub const CHARGE: &str = "Charge";
pub const STOP_DATE: &str = "Stop Date";
pub const NEW_CHARGE: &str = "New Charge";
pub const RECORD_DESC: &str = "Record Desc";
pub const SYSTEM: &str = "System";
pub const PRIN: &str = "Prin";
pub const AGENT: &str = "Agent";

/// What to do with a currency cell that is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuePolicy {
    /// Log a warning, record it, and use zero.
    #[default]
    Coerce,
    /// Abort the load with [`ReconcileError::MalformedValue`].
    Reject,
}

/// A malformed currency cell that was replaced by zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWarning {
    pub source: Source,
    /// File line, header is line 1.
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

impl fmt::Display for ValueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file row {}: invalid {} value {:?} treated as 0",
            self.source, self.row, self.column, self.value
        )
    }
}

/// Records loaded from one source plus any coerced values.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: IndexMap<RecordKey, T>,
    pub warnings: Vec<ValueWarning>,
}

/// Loads a TAR extract from disk.
pub fn load_tar<P: AsRef<Path>>(path: P, policy: ValuePolicy) -> Result<Loaded<TarRecord>> {
    let path = path.as_ref();
    read_tar(open(path)?, policy).map_err(|e| with_path(e, path))
}

/// Loads an ECB extract from disk.
pub fn load_ecb<P: AsRef<Path>>(path: P, policy: ValuePolicy) -> Result<Loaded<EcbRecord>> {
    let path = path.as_ref();
    read_ecb(open(path)?, policy).map_err(|e| with_path(e, path))
}

/// Reads a TAR extract from any reader.
pub fn read_tar<R: Read>(reader: R, policy: ValuePolicy) -> Result<Loaded<TarRecord>> {
    let mut csv_reader = csv_reader(reader);
    let columns = TarColumns::locate(csv_reader.headers()?, Source::Tar)?;

    load_rows(&mut csv_reader, Source::Tar, policy, |row| {
        let key = row.key(columns.spa, columns.service_code);
        let record = TarRecord {
            charge: row.currency(columns.charge, CHARGE)?,
            stop_date: normalize_date(row.text(columns.stop_date)),
            new_charge: row.currency(columns.new_charge, NEW_CHARGE)?,
        };
        Ok((key, record))
    })
}

/// Reads an ECB extract from any reader.
pub fn read_ecb<R: Read>(reader: R, policy: ValuePolicy) -> Result<Loaded<EcbRecord>> {
    let mut csv_reader = csv_reader(reader);
    let columns = EcbColumns::locate(csv_reader.headers()?)?;
    let base = columns.base;

    load_rows(&mut csv_reader, Source::Ecb, policy, |row| {
        let key = row.key(base.spa, base.service_code);
        let record = EcbRecord {
            charge: row.currency(base.charge, CHARGE)?,
            stop_date: normalize_date(row.text(base.stop_date)),
            new_charge: row.currency(base.new_charge, NEW_CHARGE)?,
            record_desc: row.text(columns.record_desc).to_string(),
            system: row.text(columns.system).to_string(),
            prin: row.text(columns.prin).to_string(),
            agent: row.text(columns.agent).to_string(),
        };
        Ok((key, record))
    })
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Turns a read failure surfaced by the CSV reader into an `Io` error naming the file.
fn with_path(err: ReconcileError, path: &Path) -> ReconcileError {
    let read_failure = match &err {
        ReconcileError::Csv(e) => match e.kind() {
            csv::ErrorKind::Io(source) => Some(io::Error::new(source.kind(), source.to_string())),
            _ => None,
        },
        _ => None,
    };

    match read_failure {
        Some(source) => ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        },
        None => err,
    }
}

fn csv_reader<R: Read>(reader: R) -> Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Column positions shared by both schemas.
#[derive(Debug, Clone, Copy)]
struct TarColumns {
    spa: usize,
    service_code: usize,
    charge: usize,
    stop_date: usize,
    new_charge: usize,
}

impl TarColumns {
    fn locate(headers: &StringRecord, source: Source) -> Result<Self> {
        Ok(TarColumns {
            spa: column(headers, SPA, source)?,
            service_code: column(headers, SERVICE_CODE, source)?,
            charge: column(headers, CHARGE, source)?,
            stop_date: column(headers, STOP_DATE, source)?,
            new_charge: column(headers, NEW_CHARGE, source)?,
        })
    }
}

/// Column positions for the ECB schema.
#[derive(Debug, Clone, Copy)]
struct EcbColumns {
    base: TarColumns,
    record_desc: usize,
    system: usize,
    prin: usize,
    agent: usize,
}

impl EcbColumns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        Ok(EcbColumns {
            base: TarColumns::locate(headers, Source::Ecb)?,
            record_desc: column(headers, RECORD_DESC, Source::Ecb)?,
            system: column(headers, SYSTEM, Source::Ecb)?,
            prin: column(headers, PRIN, Source::Ecb)?,
            agent: column(headers, AGENT, Source::Ecb)?,
        })
    }
}

fn column(headers: &StringRecord, name: &'static str, source: Source) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ReconcileError::Schema {
            side: source,
            column: name,
            present: headers.iter().map(String::from).collect(),
        })
}

/// One data row being normalized.
struct Row<'a> {
    record: &'a StringRecord,
    line: usize,
    source: Source,
    policy: ValuePolicy,
    warnings: &'a mut Vec<ValueWarning>,
}

impl Row<'_> {
    /// Cell text, empty when a short row lacks the column.
    fn text(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or("")
    }

    fn key(&self, spa: usize, service_code: usize) -> RecordKey {
        RecordKey::new(self.text(spa), self.text(service_code))
    }

    fn currency(&mut self, idx: usize, column: &'static str) -> Result<Currency> {
        match normalize_currency(self.record.get(idx)) {
            Ok(amount) => Ok(amount),
            Err(MalformedValue(value)) => match self.policy {
                ValuePolicy::Reject => Err(ReconcileError::MalformedValue {
                    side: self.source,
                    row: self.line,
                    column,
                    value,
                }),
                ValuePolicy::Coerce => {
                    let warning = ValueWarning {
                        source: self.source,
                        row: self.line,
                        column,
                        value,
                    };
                    warn!("{}", warning);
                    self.warnings.push(warning);
                    Ok(Currency::ZERO)
                }
            },
        }
    }
}

fn load_rows<R, T, F>(
    csv_reader: &mut Reader<R>,
    source: Source,
    policy: ValuePolicy,
    mut build: F,
) -> Result<Loaded<T>>
where
    R: Read,
    F: FnMut(&mut Row<'_>) -> Result<(RecordKey, T)>,
{
    let mut records = IndexMap::new();
    let mut warnings = Vec::new();

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_idx + 2);

        let mut row = Row {
            record: &record,
            line,
            source,
            policy,
            warnings: &mut warnings,
        };
        let (key, value) = build(&mut row)?;

        if records.insert(key.clone(), value).is_some() {
            warn!(
                "{} file row {}: duplicate key {}, later row replaces earlier",
                source, line, key
            );
        }
    }

    info!("Loaded {} records from {} file", records.len(), source);
    Ok(Loaded { records, warnings })
}
