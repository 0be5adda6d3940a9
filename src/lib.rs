//! # Billing Reconciliation
//!
//! Reconciles a TAR billing extract against an ECB extract. Records are
//! matched on the composite key (SPA, Service Code); the engine reports keys
//! present on only one side and Charge, Stop Date and New Charge mismatches
//! for keys present on both.
//!
//! ## Design Principles
//!
//! - **Exact currency**: amounts are `rust_decimal` values compared without tolerance
//! - **Header-driven schemas**: columns are located by name and validated up front
//! - **Deterministic output**: discrepancies follow file order
//! - **No shared state**: each comparison builds its own result
//!
//! ## Example
//!
//! ```no_run
//! use billing_recon::{report, Reconciler};
//!
//! let result = Reconciler::default().run("tar.csv", "ecb.csv").unwrap();
//! report::write_text(&result.records, &result.summary, std::io::stdout()).unwrap();
//! ```

pub mod compare;
pub mod currency;
pub mod engine;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod record;
pub mod report;

pub use compare::{compare, Discrepancy, DiscrepancyKind};
pub use currency::Currency;
pub use engine::{ReconcileOptions, Reconciler, Reconciliation};
pub use error::{MalformedValue, ReconcileError, Result};
pub use loader::{load_ecb, load_tar, read_ecb, read_tar, Loaded, ValuePolicy, ValueWarning};
pub use normalize::{normalize_currency, normalize_date};
pub use record::{BillingFields, EcbMap, EcbRecord, RecordKey, Source, TarMap, TarRecord};
pub use report::{format, summary_count, DisplayRecord, Summary};
