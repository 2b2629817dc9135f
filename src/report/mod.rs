//! Validation results and run reports.

pub mod result;
pub mod run_report;
pub mod store;

pub use result::{any_degrading, Status, TargetKind, ValidationResult};
pub use run_report::{generate_report, generate_report_at, OverallStatus, ReportInput, RunReport};
pub use store::ReportStore;
