pub mod check_result;
pub mod report;

pub use check_result::{CheckResult, FailureKind, Measurement};
pub use report::CheckReport;
