//! Inputs of the attribution simulation: triggers, report windows and
//! summary buckets.

pub mod report_windows;
pub mod summary_buckets;
pub mod trigger;
