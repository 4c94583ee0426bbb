//! Attribution of triggers to a source and materialization of event-level
//! reports.

pub mod report;
pub mod source;
