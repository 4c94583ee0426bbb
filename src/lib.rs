//! Flexible event-level reporting for the Attribution Reporting API.
//!
//! Two pieces live here:
//! - [`attribution`]: attributes triggers to a [`Source`] and derives the
//!   event-level reports it would send, bounded by windows, summary buckets
//!   and a report cap.
//! - [`budget`] and [`mechanisms`]: count the output states of a source
//!   configuration and account for the information gain of reporting them
//!   through randomized response.
//!
//! Inputs are assumed to be validated already. Parsing of registration
//! headers is out of scope apart from the minimal [`registration`] reader.

pub mod attribution;
pub mod budget;
pub mod constants;
pub mod errors;
pub mod events;
pub mod mechanisms;
pub mod registration;
pub mod source_type;

pub use attribution::{
    report::EventLevelReport,
    source::{
        AttributionOutcome, Source, SummaryOperator, TriggerSpecRegistration,
    },
};
pub use budget::{
    config::{ConfigData, PrivacyConfig},
    traits::StateSpace,
};
pub use errors::ConfigError;
pub use events::trigger::Trigger;
pub use source_type::SourceType;
