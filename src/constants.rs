//! Protocol constants, see https://wicg.github.io/attribution-reporting-api/#constants

pub const SECONDS_PER_HOUR: i64 = 60 * 60;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Largest summary value, and upper bound of the last summary bucket.
pub const MAX_SUMMARY_VALUE: u32 = u32::MAX;

/// Maximum number of distinct trigger data values a source can configure.
pub const MAX_DISTINCT_TRIGGER_DATA: usize = 32;

/// Largest `max_event_level_reports` a source may set.
pub const MAX_SETTABLE_EVENT_LEVEL_REPORTS: u32 = 20;

/// Slack allowed below the information gain bound when searching for epsilon.
pub const DEFAULT_INFO_GAIN_TOLERANCE: f64 = 0.00001;

/// Default `attribution_scopes.max_event_states`.
pub const DEFAULT_MAX_EVENT_STATES: u32 = 3;
