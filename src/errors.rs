use thiserror::Error;

/// Errors raised while building a source or privacy configuration.
///
/// These are fatal: a rejected configuration never produces a usable object.
/// Exceeding a privacy bound is not an error, see
/// [`ConfigData::excessive`](crate::budget::config::ConfigData).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("start time must be non-negative, got {0}")]
    NegativeStartTime(i64),

    #[error("report window end times must be non-empty")]
    EmptyReportWindows,

    #[error(
        "report window end times must be strictly increasing and greater \
         than the start time, got {end_time} after {previous}"
    )]
    NonIncreasingEndTime { previous: i64, end_time: i64 },

    #[error("summary buckets must be non-empty")]
    EmptySummaryBuckets,

    #[error(
        "summary buckets must contain strictly increasing positive integers \
         < {max}, got {value} after {previous}"
    )]
    InvalidSummaryBucket { previous: u32, value: u32, max: u32 },

    #[error("summary bucket [{lower_bound}, {upper_bound}] is inverted")]
    InvertedSummaryBucket { lower_bound: u32, upper_bound: u32 },

    #[error("duplicate trigger data {0}")]
    DuplicateTriggerData(u32),

    #[error("too many distinct trigger data, at most {0} allowed")]
    TooManyTriggerData(usize),

    #[error("trigger value must be positive")]
    NonPositiveTriggerValue,

    #[error("number of report windows must be > 0")]
    NoReportWindows,
}
