use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_DAY;

/// Whether a source was registered on a navigation or on an event (e.g. an
/// ad view). Defaults and privacy limits depend on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Event,
    #[default]
    Navigation,
}

impl SourceType {
    /// Default `max_event_level_reports` when a source doesn't set one.
    pub fn default_max_event_level_reports(&self) -> u32 {
        match self {
            SourceType::Event => 1,
            SourceType::Navigation => 3,
        }
    }

    /// Number of trigger data values a source gets without trigger specs.
    pub fn default_trigger_data_cardinality(&self) -> usize {
        match self {
            SourceType::Event => 2,
            SourceType::Navigation => 8,
        }
    }

    /// Report window end times before the source expiry.
    pub fn default_early_report_windows(&self) -> &'static [i64] {
        const NAVIGATION: [i64; 2] = [2 * SECONDS_PER_DAY, 7 * SECONDS_PER_DAY];
        match self {
            SourceType::Event => &[],
            SourceType::Navigation => &NAVIGATION,
        }
    }

    /// Default window count: early windows plus the expiry window.
    pub fn default_num_windows(&self) -> u32 {
        self.default_early_report_windows().len() as u32 + 1
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Event => write!(f, "event"),
            SourceType::Navigation => write!(f, "navigation"),
        }
    }
}

impl FromStr for SourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(SourceType::Event),
            "navigation" => Ok(SourceType::Navigation),
            other => anyhow::bail!("unknown source type {other:?}"),
        }
    }
}
