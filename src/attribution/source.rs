use std::collections::{BTreeMap, HashSet};

use log::debug;
use num_bigint::BigInt;

use crate::{
    budget::{
        config::{PerTriggerDataConfig, PrivacyConfig},
        traits::StateSpace,
    },
    constants::MAX_DISTINCT_TRIGGER_DATA,
    errors::ConfigError,
    events::{
        report_windows::ReportWindows, summary_buckets::SummaryBuckets,
        trigger::Trigger,
    },
};

/// How triggers contribute to the running summary value of their trigger
/// data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryOperator {
    /// Each trigger adds 1.
    #[default]
    Count,
    /// Each trigger adds its value.
    ValueSum,
}

/// Reporting configuration for a single trigger data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    pub windows: ReportWindows,
    pub summary_operator: SummaryOperator,
    pub summary_buckets: SummaryBuckets,
}

/// A trigger spec as registered, shared by every value in `trigger_data`.
#[derive(Debug, Clone, Default)]
pub struct TriggerSpecRegistration {
    pub trigger_data: Vec<u32>,
    pub start_time: i64,
    pub end_times: Vec<i64>,
    pub summary_operator: SummaryOperator,
    /// Summary bucket lower bounds. `None` means one bucket per integer.
    pub summary_buckets: Option<Vec<u32>>,
}

/// What `Source::attribute` did with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributionOutcome {
    Attributed,
    /// An attributed trigger already carries the same dedup key.
    Deduplicated,
    NoMatchingTriggerData,
    /// The trigger is outside every report window of its spec.
    ReportWindowPassed,
}

/// An attribution source with flexible event-level configuration, and the
/// triggers attributed to it so far (in attribution order).
#[derive(Debug, Clone)]
pub struct Source {
    max_event_level_reports: u32,
    trigger_specs: BTreeMap<u32, TriggerSpec>,
    triggers: Vec<Trigger>,
    dedup_keys: HashSet<BigInt>,
}

impl Source {
    pub fn new(
        max_event_level_reports: u32,
        registrations: Vec<TriggerSpecRegistration>,
    ) -> Result<Self, ConfigError> {
        let mut trigger_specs = BTreeMap::new();

        for registration in registrations {
            let summary_buckets = match registration.summary_buckets {
                Some(boundaries) => SummaryBuckets::finite(boundaries)?,
                None => SummaryBuckets::Infinite,
            };
            let spec = TriggerSpec {
                windows: ReportWindows::new(
                    registration.start_time,
                    registration.end_times,
                )?,
                summary_operator: registration.summary_operator,
                summary_buckets,
            };

            for trigger_data in registration.trigger_data {
                if trigger_specs.contains_key(&trigger_data) {
                    return Err(ConfigError::DuplicateTriggerData(
                        trigger_data,
                    ));
                }
                if trigger_specs.len() == MAX_DISTINCT_TRIGGER_DATA {
                    return Err(ConfigError::TooManyTriggerData(
                        MAX_DISTINCT_TRIGGER_DATA,
                    ));
                }
                trigger_specs.insert(trigger_data, spec.clone());
            }
        }

        Ok(Self {
            max_event_level_reports,
            trigger_specs,
            triggers: vec![],
            dedup_keys: HashSet::new(),
        })
    }

    pub fn max_event_level_reports(&self) -> u32 {
        self.max_event_level_reports
    }

    pub fn trigger_spec(&self, trigger_data: u32) -> Option<&TriggerSpec> {
        self.trigger_specs.get(&trigger_data)
    }

    /// Trigger specs in ascending trigger data order.
    pub fn trigger_specs(&self) -> impl Iterator<Item = (u32, &TriggerSpec)> {
        self.trigger_specs.iter().map(|(data, spec)| (*data, spec))
    }

    /// Attributed triggers, in attribution order.
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Attributes a trigger to this source. Dropped triggers leave the
    /// source untouched, including their dedup key.
    pub fn attribute(
        &mut self,
        trigger: Trigger,
    ) -> Result<AttributionOutcome, ConfigError> {
        if trigger.value == 0 {
            return Err(ConfigError::NonPositiveTriggerValue);
        }

        if let Some(dedup_key) = &trigger.dedup_key {
            if self.dedup_keys.contains(dedup_key) {
                debug!("Dropping trigger with duplicate dedup key {trigger:?}");
                return Ok(AttributionOutcome::Deduplicated);
            }
        }

        let Some(spec) = self.trigger_specs.get(&trigger.trigger_data) else {
            debug!("Dropping trigger with unknown trigger data {trigger:?}");
            return Ok(AttributionOutcome::NoMatchingTriggerData);
        };

        if spec.windows.end_time(trigger.time).is_none() {
            debug!("Dropping trigger outside of report windows {trigger:?}");
            return Ok(AttributionOutcome::ReportWindowPassed);
        }

        if let Some(dedup_key) = &trigger.dedup_key {
            self.dedup_keys.insert(dedup_key.clone());
        }
        self.triggers.push(trigger);
        Ok(AttributionOutcome::Attributed)
    }
}

/// One `(windows, buckets)` pair per trigger data value, ascending. Without
/// explicit buckets, the report cap bounds the number of buckets.
impl StateSpace for Source {
    fn privacy_config(&self) -> Result<PrivacyConfig, ConfigError> {
        let per_trigger_data = self
            .trigger_specs
            .values()
            .map(|spec| {
                let num_summary_buckets = match spec.summary_buckets.len() {
                    Some(len) => u32::try_from(len).unwrap_or(u32::MAX),
                    None => self.max_event_level_reports,
                };
                let num_windows = u32::try_from(spec.windows.num_windows())
                    .unwrap_or(u32::MAX);
                PerTriggerDataConfig::new(num_windows, num_summary_buckets)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PrivacyConfig::new(self.max_event_level_reports, per_trigger_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;

    fn registration(trigger_data: Vec<u32>) -> TriggerSpecRegistration {
        TriggerSpecRegistration {
            trigger_data,
            start_time: 0,
            end_times: vec![2 * SECONDS_PER_DAY, 7 * SECONDS_PER_DAY],
            summary_operator: SummaryOperator::Count,
            summary_buckets: None,
        }
    }

    #[test]
    fn test_source_construction_errors() {
        assert_eq!(
            Source::new(3, vec![registration(vec![0, 1, 1])]).unwrap_err(),
            ConfigError::DuplicateTriggerData(1)
        );
        assert_eq!(
            Source::new(3, vec![registration((0..33).collect())]).unwrap_err(),
            ConfigError::TooManyTriggerData(MAX_DISTINCT_TRIGGER_DATA)
        );
        assert!(Source::new(3, vec![registration((0..32).collect())]).is_ok());

        let mut bad_windows = registration(vec![0]);
        bad_windows.end_times = vec![10, 5];
        assert!(Source::new(3, vec![bad_windows]).is_err());

        let mut bad_buckets = registration(vec![0]);
        bad_buckets.summary_buckets = Some(vec![]);
        assert_eq!(
            Source::new(3, vec![bad_buckets]).unwrap_err(),
            ConfigError::EmptySummaryBuckets
        );
    }

    #[test]
    fn test_attribute() {
        let mut source = Source::new(3, vec![registration(vec![0, 1])]).unwrap();

        assert_eq!(
            source.attribute(Trigger::new(1)).unwrap(),
            AttributionOutcome::Attributed
        );
        assert_eq!(
            source
                .attribute(Trigger::new(1).with_trigger_data(5))
                .unwrap(),
            AttributionOutcome::NoMatchingTriggerData
        );
        assert_eq!(
            source.attribute(Trigger::new(7 * SECONDS_PER_DAY)).unwrap(),
            AttributionOutcome::ReportWindowPassed
        );
        assert_eq!(
            source.attribute(Trigger::new(-1)).unwrap(),
            AttributionOutcome::ReportWindowPassed
        );
        assert_eq!(
            source.attribute(Trigger::new(1).with_value(0)),
            Err(ConfigError::NonPositiveTriggerValue)
        );
        assert_eq!(source.triggers().len(), 1);
    }

    #[test]
    fn test_dedup_keys() {
        let mut source = Source::new(3, vec![registration(vec![0])]).unwrap();

        // A rejected trigger does not claim its dedup key.
        let late = Trigger::new(8 * SECONDS_PER_DAY).with_dedup_key(9);
        assert_eq!(
            source.attribute(late).unwrap(),
            AttributionOutcome::ReportWindowPassed
        );

        let first = Trigger::new(1).with_dedup_key(9);
        let second = Trigger::new(2).with_dedup_key(9).with_priority(100);
        assert_eq!(
            source.attribute(first).unwrap(),
            AttributionOutcome::Attributed
        );
        assert_eq!(
            source.attribute(second).unwrap(),
            AttributionOutcome::Deduplicated
        );
        assert_eq!(
            source.attribute(Trigger::new(3).with_dedup_key(10)).unwrap(),
            AttributionOutcome::Attributed
        );
        assert_eq!(source.triggers().len(), 2);
    }

    #[test]
    fn test_source_privacy_config() {
        let mut with_buckets = registration(vec![2]);
        with_buckets.summary_buckets = Some(vec![1, 5]);
        with_buckets.end_times = vec![SECONDS_PER_DAY];
        let source =
            Source::new(3, vec![registration(vec![0, 1]), with_buckets])
                .unwrap();

        let config = source.privacy_config().unwrap();
        assert_eq!(config.max_event_level_reports, 3);
        let pairs: Vec<_> = config
            .per_trigger_data
            .iter()
            .map(|c| (c.num_windows, c.num_summary_buckets))
            .collect();
        assert_eq!(pairs, vec![(2, 3), (2, 3), (1, 2)]);
    }
}
