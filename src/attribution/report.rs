use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::{
    attribution::source::{Source, SummaryOperator, TriggerSpec},
    events::{
        summary_buckets::{SummaryBucket, SummaryBucketCursor},
        trigger::Trigger,
    },
};

/// An event-level report, delivered at the end of its report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLevelReport {
    /// End of the report window of the trigger that completed the bucket.
    pub time: i64,
    pub trigger_data: u32,
    pub summary_bucket: SummaryBucket,
}

/// An attributed trigger with its resolved report window.
struct PendingTrigger<'a> {
    trigger: &'a Trigger,
    spec: &'a TriggerSpec,
    end_time: i64,
}

/// Running summary of one trigger data value during the walk.
struct Summary<'a> {
    value: u64,
    cursor: SummaryBucketCursor<'a>,
    /// Next bucket to complete, `None` once the buckets are exhausted.
    bucket: Option<SummaryBucket>,
}

impl<'a> Summary<'a> {
    fn new(spec: &'a TriggerSpec) -> Self {
        let mut cursor = spec.summary_buckets.cursor();
        let bucket = cursor.next();
        Self {
            value: 0,
            cursor,
            bucket,
        }
    }
}

impl Source {
    /// Computes the event-level reports for the triggers attributed so far.
    ///
    /// Triggers are applied greedily by report window ascending, then
    /// priority descending, then trigger time ascending. Each time the
    /// running summary of a trigger data value reaches the lower bound of its
    /// current bucket, a report is emitted for that bucket. The walk stops as
    /// soon as `max_event_level_reports` reports exist (across all trigger
    /// data) or a trigger data value runs out of buckets.
    ///
    /// Recomputed from scratch on every call, the source is not modified.
    pub fn pending_reports(&self) -> Vec<EventLevelReport> {
        let cap = self.max_event_level_reports() as usize;
        let mut reports = vec![];
        if cap == 0 {
            return reports;
        }

        let mut pending: Vec<PendingTrigger> = self
            .triggers()
            .iter()
            .filter_map(|trigger| {
                let spec = self.trigger_spec(trigger.trigger_data)?;
                let end_time = spec.windows.end_time(trigger.time)?;
                Some(PendingTrigger {
                    trigger,
                    spec,
                    end_time,
                })
            })
            .collect();

        // Stable, so full ties keep attribution order.
        pending.sort_by(|a, b| {
            a.end_time
                .cmp(&b.end_time)
                .then_with(|| b.trigger.priority.cmp(&a.trigger.priority))
                .then_with(|| a.trigger.time.cmp(&b.trigger.time))
        });

        let mut summaries: HashMap<u32, Summary> = HashMap::new();

        for PendingTrigger {
            trigger,
            spec,
            end_time,
        } in pending
        {
            let summary = summaries
                .entry(trigger.trigger_data)
                .or_insert_with(|| Summary::new(spec));

            summary.value += match spec.summary_operator {
                SummaryOperator::Count => 1,
                SummaryOperator::ValueSum => u64::from(trigger.value),
            };

            while let Some(bucket) = summary.bucket {
                if summary.value < u64::from(bucket.lower_bound()) {
                    break;
                }

                reports.push(EventLevelReport {
                    time: end_time,
                    trigger_data: trigger.trigger_data,
                    summary_bucket: bucket,
                });

                summary.bucket = summary.cursor.next();
                if reports.len() == cap || summary.bucket.is_none() {
                    debug!(
                        "Stopping after {} reports, trigger data {} exhausted: {}",
                        reports.len(),
                        trigger.trigger_data,
                        summary.bucket.is_none()
                    );
                    return reports;
                }
            }
        }

        reports
    }
}
