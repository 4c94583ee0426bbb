use num_bigint::BigInt;

/// A trigger (conversion) registered against a source.
///
/// Use [`Trigger::new`] for the defaults: trigger data 0, priority 0 and
/// value 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Seconds since the source registration.
    pub time: i64,
    pub trigger_data: u32,
    pub priority: i64,
    /// Must be positive. Only used by value-sum summaries.
    pub value: u32,
    /// Triggers sharing a dedup key with an attributed trigger are dropped.
    pub dedup_key: Option<BigInt>,
}

impl Trigger {
    pub fn new(time: i64) -> Self {
        Self {
            time,
            trigger_data: 0,
            priority: 0,
            value: 1,
            dedup_key: None,
        }
    }

    pub fn with_trigger_data(mut self, trigger_data: u32) -> Self {
        self.trigger_data = trigger_data;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_dedup_key(mut self, dedup_key: impl Into<BigInt>) -> Self {
        self.dedup_key = Some(dedup_key.into());
        self
    }
}
