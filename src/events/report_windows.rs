use crate::errors::ConfigError;

/// Returns the end of the report window that `trigger_time` falls into, or
/// `None` if the trigger came before `start_time` or after the last window.
///
/// `end_times` must be sorted ascending.
pub fn end_time(
    start_time: i64,
    end_times: &[i64],
    trigger_time: i64,
) -> Option<i64> {
    if trigger_time < start_time {
        return None;
    }
    end_times.iter().copied().find(|&end| trigger_time < end)
}

/// Report windows of a trigger spec. Times are in seconds relative to the
/// source registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindows {
    start_time: i64,
    end_times: Vec<i64>,
}

impl ReportWindows {
    pub fn new(
        start_time: i64,
        end_times: Vec<i64>,
    ) -> Result<Self, ConfigError> {
        if start_time < 0 {
            return Err(ConfigError::NegativeStartTime(start_time));
        }
        if end_times.is_empty() {
            return Err(ConfigError::EmptyReportWindows);
        }

        let mut previous = start_time;
        for &end_time in &end_times {
            if end_time <= previous {
                return Err(ConfigError::NonIncreasingEndTime {
                    previous,
                    end_time,
                });
            }
            previous = end_time;
        }

        Ok(Self {
            start_time,
            end_times,
        })
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_times(&self) -> &[i64] {
        &self.end_times
    }

    pub fn num_windows(&self) -> usize {
        self.end_times.len()
    }

    /// See [`end_time`].
    pub fn end_time(&self, trigger_time: i64) -> Option<i64> {
        end_time(self.start_time, &self.end_times, trigger_time)
    }
}
