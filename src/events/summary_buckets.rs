use serde::{ser::SerializeTuple, Serialize};

use crate::{constants::MAX_SUMMARY_VALUE, errors::ConfigError};

/// Accumulation threshold interval `[lower_bound, upper_bound]`. A report is
/// emitted for the bucket once the running summary value reaches
/// `lower_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryBucket {
    lower_bound: u32,
    upper_bound: u32,
}

impl SummaryBucket {
    pub fn new(
        lower_bound: u32,
        upper_bound: u32,
    ) -> Result<Self, ConfigError> {
        if lower_bound > upper_bound {
            return Err(ConfigError::InvertedSummaryBucket {
                lower_bound,
                upper_bound,
            });
        }
        Ok(Self {
            lower_bound,
            upper_bound,
        })
    }

    pub fn lower_bound(&self) -> u32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> u32 {
        self.upper_bound
    }
}

/// Serialized as a `[lower, upper]` pair, like in the registration headers.
impl Serialize for SummaryBucket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.lower_bound)?;
        tuple.serialize_element(&self.upper_bound)?;
        tuple.end()
    }
}

/// The ordered sequence of summary buckets for one trigger data value.
///
/// Construction is pure, iteration state lives in a [`SummaryBucketCursor`]
/// so the same buckets can be walked any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBuckets {
    /// N buckets from N strictly increasing boundaries, the last one
    /// extending to [`MAX_SUMMARY_VALUE`].
    Finite(Vec<u32>),

    /// `[i, i]` for every `i` in `1..=MAX_SUMMARY_VALUE`. Used when a trigger
    /// spec has no explicit summary buckets; callers bound iteration with
    /// the report cap.
    Infinite,
}

impl SummaryBuckets {
    /// Builds finite buckets from their lower bounds.
    pub fn finite(boundaries: Vec<u32>) -> Result<Self, ConfigError> {
        if boundaries.is_empty() {
            return Err(ConfigError::EmptySummaryBuckets);
        }

        let mut previous = 0;
        for &value in &boundaries {
            if value <= previous || value >= MAX_SUMMARY_VALUE {
                return Err(ConfigError::InvalidSummaryBucket {
                    previous,
                    value,
                    max: MAX_SUMMARY_VALUE,
                });
            }
            previous = value;
        }

        Ok(SummaryBuckets::Finite(boundaries))
    }

    /// Number of buckets, or `None` for the unbounded variant.
    pub fn len(&self) -> Option<usize> {
        match self {
            SummaryBuckets::Finite(boundaries) => Some(boundaries.len()),
            SummaryBuckets::Infinite => None,
        }
    }

    pub fn cursor(&self) -> SummaryBucketCursor<'_> {
        SummaryBucketCursor {
            buckets: self,
            position: 0,
        }
    }
}

/// Caller-owned iteration state over [`SummaryBuckets`].
#[derive(Debug, Clone)]
pub struct SummaryBucketCursor<'a> {
    buckets: &'a SummaryBuckets,
    /// Index of the next bucket to yield.
    position: u64,
}

impl Iterator for SummaryBucketCursor<'_> {
    type Item = SummaryBucket;

    fn next(&mut self) -> Option<SummaryBucket> {
        let bucket = match self.buckets {
            SummaryBuckets::Finite(boundaries) => {
                let i = usize::try_from(self.position).ok()?;
                let lower_bound = *boundaries.get(i)?;
                let upper_bound = match boundaries.get(i + 1) {
                    Some(next) => next.checked_sub(1)?,
                    // TODO: confirm whether MAX_SUMMARY_VALUE should be a
                    // sentinel rather than part of the last bucket.
                    None => MAX_SUMMARY_VALUE,
                };
                // Strictly increasing boundaries keep this ordered.
                SummaryBucket::new(lower_bound, upper_bound).ok()?
            }
            SummaryBuckets::Infinite => {
                let value = self.position + 1;
                if value > u64::from(MAX_SUMMARY_VALUE) {
                    return None;
                }
                let value = value as u32;
                SummaryBucket {
                    lower_bound: value,
                    upper_bound: value,
                }
            }
        };
        self.position += 1;
        Some(bucket)
    }
}
