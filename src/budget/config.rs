use log::debug;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Serialize, Serializer};

use crate::{
    budget::state_space::count_states,
    constants::DEFAULT_INFO_GAIN_TOLERANCE,
    errors::ConfigError,
    mechanisms::randomized_response::{
        attribution_scopes_info_gain, flip_probability, max_information_gain,
        solve_epsilon,
    },
    source_type::SourceType,
};

/// Window and summary bucket counts of one trigger data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerTriggerDataConfig {
    pub num_windows: u32,
    pub num_summary_buckets: u32,
}

impl PerTriggerDataConfig {
    pub fn new(
        num_windows: u32,
        num_summary_buckets: u32,
    ) -> Result<Self, ConfigError> {
        if num_windows == 0 {
            return Err(ConfigError::NoReportWindows);
        }
        Ok(Self {
            num_windows,
            num_summary_buckets,
        })
    }
}

/// Attribution scope parameters of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributionScopes {
    /// Maximum number of distinct scopes per destination.
    pub limit: u32,
    /// Maximum number of event states of other sources sharing the scopes.
    pub max_event_states: u32,
}

/// Shape of a source's event-level output, as consumed by the privacy
/// accounting. Order of `per_trigger_data` does not change the result.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivacyConfig {
    pub max_event_level_reports: u32,
    pub per_trigger_data: Vec<PerTriggerDataConfig>,
    pub attribution_scopes: Option<AttributionScopes>,
}

/// Corrective parameters when the configured epsilon leaks too much.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcessiveInfoGain {
    pub new_epsilon: f64,
    pub new_flip_prob: f64,
}

/// Privacy accounting results for a [`PrivacyConfig`] at some epsilon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigData {
    #[serde(serialize_with = "serialize_decimal")]
    pub num_states: BigUint,

    /// Bits.
    pub info_gain: f64,

    pub flip_prob: f64,

    /// Set when `info_gain` exceeds the requested maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excessive: Option<ExcessiveInfoGain>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution_scopes_info_gain: Option<f64>,
}

/// State counts can outgrow every primitive, so they go out as strings.
pub(crate) fn serialize_decimal<S>(
    value: &BigUint,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Lossy conversion for the floating point formulas. Saturates to infinity.
pub(crate) fn states_as_f64(num_states: &BigUint) -> f64 {
    num_states.to_f64().unwrap_or(f64::INFINITY)
}

impl PrivacyConfig {
    pub fn new(
        max_event_level_reports: u32,
        per_trigger_data: Vec<PerTriggerDataConfig>,
    ) -> Self {
        Self {
            max_event_level_reports,
            per_trigger_data,
            attribution_scopes: None,
        }
    }

    pub fn with_attribution_scopes(
        mut self,
        attribution_scopes: AttributionScopes,
    ) -> Self {
        self.attribution_scopes = Some(attribution_scopes);
        self
    }

    /// Configuration of a source that doesn't customize event-level
    /// reporting.
    pub fn default_for(source_type: SourceType) -> Self {
        let max_reports = source_type.default_max_event_level_reports();
        let per_trigger_data = PerTriggerDataConfig {
            num_windows: source_type.default_num_windows(),
            num_summary_buckets: max_reports,
        };
        Self::new(
            max_reports,
            vec![
                per_trigger_data;
                source_type.default_trigger_data_cardinality()
            ],
        )
    }

    /// Number of distinct outputs of the mechanism.
    pub fn num_states(&self) -> BigUint {
        count_states(self.max_event_level_reports, &self.per_trigger_data)
    }

    /// Computes the number of states, flip probability and information gain
    /// at `epsilon`. When the gain exceeds `info_gain_max`, also computes the
    /// epsilon that would satisfy it. Exceeding the bound is reported, not
    /// rejected.
    pub fn compute_config_data(
        &self,
        epsilon: f64,
        info_gain_max: f64,
    ) -> ConfigData {
        let num_states = self.num_states();
        let states = states_as_f64(&num_states);

        let info_gain = max_information_gain(states, epsilon);
        let flip_prob = flip_probability(states, epsilon);

        let excessive = (info_gain > info_gain_max).then(|| {
            let new_epsilon = solve_epsilon(
                states,
                info_gain_max,
                epsilon,
                DEFAULT_INFO_GAIN_TOLERANCE,
            );
            debug!(
                "Information gain {info_gain} exceeds {info_gain_max} for \
                 {num_states} states, epsilon {epsilon} -> {new_epsilon}"
            );
            ExcessiveInfoGain {
                new_epsilon,
                new_flip_prob: flip_probability(states, new_epsilon),
            }
        });

        let attribution_scopes_info_gain = self.attribution_scopes.map(|s| {
            attribution_scopes_info_gain(states, s.limit, s.max_event_states)
        });

        ConfigData {
            num_states,
            info_gain,
            flip_prob,
            excessive,
            attribution_scopes_info_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{actual} is not close to {expected}"
        );
    }

    #[test]
    fn test_per_trigger_data_config() {
        assert_eq!(
            PerTriggerDataConfig::new(0, 3),
            Err(ConfigError::NoReportWindows)
        );
        assert!(PerTriggerDataConfig::new(1, 0).is_ok());
    }

    #[test]
    fn test_navigation_defaults() {
        let data = PrivacyConfig::default_for(SourceType::Navigation)
            .compute_config_data(14.0, 11.5);
        assert_eq!(data.num_states, BigUint::from(2925u32));
        assert_close(data.info_gain, 11.461727965384876);
        assert_close(data.flip_prob, 0.0024263221679834087);
        assert_eq!(data.excessive, None);
        assert_eq!(data.attribution_scopes_info_gain, None);
    }

    #[test]
    fn test_event_defaults() {
        let data = PrivacyConfig::default_for(SourceType::Event)
            .compute_config_data(14.0, 6.5);
        assert_eq!(data.num_states, BigUint::from(3u32));
        assert_close(data.info_gain, 1.584926511508231);
        assert_close(data.flip_prob, 0.000002494582008677539);
        assert_eq!(data.excessive, None);
    }

    #[test]
    fn test_attribution_scopes() {
        let scopes = AttributionScopes {
            limit: 3,
            max_event_states: 4,
        };
        let data = PrivacyConfig::default_for(SourceType::Navigation)
            .with_attribution_scopes(scopes)
            .compute_config_data(14.0, 11.5);
        assert_close(
            data.attribution_scopes_info_gain.unwrap(),
            11.518161355756956,
        );

        let data = PrivacyConfig::default_for(SourceType::Event)
            .with_attribution_scopes(scopes)
            .compute_config_data(14.0, 6.5);
        assert_close(
            data.attribution_scopes_info_gain.unwrap(),
            3.4594316186372973,
        );
    }

    #[test]
    fn test_excessive_info_gain() {
        // 4 reports over 8 trigger data with 3 windows each: C(28, 4).
        let config = PrivacyConfig::new(
            4,
            vec![PerTriggerDataConfig::new(3, 4).unwrap(); 8],
        );
        let data = config.compute_config_data(14.0, 11.5);
        assert_eq!(data.num_states, BigUint::from(20475u32));
        assert!(data.info_gain > 11.5);

        let excessive = data.excessive.unwrap();
        assert!(excessive.new_epsilon < 14.0);
        assert!(excessive.new_flip_prob > data.flip_prob);
        let states = states_as_f64(&data.num_states);
        let corrected = max_information_gain(states, excessive.new_epsilon);
        assert!(corrected <= 11.5);
        assert!(corrected >= 11.5 - DEFAULT_INFO_GAIN_TOLERANCE);
    }

    #[test]
    fn test_config_data_serialization() {
        let data = PrivacyConfig::default_for(SourceType::Event)
            .compute_config_data(14.0, 6.5);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["num_states"], "3");
        assert!(json.get("excessive").is_none());
    }
}
