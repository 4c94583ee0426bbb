use std::fmt;

use num_bigint::BigUint;
use serde::Serialize;

use crate::{
    budget::config::{serialize_decimal, ConfigData, PrivacyConfig},
    source_type::SourceType,
};

/// A value that differs between event and navigation sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerSourceType<T> {
    pub event: T,
    pub navigation: T,
}

impl<T: Copy> PerSourceType<T> {
    pub fn get(&self, source_type: SourceType) -> T {
        match source_type {
            SourceType::Event => self.event,
            SourceType::Navigation => self.navigation,
        }
    }
}

/// Browser-specific privacy limits for event-level reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorLimits {
    /// Information gain bound, in bits.
    pub max_event_level_channel_capacity: PerSourceType<f64>,
    /// Bound on the attribution scopes information gain, in bits.
    pub max_event_level_attribution_scopes_channel_capacity: PerSourceType<f64>,
    pub max_settable_event_level_epsilon: f64,
    pub max_trigger_state_cardinality: u32,
}

impl VendorLimits {
    pub fn chromium() -> Self {
        Self {
            max_event_level_channel_capacity: PerSourceType {
                event: 6.5,
                navigation: 11.5,
            },
            max_event_level_attribution_scopes_channel_capacity:
                PerSourceType {
                    event: 6.5,
                    navigation: 11.55,
                },
            max_settable_event_level_epsilon: 14.0,
            max_trigger_state_cardinality: u32::MAX,
        }
    }

    pub fn info_gain_max(&self, source_type: SourceType) -> f64 {
        self.max_event_level_channel_capacity.get(source_type)
    }

    /// Checks accounting results against these limits. An empty result means
    /// the configuration is acceptable.
    pub fn violations(
        &self,
        source_type: SourceType,
        config: &PrivacyConfig,
        data: &ConfigData,
    ) -> Vec<PolicyViolation> {
        let mut violations = vec![];

        let max_states = self.max_trigger_state_cardinality;
        if data.num_states > BigUint::from(max_states) {
            violations.push(PolicyViolation::StateCardinality {
                num_states: data.num_states.clone(),
                max: max_states,
            });
        }

        if let Some(scopes) = config.attribution_scopes {
            if source_type == SourceType::Event
                && data.num_states > BigUint::from(scopes.max_event_states)
            {
                violations.push(PolicyViolation::MaxEventStates {
                    num_states: data.num_states.clone(),
                    max: scopes.max_event_states,
                });
            }
        }

        let max_info_gain = self.info_gain_max(source_type);
        if data.info_gain > max_info_gain {
            violations.push(PolicyViolation::InfoGain {
                source_type,
                info_gain: data.info_gain,
                max: max_info_gain,
            });
        }

        if let Some(info_gain) = data.attribution_scopes_info_gain {
            let max = self
                .max_event_level_attribution_scopes_channel_capacity
                .get(source_type);
            if info_gain > max {
                violations.push(PolicyViolation::AttributionScopesInfoGain {
                    source_type,
                    info_gain,
                    max,
                });
            }
        }

        violations
    }
}

impl Default for VendorLimits {
    fn default() -> Self {
        Self::chromium()
    }
}

/// A limit exceeded by a configuration. These are findings for the caller to
/// act on, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyViolation {
    StateCardinality {
        #[serde(serialize_with = "serialize_decimal")]
        num_states: BigUint,
        max: u32,
    },
    MaxEventStates {
        #[serde(serialize_with = "serialize_decimal")]
        num_states: BigUint,
        max: u32,
    },
    InfoGain {
        source_type: SourceType,
        info_gain: f64,
        max: f64,
    },
    AttributionScopesInfoGain {
        source_type: SourceType,
        info_gain: f64,
        max: f64,
    },
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyViolation::StateCardinality { num_states, max } => write!(
                f,
                "number of possible output states ({num_states}) exceeds max \
                 cardinality ({max})"
            ),
            PolicyViolation::MaxEventStates { num_states, max } => write!(
                f,
                "number of possible output states ({num_states}) exceeds max \
                 event states ({max})"
            ),
            PolicyViolation::InfoGain {
                source_type,
                info_gain,
                max,
            } => write!(
                f,
                "information gain: {info_gain:.2} exceeds max event-level \
                 channel capacity per {source_type} source ({max:.2})"
            ),
            PolicyViolation::AttributionScopesInfoGain {
                source_type,
                info_gain,
                max,
            } => write!(
                f,
                "information gain for attribution scope: {info_gain:.2} \
                 exceeds max event-level attribution scope information gain \
                 per {source_type} source ({max:.2})"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::config::{AttributionScopes, PerTriggerDataConfig};

    #[test]
    fn test_defaults_are_within_limits() {
        let limits = VendorLimits::chromium();
        for source_type in [SourceType::Event, SourceType::Navigation] {
            let config = PrivacyConfig::default_for(source_type);
            let data = config
                .compute_config_data(14.0, limits.info_gain_max(source_type));
            assert!(limits.violations(source_type, &config, &data).is_empty());
        }
    }

    #[test]
    fn test_info_gain_violation() {
        let limits = VendorLimits::chromium();
        // Navigation defaults leak more than an event source may.
        let config = PrivacyConfig::default_for(SourceType::Navigation);
        let data = config.compute_config_data(14.0, 6.5);
        assert!(data.excessive.is_some());

        let violations = limits.violations(SourceType::Event, &config, &data);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            PolicyViolation::InfoGain { max, .. } if max == 6.5
        ));
        assert!(violations[0]
            .to_string()
            .starts_with("information gain: 11.46 exceeds"));
    }

    #[test]
    fn test_state_cardinality_violation() {
        let limits = VendorLimits::chromium();
        let config = PrivacyConfig::new(
            20,
            vec![PerTriggerDataConfig::new(5, 20).unwrap(); 32],
        );
        let data = config.compute_config_data(14.0, 11.5);
        let violations =
            limits.violations(SourceType::Navigation, &config, &data);
        assert!(matches!(
            violations[0],
            PolicyViolation::StateCardinality { max: u32::MAX, .. }
        ));
    }

    #[test]
    fn test_attribution_scope_violations() {
        let limits = VendorLimits::chromium();
        let config = PrivacyConfig::default_for(SourceType::Event)
            .with_attribution_scopes(AttributionScopes {
                limit: 20,
                max_event_states: 2,
            });
        let data = config.compute_config_data(14.0, 6.5);
        let violations = limits.violations(SourceType::Event, &config, &data);
        // 3 states > 2 max event states, and log2(3 + 2 * 19) < 6.5.
        assert_eq!(
            violations,
            vec![PolicyViolation::MaxEventStates {
                num_states: BigUint::from(3u32),
                max: 2,
            }]
        );

        let config = PrivacyConfig::default_for(SourceType::Navigation)
            .with_attribution_scopes(AttributionScopes {
                limit: 20,
                max_event_states: 1000,
            });
        let data = config.compute_config_data(14.0, 11.5);
        let violations =
            limits.violations(SourceType::Navigation, &config, &data);
        assert!(matches!(
            violations[..],
            [PolicyViolation::AttributionScopesInfoGain { .. }]
        ));
    }
}
