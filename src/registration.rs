//! Minimal reader for `Attribution-Reporting-Register-Source` JSON bodies.
//!
//! Only the fields that shape the event-level output space are read, and
//! only as far as needed to count windows and buckets. The registration is
//! assumed to have been validated already.

use anyhow::Context;
use serde::Deserialize;

use crate::{
    budget::config::{AttributionScopes, PerTriggerDataConfig, PrivacyConfig},
    constants::DEFAULT_MAX_EVENT_STATES,
    source_type::SourceType,
};

#[derive(Debug, Deserialize)]
struct EventReportWindows {
    end_times: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct TriggerSpecJson {
    trigger_data: Vec<u32>,
    event_report_windows: Option<EventReportWindows>,
    summary_buckets: Option<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
struct AttributionScopesJson {
    limit: u32,
    #[serde(default = "default_max_event_states")]
    max_event_states: u32,
}

fn default_max_event_states() -> u32 {
    DEFAULT_MAX_EVENT_STATES
}

#[derive(Debug, Deserialize)]
struct SourceRegistration {
    max_event_level_reports: Option<u32>,
    event_report_windows: Option<EventReportWindows>,
    trigger_specs: Option<Vec<TriggerSpecJson>>,
    attribution_scopes: Option<AttributionScopesJson>,
}

fn num_windows(windows: Option<&EventReportWindows>, default: u32) -> u32 {
    windows.map_or(default, |w| {
        u32::try_from(w.end_times.len()).unwrap_or(u32::MAX)
    })
}

/// Builds the privacy configuration of a JSON source registration, falling
/// back to the defaults of `source_type` for missing fields.
pub fn privacy_config_from_json(
    json: &str,
    source_type: SourceType,
) -> Result<PrivacyConfig, anyhow::Error> {
    let registration: SourceRegistration =
        serde_json::from_str(json).context("Malformed source registration")?;

    let max_event_level_reports = registration
        .max_event_level_reports
        .unwrap_or_else(|| source_type.default_max_event_level_reports());

    let top_level_windows = num_windows(
        registration.event_report_windows.as_ref(),
        source_type.default_num_windows(),
    );

    let mut per_trigger_data = vec![];
    match &registration.trigger_specs {
        Some(specs) => {
            for spec in specs {
                let windows = num_windows(
                    spec.event_report_windows.as_ref(),
                    top_level_windows,
                );
                // Technically this can be larger, but we will always be
                // constrained by `max_event_level_reports`.
                let buckets = spec.summary_buckets.as_ref().map_or(
                    max_event_level_reports,
                    |b| u32::try_from(b.len()).unwrap_or(u32::MAX),
                );
                let config = PerTriggerDataConfig::new(windows, buckets)
                    .with_context(|| {
                        format!("Invalid trigger spec {:?}", spec.trigger_data)
                    })?;
                per_trigger_data.extend(
                    std::iter::repeat(config).take(spec.trigger_data.len()),
                );
            }
        }
        None => {
            let config = PerTriggerDataConfig::new(
                top_level_windows,
                max_event_level_reports,
            )
            .context("Invalid top-level event report windows")?;
            per_trigger_data.extend(
                std::iter::repeat(config)
                    .take(source_type.default_trigger_data_cardinality()),
            );
        }
    }

    let mut config = PrivacyConfig::new(max_event_level_reports, per_trigger_data);
    if let Some(scopes) = registration.attribution_scopes {
        config = config.with_attribution_scopes(AttributionScopes {
            limit: scopes.limit,
            max_event_states: scopes.max_event_states,
        });
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;

    #[test]
    fn test_empty_registration_uses_defaults() {
        for source_type in [SourceType::Event, SourceType::Navigation] {
            let config = privacy_config_from_json("{}", source_type).unwrap();
            assert_eq!(config, PrivacyConfig::default_for(source_type));
        }
    }

    #[test]
    fn test_trigger_specs() {
        let json = r#"{
            "max_event_level_reports": 2,
            "event_report_windows": {"end_times": [3600, 86400]},
            "trigger_specs": [
                {"trigger_data": [0, 1, 2]},
                {
                    "trigger_data": [7],
                    "event_report_windows": {"start_time": 0, "end_times": [86400]},
                    "summary_buckets": [1, 5, 10]
                }
            ]
        }"#;
        let config =
            privacy_config_from_json(json, SourceType::Navigation).unwrap();

        assert_eq!(config.max_event_level_reports, 2);
        let pairs: Vec<_> = config
            .per_trigger_data
            .iter()
            .map(|c| (c.num_windows, c.num_summary_buckets))
            .collect();
        assert_eq!(pairs, vec![(2, 2), (2, 2), (2, 2), (1, 3)]);
        assert_eq!(config.attribution_scopes, None);
    }

    #[test]
    fn test_attribution_scopes() {
        let json = r#"{
            "attribution_scopes": {"limit": 3, "values": ["a", "b"]}
        }"#;
        let config = privacy_config_from_json(json, SourceType::Event).unwrap();
        assert_eq!(
            config.attribution_scopes,
            Some(AttributionScopes {
                limit: 3,
                max_event_states: DEFAULT_MAX_EVENT_STATES,
            })
        );
        assert_eq!(config.num_states(), BigUint::from(3u32));
    }

    #[test]
    fn test_invalid_registrations() {
        assert!(privacy_config_from_json("[]", SourceType::Event).is_err());
        assert!(privacy_config_from_json(
            r#"{"trigger_specs": [{"trigger_data": [0], "event_report_windows": {"end_times": []}}]}"#,
            SourceType::Event
        )
        .is_err());
    }
}
