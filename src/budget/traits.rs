use crate::{
    budget::config::{ConfigData, PrivacyConfig},
    errors::ConfigError,
};

/// Anything whose event-level output space can be described by a
/// [`PrivacyConfig`], and therefore be charged for its information gain.
pub trait StateSpace {
    /// Returns the report cap and per-trigger-data window and bucket counts.
    fn privacy_config(&self) -> Result<PrivacyConfig, ConfigError>;

    /// Privacy accounting at `epsilon`, see
    /// [`PrivacyConfig::compute_config_data`].
    fn config_data(
        &self,
        epsilon: f64,
        info_gain_max: f64,
    ) -> Result<ConfigData, ConfigError> {
        let config = self.privacy_config()?;
        Ok(config.compute_config_data(epsilon, info_gain_max))
    }
}

impl StateSpace for PrivacyConfig {
    fn privacy_config(&self) -> Result<PrivacyConfig, ConfigError> {
        Ok(self.clone())
    }
}
