//! SDK configuration
//!
//! Identifies the publisher account/property and tunes client behavior.
//! Build one explicitly with [`SdkConfig::new`] or from the environment
//! with [`SdkConfig::from_env`].

use std::time::Duration;

use url::Url;

use ccpa_domain::{CampaignEnv, DomainError, PropertyName, TargetingParams};

/// Default consent service base URL.
pub const DEFAULT_WRAPPER_API_URL: &str = "https://wrapper-api.sp-prod.net";

/// Default base URL of the hosted privacy manager.
pub const DEFAULT_PM_BASE_URL: &str = "https://ccpa-inapp-pm.sp-prod.net";

/// Default transport timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            var,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub account_id: i64,
    pub property_id: i64,
    pub property_name: PropertyName,
    /// Privacy manager id
    pub pm_id: String,
    pub campaign_env: CampaignEnv,
    pub targeting_params: TargetingParams,
    pub wrapper_api_url: Url,
    pub pm_base_url: Url,
    /// Purge persisted consent when a flow fails
    pub should_clean_consent_on_error: bool,
    pub request_timeout: Duration,
}

impl SdkConfig {
    /// Configuration with the production endpoints and default behavior.
    pub fn new(
        account_id: i64,
        property_id: i64,
        property_name: PropertyName,
        pm_id: impl Into<String>,
        campaign_env: CampaignEnv,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            account_id,
            property_id,
            property_name,
            pm_id: pm_id.into(),
            campaign_env,
            targeting_params: TargetingParams::new(),
            wrapper_api_url: parse_url("CCPA_WRAPPER_API_URL", DEFAULT_WRAPPER_API_URL)?,
            pm_base_url: parse_url("CCPA_PM_BASE_URL", DEFAULT_PM_BASE_URL)?,
            should_clean_consent_on_error: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn with_targeting_params(mut self, params: TargetingParams) -> Self {
        self.targeting_params = params;
        self
    }

    pub fn with_wrapper_api_url(mut self, url: Url) -> Self {
        self.wrapper_api_url = url;
        self
    }

    pub fn with_pm_base_url(mut self, url: Url) -> Self {
        self.pm_base_url = url;
        self
    }

    pub fn with_clean_consent_on_error(mut self, clean: bool) -> Self {
        self.should_clean_consent_on_error = clean;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from `CCPA_*` environment variables.
    ///
    /// Required: `CCPA_ACCOUNT_ID`, `CCPA_PROPERTY_ID`, `CCPA_PROPERTY_NAME`, `CCPA_PM_ID`.
    /// Optional overrides that fail to parse are logged and ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`SdkConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let account_id = required("CCPA_ACCOUNT_ID")?
            .parse::<i64>()
            .map_err(|e| ConfigError::invalid("CCPA_ACCOUNT_ID", e))?;
        let property_id = required("CCPA_PROPERTY_ID")?
            .parse::<i64>()
            .map_err(|e| ConfigError::invalid("CCPA_PROPERTY_ID", e))?;
        let property_name = PropertyName::new(required("CCPA_PROPERTY_NAME")?)
            .map_err(|e: DomainError| ConfigError::invalid("CCPA_PROPERTY_NAME", e))?;
        let pm_id = required("CCPA_PM_ID")?;

        let campaign_env = match lookup("CCPA_CAMPAIGN_ENV") {
            Some(val) => val
                .parse::<CampaignEnv>()
                .map_err(|e| ConfigError::invalid("CCPA_CAMPAIGN_ENV", e))?,
            None => CampaignEnv::default(),
        };

        let mut config = Self::new(account_id, property_id, property_name, pm_id, campaign_env)?;

        if let Some(val) = lookup("CCPA_TARGETING_PARAMS") {
            match serde_json::from_str::<TargetingParams>(&val) {
                Ok(params) => config.targeting_params = params,
                Err(e) => tracing::warn!(
                    error = %e,
                    "CCPA_TARGETING_PARAMS is not a JSON object of strings, ignoring"
                ),
            }
        }

        if let Some(val) = lookup("CCPA_WRAPPER_API_URL") {
            config.wrapper_api_url = parse_url("CCPA_WRAPPER_API_URL", &val)?;
        }

        if let Some(val) = lookup("CCPA_PM_BASE_URL") {
            config.pm_base_url = parse_url("CCPA_PM_BASE_URL", &val)?;
        }

        if let Some(val) = lookup("CCPA_CLEAN_ON_ERROR") {
            match val.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => config.should_clean_consent_on_error = true,
                "false" | "0" | "no" => config.should_clean_consent_on_error = false,
                _ => tracing::warn!(val = %val, "CCPA_CLEAN_ON_ERROR is not a boolean, ignoring"),
            }
        }

        if let Some(val) = lookup("CCPA_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    val = %val,
                    "CCPA_REQUEST_TIMEOUT_SECS is not a positive integer, ignoring"
                ),
            }
        }

        Ok(config)
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|e| ConfigError::invalid(var, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("CCPA_ACCOUNT_ID", "22"),
        ("CCPA_PROPERTY_ID", "7480"),
        ("CCPA_PROPERTY_NAME", "twosdks.demo"),
        ("CCPA_PM_ID", "5e6a7f997653402334162542"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = SdkConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.account_id, 22);
        assert_eq!(config.property_id, 7480);
        assert_eq!(config.property_name.as_str(), "twosdks.demo");
        assert_eq!(config.campaign_env, CampaignEnv::Public);
        assert!(config.targeting_params.is_empty());
        assert_eq!(config.wrapper_api_url.as_str(), "https://wrapper-api.sp-prod.net/");
        assert!(config.should_clean_consent_on_error);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_required_var() {
        let err = SdkConfig::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CCPA_PM_ID")));
    }

    #[test]
    fn test_invalid_account_id() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("CCPA_ACCOUNT_ID", "abc");
        let err = SdkConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CCPA_ACCOUNT_ID", .. }));
    }

    #[test]
    fn test_overrides_applied() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("CCPA_CAMPAIGN_ENV", "stage"),
            ("CCPA_TARGETING_PARAMS", r#"{"SDK_TYPE":"CCPA"}"#),
            ("CCPA_WRAPPER_API_URL", "http://localhost:9000"),
            ("CCPA_CLEAN_ON_ERROR", "false"),
            ("CCPA_REQUEST_TIMEOUT_SECS", "5"),
        ]);
        let config = SdkConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.campaign_env, CampaignEnv::Stage);
        assert_eq!(config.targeting_params.get("SDK_TYPE"), Some("CCPA"));
        assert_eq!(config.wrapper_api_url.as_str(), "http://localhost:9000/");
        assert!(!config.should_clean_consent_on_error);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_optional_values_ignored() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("CCPA_TARGETING_PARAMS", "[1,2]"),
            ("CCPA_CLEAN_ON_ERROR", "maybe"),
            ("CCPA_REQUEST_TIMEOUT_SECS", "0"),
        ]);
        let config = SdkConfig::from_lookup(lookup(&vars)).unwrap();

        assert!(config.targeting_params.is_empty());
        assert!(config.should_clean_consent_on_error);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
