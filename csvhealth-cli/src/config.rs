//! Analysis endpoint configuration.

use crate::CliResult;
use clap::Args;
use std::time::Duration;

/// Base URL used when neither the flag nor the environment provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Path of the analysis endpoint relative to the base URL.
pub const ANALYZE_PATH: &str = "/analyze_dataset/";

/// CLI arguments for reaching the analysis service.
#[derive(Args, Clone, Debug)]
pub struct ApiArgs {
    /// Base URL of the analysis service.
    #[arg(long, env = "CSVHEALTH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Seconds to wait for the analysis before giving up.
    #[arg(long, env = "CSVHEALTH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Resolved settings for the analysis client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Validate and normalize client settings.
    pub fn new(base_url: &str, timeout: Duration) -> CliResult<Self> {
        if timeout.is_zero() {
            return Err("timeout must be greater than zero".into());
        }
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }

    /// Build settings from parsed CLI arguments.
    pub fn from_args(args: &ApiArgs) -> CliResult<Self> {
        Self::new(&args.api_url, Duration::from_secs(args.timeout_secs))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the analysis endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{ANALYZE_PATH}", self.base_url)
    }
}

/// Normalize the base URL for consistent API requests.
fn normalize_base_url(base_url: &str) -> CliResult<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err("api url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        let url = normalize_base_url("http://localhost:8000/").expect("url");
        assert_eq!(url, "http://localhost:8000");
    }

    #[test]
    fn normalize_base_url_rejects_empty() {
        let err = normalize_base_url("   ").unwrap_err();
        assert!(err.to_string().contains("api url"));
    }

    #[test]
    fn endpoint_appends_analysis_path() {
        let timeout = Duration::from_secs(5);
        let url = "https://analysis.example.com/api/";
        let config = ClientConfig::new(url, timeout).expect("config");
        assert_eq!(config.base_url(), "https://analysis.example.com/api");
        assert_eq!(
            config.endpoint(),
            "https://analysis.example.com/api/analyze_dataset/"
        );
        assert_eq!(config.timeout(), timeout);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::new(DEFAULT_API_URL, Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn from_args_uses_seconds() {
        let args = ApiArgs {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        let config = ClientConfig::from_args(&args).expect("config");
        assert_eq!(config.endpoint(), "http://localhost:8000/analyze_dataset/");
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }
}
