use std::time::Duration;

use clap::Parser;

use crate::client::lystio::DEFAULT_API_URL;
use crate::client::{LystioClient, MapboxGeocoder};
use crate::error::ApiResult;

/// Upstream endpoints and client settings
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Base url of the marketplace API
    #[arg(long = "api-url", env = "LYSTIO_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Mapbox access token; place typeahead is unavailable without it
    #[arg(long = "mapbox-token", env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long = "timeout-secs", value_name = "secs", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_client(&self) -> ApiResult<LystioClient> {
        LystioClient::with_base_url(&self.api_url, self.timeout())
    }

    /// `None` when no Mapbox token is configured.
    pub fn geocoder(&self) -> Option<ApiResult<MapboxGeocoder>> {
        self.mapbox_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| MapboxGeocoder::new(token, self.timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_override_defaults() {
        let config = Config::try_parse_from([
            "estate-scout",
            "--api-url",
            "http://localhost:9000",
            "--timeout-secs",
            "5",
            "--mapbox-token",
            "pk.test",
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.geocoder().is_some());
        assert_eq!(
            config.search_client().unwrap().base_url(),
            "http://localhost:9000"
        );
    }

    #[test]
    fn empty_token_disables_geocoder() {
        let config = Config {
            api_url: DEFAULT_API_URL.to_string(),
            mapbox_token: Some(String::new()),
            timeout_secs: 30,
        };
        assert!(config.geocoder().is_none());
    }
}
