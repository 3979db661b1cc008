//! Application settings loaded via OrthoConfig.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_APP_NAME: &str = "API";
const DEFAULT_HOST_ADDRESS: &str = "0.0.0.0";
const DEFAULT_BIND_PORT: u16 = 5000;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `host_address` is not an IP address.
    #[error("invalid host address {value:?}: {message}")]
    HostAddress { value: String, message: String },
    /// A webhook URL does not parse.
    #[error("invalid {setting} {value:?}: {message}")]
    Url {
        setting: &'static str,
        value: String,
        message: String,
    },
}

/// Server, database and webhook settings.
///
/// Every field may be supplied as an `IMAGING_*` environment variable or the
/// matching command-line flag.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IMAGING")]
pub struct AppSettings {
    /// Name reported in startup logs.
    pub app_name: Option<String>,
    /// Raise the default log level to `debug`.
    #[ortho_config(default = false)]
    pub debug_mode: bool,
    /// Interface to listen on.
    pub host_address: Option<String>,
    /// Port to listen on.
    pub bind_port: Option<u16>,
    /// PostgreSQL connection string; records stay in memory when unset.
    pub db_uri: Option<String>,
    /// Camera interface base URL; a fixture camera is used when unset.
    pub camera_interface_url: Option<String>,
    /// Analyzer endpoint; a fixture analyzer is used when unset.
    pub analyzer_url: Option<String>,
    /// Per-request timeout for both webhooks, in seconds.
    pub webhook_timeout_secs: Option<u64>,
}

impl AppSettings {
    /// Return the configured application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    /// Resolve the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::HostAddress`] if the host is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host_address.as_deref().unwrap_or(DEFAULT_HOST_ADDRESS);
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::HostAddress {
                value: host.to_owned(),
                message: err.to_string(),
            })?;
        Ok(SocketAddr::new(
            ip,
            self.bind_port.unwrap_or(DEFAULT_BIND_PORT),
        ))
    }

    /// Return the database URL, treating a blank value as unset.
    #[must_use]
    pub fn db_uri(&self) -> Option<&str> {
        self.db_uri.as_deref().map(str::trim).filter(|uri| !uri.is_empty())
    }

    /// Parse the camera interface base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] if the value is not a URL.
    pub fn camera_interface_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("camera_interface_url", self.camera_interface_url.as_deref())
    }

    /// Parse the analyzer endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] if the value is not a URL.
    pub fn analyzer_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("analyzer_url", self.analyzer_url.as_deref())
    }

    /// Per-request webhook timeout.
    #[must_use]
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(
            self.webhook_timeout_secs
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        )
    }
}

fn parse_url(setting: &'static str, value: Option<&str>) -> Result<Option<Url>, SettingsError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    Url::parse(raw).map(Some).map_err(|err| SettingsError::Url {
        setting,
        value: raw.to_owned(),
        message: err.to_string(),
    })
}
