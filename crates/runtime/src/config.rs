//! Client configuration: which daemon to talk to and how to connect.
//!
//! Loaded from JSON, then overridden by `OPENHPI_DAEMON_HOST` and
//! `OPENHPI_DAEMON_PORT` when set.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::transport::{DEFAULT_CONNECT_TIMEOUT, Keepalive, TcpMarshalFactory, TcpOptions};

pub const ENV_DAEMON_HOST: &str = "OPENHPI_DAEMON_HOST";
pub const ENV_DAEMON_PORT: &str = "OPENHPI_DAEMON_PORT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
	pub domain: Domain,
	pub connect_timeout_ms: u64,
	/// Read/write timeout on daemon sockets. Absent means no timeout.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub io_timeout_ms: Option<u64>,
	pub nodelay: bool,
	/// TCP keepalive probes on daemon sockets. Absent leaves them off.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keepalive: Option<KeepaliveConfig>,
}

/// Keepalive settings as they appear in the config file, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepaliveConfig {
	pub time_secs: u64,
	pub interval_secs: u64,
	pub probes: u32,
}

impl KeepaliveConfig {
	pub fn to_keepalive(self) -> Keepalive {
		Keepalive {
			time: Duration::from_secs(self.time_secs),
			interval: Duration::from_secs(self.interval_secs),
			retries: self.probes,
		}
	}
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			domain: Domain::default(),
			connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
			io_timeout_ms: None,
			nodelay: true,
			keepalive: None,
		}
	}
}

impl ClientConfig {
	/// Defaults plus environment overrides.
	pub fn from_env() -> Result<Self> {
		Self::default().with_env_overrides()
	}

	pub fn from_json_str(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads a JSON config file and applies environment overrides.
	pub fn load(path: &Path) -> Result<Self> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_json_str(&contents)?.with_env_overrides()
	}

	pub fn with_env_overrides(self) -> Result<Self> {
		self.with_overrides(|key| std::env::var(key).ok())
	}

	/// Applies overrides from `lookup`, keyed by environment variable name.
	pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		if let Some(host) = lookup(ENV_DAEMON_HOST).filter(|h| !h.trim().is_empty()) {
			self.domain.set_host(host.trim());
		}
		if let Some(port) = lookup(ENV_DAEMON_PORT) {
			let port = port
				.trim()
				.parse::<u16>()
				.map_err(|e| Error::InvalidConfig(format!("{ENV_DAEMON_PORT}={port:?}: {e}")))?;
			self.domain.set_port(port);
		}
		self.validate()?;
		Ok(self)
	}

	pub fn validate(&self) -> Result<()> {
		if self.domain.host().trim().is_empty() {
			return Err(Error::InvalidConfig("daemon host is empty".to_string()));
		}
		if self.domain.port() == 0 {
			return Err(Error::InvalidConfig("daemon port must be non-zero".to_string()));
		}
		if self.connect_timeout_ms == 0 {
			return Err(Error::InvalidConfig("connectTimeoutMs must be non-zero".to_string()));
		}
		if self.io_timeout_ms == Some(0) {
			return Err(Error::InvalidConfig(
				"ioTimeoutMs must be non-zero; omit it to disable the timeout".to_string(),
			));
		}
		if self.keepalive.is_some_and(|k| k.time_secs == 0 || k.interval_secs == 0 || k.probes == 0) {
			return Err(Error::InvalidConfig(
				"keepalive timeSecs, intervalSecs and probes must be non-zero".to_string(),
			));
		}
		Ok(())
	}

	pub fn tcp_options(&self) -> TcpOptions {
		TcpOptions {
			connect_timeout: Duration::from_millis(self.connect_timeout_ms),
			io_timeout: self.io_timeout_ms.map(Duration::from_millis),
			nodelay: self.nodelay,
			keepalive: self.keepalive.map(KeepaliveConfig::to_keepalive),
		}
	}

	pub fn marshal_factory(&self) -> TcpMarshalFactory {
		TcpMarshalFactory::new(self.tcp_options())
	}
}
