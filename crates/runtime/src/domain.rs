//! Remote endpoint descriptor for an HPI daemon.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Port the HPI daemon listens on unless configured otherwise.
pub const DEFAULT_DAEMON_PORT: u16 = 4743;

/// Host used when no daemon host is configured.
pub const DEFAULT_DAEMON_HOST: &str = "localhost";

/// Where a daemon lives and which of its domains a session talks to.
///
/// A [`Session`](crate::Session) clones the descriptor it is built from, so
/// later changes to the caller's value never reach an existing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
	host: String,
	#[serde(default = "default_port")]
	port: u16,
	#[serde(default)]
	remote_domain_id: u32,
}

fn default_port() -> u16 {
	DEFAULT_DAEMON_PORT
}

impl Domain {
	pub fn new(host: impl Into<String>, port: u16, remote_domain_id: u32) -> Self {
		Self {
			host: host.into(),
			port,
			remote_domain_id,
		}
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	/// Domain id as known to the daemon.
	pub fn remote_domain_id(&self) -> u32 {
		self.remote_domain_id
	}

	pub fn set_host(&mut self, host: impl Into<String>) {
		self.host = host.into();
	}

	pub fn set_port(&mut self, port: u16) {
		self.port = port;
	}

	pub fn set_remote_domain_id(&mut self, id: u32) {
		self.remote_domain_id = id;
	}
}

impl Default for Domain {
	fn default() -> Self {
		Self::new(DEFAULT_DAEMON_HOST, DEFAULT_DAEMON_PORT, 0)
	}
}

impl fmt::Display for Domain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{} (domain {})", self.host, self.port, self.remote_domain_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_with_default_port() {
		let domain: Domain = serde_json::from_str(r#"{"host": "10.0.0.5", "remoteDomainId": 1}"#).unwrap();
		assert_eq!(domain.host(), "10.0.0.5");
		assert_eq!(domain.port(), DEFAULT_DAEMON_PORT);
		assert_eq!(domain.remote_domain_id(), 1);
	}

	#[test]
	fn display_names_endpoint_and_domain() {
		let domain = Domain::new("hpi.example", 4800, 3);
		assert_eq!(domain.to_string(), "hpi.example:4800 (domain 3)");
	}
}
