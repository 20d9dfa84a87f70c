use anyhow::Result;
use hpi_runtime::{ClientConfig, Session};
use serde::Serialize;
use tracing::info;

use super::print_report;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
	pub local_id: u64,
	pub host: String,
	pub port: u16,
	pub remote_domain_id: u32,
	pub connected: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub peer: Option<String>,
}

pub fn run(config: &ClientConfig) -> Result<()> {
	let report = probe(config)?;
	info!(target = "hpi", connected = report.connected, "probe finished");
	print_report(&report)
}

pub fn probe(config: &ClientConfig) -> Result<ProbeReport> {
	let session = Session::with_factory(&config.domain, config.marshal_factory());

	let peer = match session.acquire()? {
		Some(marshal) => {
			let peer = marshal.peer_addr().map(|addr| addr.to_string());
			session.release(marshal)?;
			Some(peer)
		}
		None => None,
	};
	session.close();

	let endpoint = session.endpoint();
	Ok(ProbeReport {
		local_id: session.local_id(),
		host: endpoint.host().to_string(),
		port: endpoint.port(),
		remote_domain_id: session.remote_domain_id(),
		connected: peer.is_some(),
		peer: peer.flatten(),
	})
}

#[cfg(test)]
mod tests {
	use std::net::TcpListener;

	use hpi_runtime::Domain;

	use super::*;

	#[test]
	fn probe_reports_peer_of_listening_daemon() {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		let config = ClientConfig {
			domain: Domain::new("127.0.0.1", port, 3),
			..ClientConfig::default()
		};

		let report = probe(&config).unwrap();
		assert!(report.connected);
		assert_eq!(report.peer, Some(format!("127.0.0.1:{port}")));
		assert_eq!(report.remote_domain_id, 3);
	}
}
