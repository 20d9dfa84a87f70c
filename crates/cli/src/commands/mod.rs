mod probe;
mod stress;

use anyhow::{Context, Result};
use hpi_runtime::ClientConfig;
use tracing::debug;

use crate::cli::{Cli, Commands, TargetArgs};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = resolve_config(&cli.target)?;
	debug!(target = "hpi", domain = %config.domain, "resolved client config");

	match cli.command {
		Commands::Probe => probe::run(&config),
		Commands::Stress(args) => stress::run(&config, args).await,
	}
}

/// Config file (or defaults), then environment, then command-line flags.
pub fn resolve_config(target: &TargetArgs) -> Result<ClientConfig> {
	let mut config = match &target.config {
		Some(path) => ClientConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
		None => ClientConfig::from_env().context("Invalid daemon environment")?,
	};

	if let Some(host) = &target.host {
		config.domain.set_host(host.clone());
	}
	if let Some(port) = target.port {
		config.domain.set_port(port);
	}
	if let Some(domain_id) = target.domain_id {
		config.domain.set_remote_domain_id(domain_id);
	}
	if let Some(ms) = target.connect_timeout_ms {
		config.connect_timeout_ms = ms;
	}

	config.validate().context("Invalid client config")?;
	Ok(config)
}

fn print_report<T: serde::Serialize>(report: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(report)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_override_config_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("client.json");
		std::fs::write(&path, r#"{"domain": {"host": "10.0.0.5", "port": 4743, "remoteDomainId": 1}}"#).unwrap();

		let target = TargetArgs {
			config: Some(path),
			port: Some(4800),
			domain_id: Some(2),
			..TargetArgs::default()
		};
		let config = resolve_config(&target).unwrap();

		assert_eq!(config.domain.port(), 4800);
		assert_eq!(config.domain.remote_domain_id(), 2);
	}

	#[test]
	fn zero_timeout_flag_is_rejected() {
		let target = TargetArgs {
			host: Some("localhost".to_string()),
			connect_timeout_ms: Some(0),
			..TargetArgs::default()
		};
		assert!(resolve_config(&target).is_err());
	}
}
