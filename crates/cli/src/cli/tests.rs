use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_probe_with_target_flags() {
	let args = vec!["hpi-pool", "probe", "--host", "10.0.0.5", "--port", "4743", "--domain-id", "1"];
	let cli = Cli::try_parse_from(args).unwrap();

	assert!(matches!(cli.command, Commands::Probe));
	assert_eq!(cli.target.host.as_deref(), Some("10.0.0.5"));
	assert_eq!(cli.target.port, Some(4743));
	assert_eq!(cli.target.domain_id, Some(1));
}

#[test]
fn parse_stress_defaults() {
	let cli = Cli::try_parse_from(["hpi-pool", "stress"]).unwrap();

	match cli.command {
		Commands::Stress(args) => {
			assert_eq!(args.workers, 8);
			assert_eq!(args.rounds, 100);
		}
		_ => panic!("Expected Stress command"),
	}
}

#[test]
fn parse_verbosity_and_config() {
	let cli = Cli::try_parse_from(["hpi-pool", "-vv", "stress", "-w", "2", "--config", "/etc/hpi/client.json"]).unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.target.config, Some(PathBuf::from("/etc/hpi/client.json")));
}

#[test]
fn rejects_invalid_port() {
	assert!(Cli::try_parse_from(["hpi-pool", "probe", "--port", "70000"]).is_err());
}
