#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Root CLI for hpi-pool.
#[derive(Parser, Debug)]
#[command(name = "hpi-pool")]
#[command(about = "Exercise HPI session connection pools against a daemon")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug pool traffic, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(flatten)]
	pub target: TargetArgs,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Open one session, acquire a connection, and report the result.
	Probe,
	/// Hammer one session's pool from many workers.
	Stress(StressArgs),
}

/// Which daemon to talk to. Flags override the config file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
	/// JSON client config file.
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Daemon host (overrides OPENHPI_DAEMON_HOST).
	#[arg(long, global = true, value_name = "HOST")]
	pub host: Option<String>,

	/// Daemon port (overrides OPENHPI_DAEMON_PORT).
	#[arg(long, global = true, value_name = "PORT")]
	pub port: Option<u16>,

	/// Remote domain id.
	#[arg(long, global = true, value_name = "ID")]
	pub domain_id: Option<u32>,

	/// Connect timeout in milliseconds.
	#[arg(long, global = true, value_name = "MS")]
	pub connect_timeout_ms: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
	/// Concurrent workers sharing the session.
	#[arg(long, short = 'w', default_value_t = 8)]
	pub workers: usize,

	/// Acquire/release rounds per worker.
	#[arg(long, short = 'r', default_value_t = 100)]
	pub rounds: usize,
}
