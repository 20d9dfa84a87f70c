use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use hpi_runtime::{ClientConfig, MarshalFactory, Session};
use serde::Serialize;
use tracing::info;

use super::print_report;
use crate::cli::StressArgs;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StressReport {
	pub workers: usize,
	pub rounds: usize,
	pub exchanges: usize,
	pub unavailable: usize,
	/// Connections left idle in the pool, i.e. how many were ever opened.
	pub pooled: usize,
	pub elapsed_ms: u128,
}

pub async fn run(config: &ClientConfig, args: StressArgs) -> Result<()> {
	let session = Arc::new(Session::with_factory(&config.domain, config.marshal_factory()));
	let report = stress(session, args).await?;
	info!(target = "hpi", exchanges = report.exchanges, pooled = report.pooled, "stress finished");
	print_report(&report)
}

/// Runs `args.workers` blocking workers against one shared session.
pub async fn stress<F>(session: Arc<Session<F>>, args: StressArgs) -> Result<StressReport>
where
	F: MarshalFactory + 'static,
{
	let started = Instant::now();
	let rounds = args.rounds;

	let handles: Vec<_> = (0..args.workers)
		.map(|_| {
			let session = Arc::clone(&session);
			tokio::task::spawn_blocking(move || -> hpi_runtime::Result<(usize, usize)> {
				let (mut exchanges, mut unavailable) = (0, 0);
				for _ in 0..rounds {
					match session.acquire()? {
						Some(marshal) => {
							session.release(marshal)?;
							exchanges += 1;
						}
						None => unavailable += 1,
					}
				}
				Ok((exchanges, unavailable))
			})
		})
		.collect();

	let mut report = StressReport {
		workers: args.workers,
		rounds: args.rounds,
		..StressReport::default()
	};
	for handle in handles {
		let (exchanges, unavailable) = handle.await.context("Stress worker panicked")??;
		report.exchanges += exchanges;
		report.unavailable += unavailable;
	}

	report.pooled = session.pooled();
	report.elapsed_ms = started.elapsed().as_millis();
	session.close();

	Ok(report)
}
