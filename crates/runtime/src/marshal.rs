//! Marshal - the connection a session hands out for one RPC exchange.
//!
//! A marshal is either open and usable or not (never opened, or failed to
//! open). Sessions only ever pool open marshals.

/// Transport endpoint to a single daemon address.
///
/// Implementations report failure to open through the return value, not a
/// panic or error type. `reset` and `close` are infallible.
pub trait Marshal: Send {
	/// Connect to `host:port`. Returns true when the marshal is usable.
	fn open(&mut self, host: &str, port: u16) -> bool;

	/// Clear per-exchange state while keeping the underlying transport.
	fn reset(&mut self);

	/// Release transport resources. No other call is valid afterwards.
	fn close(&mut self);
}

/// Creates unopened marshals for a session's pool misses.
pub trait MarshalFactory: Send + Sync {
	type Marshal: Marshal;

	fn create(&self) -> Self::Marshal;
}

impl<M, F> MarshalFactory for F
where
	M: Marshal,
	F: Fn() -> M + Send + Sync,
{
	type Marshal = M;

	fn create(&self) -> M {
		self()
	}
}
