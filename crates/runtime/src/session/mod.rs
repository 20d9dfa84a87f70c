//! Session - a logical HPI session and its pool of idle marshals.
//!
//! # Pool discipline
//!
//! 1. `acquire` pops the most recently released marshal (LIFO) and resets it
//!    while still holding the pool lock, so no two callers can take the
//!    same marshal
//! 2. On a pool miss a new marshal is created and opened with the lock
//!    released; concurrent misses may each open their own connection
//! 3. `release` resets the marshal first, then pushes it back under the lock
//! 4. `close` drains and closes every idle marshal and marks the session
//!    closed; marshals still checked out are closed when they come back
//!
//! A closed session still answers `acquire`: the pool is empty, so a new
//! connection is opened. That marshal is closed instead of pooled on release.
//!
//! # Example
//!
//! ```no_run
//! # use hpi_runtime::{Domain, Session};
//! # fn main() -> hpi_runtime::Result<()> {
//! let session = Session::new(&Domain::new("10.0.0.5", 4743, 1));
//!
//! if let Some(marshal) = session.acquire()? {
//!     // ... perform one RPC exchange ...
//!     session.release(marshal)?;
//! }
//!
//! session.close();
//! # Ok(())
//! # }
//! ```

mod builder;
mod lease;

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

pub use builder::SessionBuilder;
pub use lease::MarshalLease;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::marshal::{Marshal, MarshalFactory};
use crate::transport::TcpMarshalFactory;

/// Pool state guarded by the session mutex.
struct Pool<M> {
	/// Idle marshals, most recently released last.
	idle: Vec<M>,
	/// Marshals handed out and not yet released.
	outstanding: usize,
	closed: bool,
}

/// A client session bound to one daemon domain.
///
/// Thread-safe: share it behind an `Arc` and call [`acquire`](Self::acquire)
/// and [`release`](Self::release) from any number of threads.
pub struct Session<F: MarshalFactory = TcpMarshalFactory> {
	local_id: u64,
	remote_id: AtomicU32,
	domain: Domain,
	factory: F,
	pool: Mutex<Pool<F::Marshal>>,
}

impl Session {
	/// Creates a session that opens TCP marshals with default options.
	pub fn new(domain: &Domain) -> Self {
		SessionBuilder::new(domain).build()
	}

	/// Starts a [`SessionBuilder`] for `domain`, to swap the marshal factory or
	/// the id allocator before building.
	pub fn builder(domain: &Domain) -> SessionBuilder {
		SessionBuilder::new(domain)
	}
}

impl<F: MarshalFactory> Session<F> {
	/// Creates a session that obtains new marshals from `factory`.
	pub fn with_factory(domain: &Domain, factory: F) -> Self {
		SessionBuilder::new(domain).factory(factory).build()
	}

	fn from_parts(local_id: u64, domain: Domain, factory: F) -> Self {
		debug!(local_id, %domain, "Created session");
		Self {
			local_id,
			remote_id: AtomicU32::new(0),
			domain,
			factory,
			pool: Mutex::new(Pool {
				idle: Vec::new(),
				outstanding: 0,
				closed: false,
			}),
		}
	}

	/// Takes a marshal ready for one RPC exchange.
	///
	/// Returns `Ok(None)` when the pool was empty and a new connection could
	/// not be opened. No retry is attempted. After [`close`](Self::close) the
	/// pool stays empty, so every call opens a new connection.
	pub fn acquire(&self) -> Result<Option<F::Marshal>> {
		{
			let mut pool = self.pool.lock();
			pool.outstanding += 1;

			if let Some(mut marshal) = pool.idle.pop() {
				marshal.reset();
				debug!(local_id = self.local_id, idle = pool.idle.len(), "Reusing pooled marshal");
				return Ok(Some(marshal));
			}
		}

		let mut marshal = self.factory.create();
		if !marshal.open(self.domain.host(), self.domain.port()) {
			let mut pool = self.pool.lock();
			pool.outstanding = pool.outstanding.saturating_sub(1);
			warn!(
				local_id = self.local_id,
				host = self.domain.host(),
				port = self.domain.port(),
				"No marshal available: open failed"
			);
			return Ok(None);
		}

		let pool = self.pool.lock();
		marshal.reset();
		debug!(
			local_id = self.local_id,
			outstanding = pool.outstanding,
			closed = pool.closed,
			"Opened new marshal"
		);

		Ok(Some(marshal))
	}

	/// Like [`acquire`](Self::acquire), but the marshal goes back to the pool
	/// when the returned lease is dropped.
	pub fn lease(&self) -> Result<Option<MarshalLease<'_, F>>> {
		Ok(self.acquire()?.map(|marshal| MarshalLease::new(self, marshal)))
	}

	/// Returns a marshal obtained from [`acquire`](Self::acquire) to the pool.
	///
	/// Ownership is not checked: passing a marshal from another session
	/// pools it here.
	///
	/// # Errors
	///
	/// Returns [`Error::SessionClosed`] if the session was closed; the
	/// marshal is closed instead of pooled.
	pub fn release(&self, mut marshal: F::Marshal) -> Result<()> {
		marshal.reset();

		let mut pool = self.pool.lock();
		pool.outstanding = pool.outstanding.saturating_sub(1);
		if pool.closed {
			drop(pool);
			debug!(local_id = self.local_id, "Closing marshal released after session close");
			marshal.close();
			return Err(self.closed_error());
		}
		pool.idle.push(marshal);

		Ok(())
	}

	/// Closes every idle marshal and marks the session closed.
	///
	/// Returns the number of marshals closed. Marshals checked out by other
	/// callers are not touched here; they are closed when released. Calling
	/// `close` again is a no-op returning 0.
	pub fn close(&self) -> usize {
		let mut pool = self.pool.lock();
		if pool.closed {
			return 0;
		}
		pool.closed = true;

		let mut closed = 0;
		while let Some(mut marshal) = pool.idle.pop() {
			marshal.close();
			closed += 1;
		}

		debug!(local_id = self.local_id, closed, "Closed session");
		if pool.outstanding > 0 {
			warn!(
				local_id = self.local_id,
				outstanding = pool.outstanding,
				"Session closed with marshals still checked out"
			);
		}

		closed
	}

	pub fn local_id(&self) -> u64 {
		self.local_id
	}

	/// Session id assigned by the daemon, or 0 before the handshake.
	pub fn remote_id(&self) -> u32 {
		self.remote_id.load(Ordering::Acquire)
	}

	/// Records the daemon-assigned session id.
	pub fn set_remote_id(&self, remote_id: u32) {
		let previous = self.remote_id.swap(remote_id, Ordering::AcqRel);
		if previous != 0 && previous != remote_id {
			debug!(local_id = self.local_id, previous, remote_id, "Remote session id replaced");
		}
	}

	pub fn remote_domain_id(&self) -> u32 {
		self.domain.remote_domain_id()
	}

	/// This session's private copy of the endpoint descriptor.
	pub fn endpoint(&self) -> &Domain {
		&self.domain
	}

	/// Number of idle marshals in the pool.
	pub fn pooled(&self) -> usize {
		self.pool.lock().idle.len()
	}

	/// Number of marshals handed out and not yet released.
	pub fn outstanding(&self) -> usize {
		self.pool.lock().outstanding
	}

	pub fn is_closed(&self) -> bool {
		self.pool.lock().closed
	}

	fn closed_error(&self) -> Error {
		Error::SessionClosed { local_id: self.local_id }
	}
}

impl<F: MarshalFactory> Drop for Session<F> {
	fn drop(&mut self) {
		self.close();
	}
}

impl<F: MarshalFactory> fmt::Debug for Session<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let pool = self.pool.lock();
		f.debug_struct("Session")
			.field("local_id", &self.local_id)
			.field("remote_id", &self.remote_id())
			.field("domain", &self.domain)
			.field("idle", &pool.idle.len())
			.field("outstanding", &pool.outstanding)
			.field("closed", &pool.closed)
			.finish()
	}
}
