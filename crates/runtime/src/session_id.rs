//! Process-wide allocation of local session ids.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing session ids.
///
/// Ids start at 1; 0 is reserved to mean "unassigned", which is also the
/// initial value of a session's remote id. Overflow would need 2^64
/// allocations and wraps silently.
#[derive(Debug, Default)]
pub struct SessionIdAllocator {
	last: AtomicU64,
}

static GLOBAL: SessionIdAllocator = SessionIdAllocator::new();

impl SessionIdAllocator {
	pub const fn new() -> Self {
		Self {
			last: AtomicU64::new(0),
		}
	}

	/// Allocator whose first id is `last + 1`.
	pub const fn starting_after(last: u64) -> Self {
		Self {
			last: AtomicU64::new(last),
		}
	}

	/// The allocator shared by every session that was not given its own.
	pub fn global() -> &'static SessionIdAllocator {
		&GLOBAL
	}

	/// Allocate the next id.
	pub fn next(&self) -> u64 {
		self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
	}

	/// Most recently allocated id, or 0 if none yet.
	pub fn last(&self) -> u64 {
		self.last.load(Ordering::Relaxed)
	}
}
