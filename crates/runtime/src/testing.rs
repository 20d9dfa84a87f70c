//! Testing infrastructure for hpi-runtime.
//!
//! Provides an in-memory [`MockDaemon`] that acts as a [`MarshalFactory`] and
//! records every open, reset, and close performed on the [`MockMarshal`]s it
//! creates, so pool behavior can be asserted without a running daemon.
//!
//! # Example
//!
//! ```ignore
//! use hpi_runtime::testing::MockDaemon;
//! use hpi_runtime::{Domain, Session};
//!
//! let daemon = MockDaemon::new();
//! let session = Session::with_factory(&Domain::new("10.0.0.5", 4743, 1), daemon.clone());
//! let marshal = session.acquire().unwrap().unwrap();
//! assert_eq!(daemon.open_count(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::marshal::{Marshal, MarshalFactory};

/// Something that happened to a mock marshal, tagged with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalEvent {
	Open { id: usize, host: String, port: u16, ok: bool },
	Reset { id: usize },
	Close { id: usize },
}

#[derive(Debug)]
struct DaemonState {
	next_id: AtomicUsize,
	accepting: AtomicBool,
	open_delay: Mutex<Option<Duration>>,
	events: Mutex<Vec<MarshalEvent>>,
}

/// Fake daemon endpoint and marshal factory.
///
/// Clones share state, so one handle can be given to a session while the
/// test keeps another for assertions.
#[derive(Debug, Clone)]
pub struct MockDaemon {
	state: Arc<DaemonState>,
}

impl Default for MockDaemon {
	fn default() -> Self {
		Self::new()
	}
}

impl MockDaemon {
	/// A daemon that accepts every connection.
	pub fn new() -> Self {
		Self {
			state: Arc::new(DaemonState {
				next_id: AtomicUsize::new(1),
				accepting: AtomicBool::new(true),
				open_delay: Mutex::new(None),
				events: Mutex::new(Vec::new()),
			}),
		}
	}

	/// A daemon that refuses every connection.
	pub fn refusing() -> Self {
		let daemon = Self::new();
		daemon.set_accepting(false);
		daemon
	}

	pub fn set_accepting(&self, accepting: bool) {
		self.state.accepting.store(accepting, Ordering::SeqCst);
	}

	/// Makes every `open` sleep first, to widen race windows.
	pub fn set_open_delay(&self, delay: Duration) {
		*self.state.open_delay.lock() = Some(delay);
	}

	pub fn events(&self) -> Vec<MarshalEvent> {
		self.state.events.lock().clone()
	}

	/// Every `(host, port)` passed to `open`, successful or not.
	pub fn opens(&self) -> Vec<(String, u16)> {
		self.state
			.events
			.lock()
			.iter()
			.filter_map(|e| match e {
				MarshalEvent::Open { host, port, .. } => Some((host.clone(), *port)),
				_ => None,
			})
			.collect()
	}

	pub fn open_count(&self) -> usize {
		self.opens().len()
	}

	pub fn reset_count(&self, id: usize) -> usize {
		self.state.events.lock().iter().filter(|e| matches!(e, MarshalEvent::Reset { id: i } if *i == id)).count()
	}

	pub fn closed_ids(&self) -> Vec<usize> {
		self.state
			.events
			.lock()
			.iter()
			.filter_map(|e| match e {
				MarshalEvent::Close { id } => Some(*id),
				_ => None,
			})
			.collect()
	}

	fn record(&self, event: MarshalEvent) {
		self.state.events.lock().push(event);
	}
}

impl MarshalFactory for MockDaemon {
	type Marshal = MockMarshal;

	fn create(&self) -> MockMarshal {
		MockMarshal {
			id: self.state.next_id.fetch_add(1, Ordering::SeqCst),
			daemon: self.clone(),
			open: false,
			dirty: false,
		}
	}
}

/// Marshal created by [`MockDaemon`].
#[derive(Debug)]
pub struct MockMarshal {
	id: usize,
	daemon: MockDaemon,
	open: bool,
	dirty: bool,
}

impl MockMarshal {
	/// Unique per daemon; distinguishes marshal instances in assertions.
	pub fn id(&self) -> usize {
		self.id
	}

	pub fn is_open(&self) -> bool {
		self.open
	}

	/// Simulates an exchange leaving state behind.
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}
}

impl Marshal for MockMarshal {
	fn open(&mut self, host: &str, port: u16) -> bool {
		let delay = *self.daemon.state.open_delay.lock();
		if let Some(delay) = delay {
			std::thread::sleep(delay);
		}

		self.open = self.daemon.state.accepting.load(Ordering::SeqCst);
		self.daemon.record(MarshalEvent::Open {
			id: self.id,
			host: host.to_string(),
			port,
			ok: self.open,
		});
		self.open
	}

	fn reset(&mut self) {
		self.dirty = false;
		self.daemon.record(MarshalEvent::Reset { id: self.id });
	}

	fn close(&mut self) {
		self.open = false;
		self.daemon.record(MarshalEvent::Close { id: self.id });
	}
}
