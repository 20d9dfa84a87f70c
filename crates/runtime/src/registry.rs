//! Table of live sessions keyed by local session id.
//!
//! Uses [`DashMap`] so lookups from RPC call sites never contend with
//! session creation on other threads.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::marshal::MarshalFactory;
use crate::session::{Session, SessionBuilder};
use crate::session_id::SessionIdAllocator;
use crate::transport::TcpMarshalFactory;

/// Registry of open sessions sharing one marshal factory.
pub struct SessionRegistry<F: MarshalFactory + Clone = TcpMarshalFactory> {
	sessions: DashMap<u64, Arc<Session<F>>>,
	factory: F,
	allocator: Option<Arc<SessionIdAllocator>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::with_factory(TcpMarshalFactory::default())
	}
}

impl Default for SessionRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: MarshalFactory + Clone> SessionRegistry<F> {
	pub fn with_factory(factory: F) -> Self {
		Self {
			sessions: DashMap::new(),
			factory,
			allocator: None,
		}
	}

	/// Draw session ids from `allocator` instead of the process-wide one.
	pub fn with_allocator(mut self, allocator: Arc<SessionIdAllocator>) -> Self {
		self.allocator = Some(allocator);
		self
	}

	/// Creates and registers a session bound to `domain`.
	pub fn create(&self, domain: &Domain) -> Arc<Session<F>> {
		let mut builder = SessionBuilder::new(domain).factory(self.factory.clone());
		if let Some(allocator) = &self.allocator {
			builder = builder.allocator(Arc::clone(allocator));
		}

		let session = Arc::new(builder.build());
		self.sessions.insert(session.local_id(), Arc::clone(&session));
		tracing::debug!(local_id = session.local_id(), sessions = self.sessions.len(), "Registered session");
		session
	}

	pub fn get(&self, local_id: u64) -> Result<Arc<Session<F>>> {
		self.sessions.get(&local_id).map(|entry| Arc::clone(entry.value())).ok_or(Error::SessionNotFound(local_id))
	}

	/// Unregisters a session and closes its pool.
	pub fn remove(&self, local_id: u64) -> Result<Arc<Session<F>>> {
		let (_, session) = self.sessions.remove(&local_id).ok_or(Error::SessionNotFound(local_id))?;
		session.close();
		Ok(session)
	}

	/// Finds the session the daemon knows as `remote_id` within `remote_domain_id`.
	pub fn find_remote(&self, remote_domain_id: u32, remote_id: u32) -> Option<Arc<Session<F>>> {
		self.sessions
			.iter()
			.find(|entry| entry.remote_domain_id() == remote_domain_id && entry.remote_id() == remote_id)
			.map(|entry| Arc::clone(entry.value()))
	}

	/// Local ids of all registered sessions, ascending.
	pub fn ids(&self) -> Vec<u64> {
		let mut ids: Vec<u64> = self.sessions.iter().map(|entry| *entry.key()).collect();
		ids.sort_unstable();
		ids
	}

	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}

	/// Unregisters and closes every session. Returns how many were closed.
	pub fn close_all(&self) -> usize {
		let mut closed = 0;
		for local_id in self.ids() {
			if self.remove(local_id).is_ok() {
				closed += 1;
			}
		}
		tracing::debug!(closed, "Closed all sessions");
		closed
	}
}
