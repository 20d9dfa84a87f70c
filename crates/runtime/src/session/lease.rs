use std::fmt;
use std::ops::{Deref, DerefMut};

use super::Session;
use crate::marshal::MarshalFactory;

/// RAII guard over an acquired marshal.
///
/// Dereferences to the marshal and returns it to the session pool on drop.
pub struct MarshalLease<'a, F: MarshalFactory> {
	session: &'a Session<F>,
	marshal: Option<F::Marshal>,
}

impl<'a, F: MarshalFactory> MarshalLease<'a, F> {
	pub(super) fn new(session: &'a Session<F>, marshal: F::Marshal) -> Self {
		Self {
			session,
			marshal: Some(marshal),
		}
	}

	/// Takes the marshal out of the lease without returning it to the pool.
	///
	/// The session keeps counting it as checked out until it is passed to
	/// [`Session::release`].
	pub fn detach(mut self) -> F::Marshal {
		self.marshal.take().expect("lease holds a marshal until dropped")
	}

	pub fn session(&self) -> &'a Session<F> {
		self.session
	}
}

impl<F: MarshalFactory> Deref for MarshalLease<'_, F> {
	type Target = F::Marshal;

	fn deref(&self) -> &F::Marshal {
		self.marshal.as_ref().expect("lease holds a marshal until dropped")
	}
}

impl<F: MarshalFactory> DerefMut for MarshalLease<'_, F> {
	fn deref_mut(&mut self) -> &mut F::Marshal {
		self.marshal.as_mut().expect("lease holds a marshal until dropped")
	}
}

impl<F: MarshalFactory> Drop for MarshalLease<'_, F> {
	fn drop(&mut self) {
		if let Some(marshal) = self.marshal.take() {
			if let Err(e) = self.session.release(marshal) {
				tracing::debug!(local_id = self.session.local_id(), error = %e, "Lease dropped after session close");
			}
		}
	}
}

impl<F: MarshalFactory> fmt::Debug for MarshalLease<'_, F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MarshalLease").field("local_id", &self.session.local_id()).finish_non_exhaustive()
	}
}
