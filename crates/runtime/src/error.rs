//! Error types for the HPI runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the HPI runtime.
///
/// A pool miss whose fresh connection could not be opened is deliberately
/// not an error: `Session::acquire` reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
	/// Operation attempted on a session that has already been closed.
	#[error("Session {local_id} is closed")]
	SessionClosed { local_id: u64 },

	/// No session with this local id is registered.
	#[error("Session not found: {0}")]
	SessionNotFound(u64),

	/// Client configuration is unusable.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this error reports use of a closed session.
	pub fn is_session_closed(&self) -> bool {
		matches!(self, Error::SessionClosed { .. })
	}

	/// Returns the local session id this error refers to, if any.
	pub fn local_id(&self) -> Option<u64> {
		match self {
			Error::SessionClosed { local_id } => Some(*local_id),
			Error::SessionNotFound(id) => Some(*id),
			_ => None,
		}
	}
}
