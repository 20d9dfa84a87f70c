//! HPI Runtime - client sessions and pooled daemon connections
//!
//! This crate provides the session layer of an HPI client talking to a
//! remote management daemon:
//!
//! - **Session ids**: Process-wide unique local session identifiers
//! - **Marshal**: The transport endpoint used for one RPC exchange
//! - **Session**: Pool of idle marshals with thread-safe check-out/check-in
//! - **Registry**: Table of live sessions keyed by local id
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   RPC layer  │  Encodes calls, uses one marshal per exchange
//! └──────┬───────┘
//!        │ acquire / release
//! ┌──────▼───────┐
//! │ hpi-runtime  │  This crate
//! │  ┌────────┐  │
//! │  │Session │  │  LIFO pool, lifecycle, remote sid
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │Marshal │  │  TCP transport to the daemon
//! │  └────────┘  │
//! └──────────────┘
//! ```
//!
//! # Decoupling via MarshalFactory
//!
//! A `Session` never names a concrete transport. It creates new connections
//! through a `MarshalFactory`, so the pool logic can be driven by an in-memory
//! marshal in tests and by `TcpMarshal` in production.

pub mod config;
pub mod domain;
pub mod error;
pub mod marshal;
pub mod registry;
pub mod session;
pub mod session_id;
pub mod testing;
pub mod transport;

// Re-export key types at crate root
pub use config::{ClientConfig, KeepaliveConfig};
pub use domain::Domain;
pub use error::{Error, Result};
pub use marshal::{Marshal, MarshalFactory};
pub use registry::SessionRegistry;
pub use session::{MarshalLease, Session, SessionBuilder};
pub use session_id::SessionIdAllocator;
pub use transport::{Keepalive, TcpMarshal, TcpMarshalFactory, TcpOptions};
