//! TCP transport to the HPI daemon
//!
//! [`TcpMarshal`] is the production [`Marshal`]: one TCP stream per marshal,
//! plus the per-exchange state the RPC layer writes into (a scratch buffer
//! and a message id counter). `reset` clears that state and keeps the stream
//! connected so the marshal can be pooled and reused.

#[cfg(test)]
mod tests;

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

use crate::marshal::{Marshal, MarshalFactory};

/// Default time allowed for a TCP connect to a single resolved address.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket options applied to every stream a [`TcpMarshal`] opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpOptions {
	pub connect_timeout: Duration,
	/// Read and write timeout. `None` blocks indefinitely.
	pub io_timeout: Option<Duration>,
	pub nodelay: bool,
	/// TCP keepalive probes. `None` leaves the system default (off).
	pub keepalive: Option<Keepalive>,
}

impl Default for TcpOptions {
	fn default() -> Self {
		Self {
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			io_timeout: None,
			nodelay: true,
			keepalive: None,
		}
	}
}

/// Keepalive probing for idle daemon connections.
///
/// Pooled marshals can sit idle for a long time; probing lets the kernel
/// notice a dead daemon before the next exchange does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keepalive {
	/// Idle time before the first probe.
	pub time: Duration,
	/// Time between unanswered probes.
	pub interval: Duration,
	/// Unanswered probes before the connection is dropped.
	pub retries: u32,
}

impl Keepalive {
	fn to_socket(self) -> TcpKeepalive {
		#[allow(unused_mut)]
		let mut keepalive = TcpKeepalive::new().with_time(self.time);
		#[cfg(any(
			target_os = "linux",
			target_os = "android",
			target_os = "macos",
			target_os = "ios",
			target_os = "freebsd",
			target_os = "netbsd",
			windows
		))]
		{
			keepalive = keepalive.with_interval(self.interval);
		}
		#[cfg(any(
			target_os = "linux",
			target_os = "android",
			target_os = "macos",
			target_os = "ios",
			target_os = "freebsd",
			target_os = "netbsd"
		))]
		{
			keepalive = keepalive.with_retries(self.retries);
		}
		keepalive
	}
}

/// Marshal backed by a `std::net::TcpStream`.
#[derive(Debug)]
pub struct TcpMarshal {
	options: TcpOptions,
	stream: Option<TcpStream>,
	scratch: Vec<u8>,
	next_id: u32,
}

impl TcpMarshal {
	pub fn new(options: TcpOptions) -> Self {
		Self {
			options,
			stream: None,
			scratch: Vec::new(),
			next_id: 0,
		}
	}

	pub fn is_open(&self) -> bool {
		self.stream.is_some()
	}

	/// The connected stream, for the RPC layer to write requests and read replies.
	pub fn stream_mut(&mut self) -> Option<&mut TcpStream> {
		self.stream.as_mut()
	}

	pub fn peer_addr(&self) -> Option<SocketAddr> {
		self.stream.as_ref().and_then(|s| s.peer_addr().ok())
	}

	/// Buffer for encoding the current exchange. Emptied by `reset`.
	pub fn scratch_mut(&mut self) -> &mut Vec<u8> {
		&mut self.scratch
	}

	/// Message id for the next request in the current exchange.
	pub fn next_message_id(&mut self) -> u32 {
		let id = self.next_id;
		self.next_id = self.next_id.wrapping_add(1);
		id
	}

	fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
		let mut last_err = None;

		// Try every resolved address, IPv4 and IPv6 alike.
		for addr in (host, port).to_socket_addrs()? {
			let attempt = TcpStream::connect_timeout(&addr, self.options.connect_timeout)
				.and_then(|stream| self.configure(&stream).map(|()| stream));
			match attempt {
				Ok(stream) => return Ok(stream),
				Err(e) => {
					tracing::debug!(%addr, error = %e, "Connect attempt failed, trying next address");
					last_err = Some(e);
				}
			}
		}

		Err(last_err.unwrap_or_else(|| {
			io::Error::new(io::ErrorKind::AddrNotAvailable, format!("No addresses resolved for {host}:{port}"))
		}))
	}

	fn configure(&self, stream: &TcpStream) -> io::Result<()> {
		stream.set_nodelay(self.options.nodelay)?;
		stream.set_read_timeout(self.options.io_timeout)?;
		stream.set_write_timeout(self.options.io_timeout)?;
		if let Some(keepalive) = self.options.keepalive {
			SockRef::from(stream).set_tcp_keepalive(&keepalive.to_socket())?;
		}
		Ok(())
	}
}

impl Default for TcpMarshal {
	fn default() -> Self {
		Self::new(TcpOptions::default())
	}
}

impl Marshal for TcpMarshal {
	fn open(&mut self, host: &str, port: u16) -> bool {
		match self.connect(host, port) {
			Ok(stream) => {
				tracing::debug!(host, port, "Opened daemon connection");
				self.stream = Some(stream);
				true
			}
			Err(e) => {
				tracing::warn!(host, port, error = %e, "Failed to open daemon connection");
				self.stream = None;
				false
			}
		}
	}

	fn reset(&mut self) {
		self.scratch.clear();
		self.next_id = 0;
	}

	fn close(&mut self) {
		if let Some(stream) = self.stream.take() {
			if let Err(e) = stream.shutdown(Shutdown::Both) {
				tracing::debug!(error = %e, "Shutdown of daemon connection failed");
			}
		}
		self.scratch = Vec::new();
	}
}

/// Creates [`TcpMarshal`]s sharing one set of socket options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpMarshalFactory {
	options: TcpOptions,
}

impl TcpMarshalFactory {
	pub fn new(options: TcpOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &TcpOptions {
		&self.options
	}
}

impl MarshalFactory for TcpMarshalFactory {
	type Marshal = TcpMarshal;

	fn create(&self) -> TcpMarshal {
		TcpMarshal::new(self.options)
	}
}
