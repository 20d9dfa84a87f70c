use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use hpi_runtime::{ClientConfig, Domain, Session, SessionRegistry};

fn local_daemon() -> (TcpListener, Domain) {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();
	(listener, Domain::new("127.0.0.1", port, 1))
}

#[test]
fn tcp_session_reuses_connection() {
	let (listener, domain) = local_daemon();
	let session = Session::new(&domain);

	let marshal = session.acquire().unwrap().expect("listener accepts");
	let peer = marshal.peer_addr().unwrap();
	assert_eq!(peer.port(), domain.port());
	session.release(marshal).unwrap();

	let mut again = session.acquire().unwrap().unwrap();
	let (mut accepted, _) = listener.accept().unwrap();

	again.stream_mut().unwrap().write_all(b"hpi").unwrap();
	let mut buf = [0u8; 3];
	accepted.read_exact(&mut buf).unwrap();
	assert_eq!(&buf, b"hpi");

	session.release(again).unwrap();
	assert_eq!(session.close(), 1);
}

#[test]
fn tcp_session_without_daemon_yields_no_marshal() {
	let port = {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		listener.local_addr().unwrap().port()
	};
	let config = ClientConfig {
		domain: Domain::new("127.0.0.1", port, 1),
		connect_timeout_ms: 500,
		..ClientConfig::default()
	};

	let session = Session::with_factory(&config.domain, config.marshal_factory());
	assert!(session.acquire().unwrap().is_none());
	assert_eq!(session.pooled(), 0);
}

#[test]
fn tcp_registry_sessions_share_daemon() {
	let (_listener, domain) = local_daemon();
	let registry = Arc::new(SessionRegistry::new());

	let ids: Vec<u64> = thread::scope(|s| {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let registry = Arc::clone(&registry);
				let domain = domain.clone();
				s.spawn(move || {
					let session = registry.create(&domain);
					let lease = session.lease().unwrap().expect("listener accepts");
					assert!(lease.is_open());
					drop(lease);
					session.local_id()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(registry.len(), 4);
	for id in &ids {
		assert_eq!(registry.get(*id).unwrap().pooled(), 1);
	}
	assert_eq!(registry.close_all(), 4);
}
