use std::io::{Read, Write};
use std::net::TcpListener;

use socket2::SockRef;

use super::*;

fn unused_port() -> u16 {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	listener.local_addr().unwrap().port()
}

#[test]
fn test_open_connects_to_listener() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = TcpMarshal::default();
	assert!(!marshal.is_open());
	assert!(marshal.open("127.0.0.1", port));
	assert!(marshal.is_open());
	assert_eq!(marshal.peer_addr().unwrap().port(), port);

	marshal.close();
	assert!(!marshal.is_open());
}

#[test]
fn test_open_refused_leaves_marshal_unopened() {
	let port = unused_port();

	let mut marshal = TcpMarshal::new(TcpOptions {
		connect_timeout: Duration::from_millis(500),
		..TcpOptions::default()
	});
	assert!(!marshal.open("127.0.0.1", port));
	assert!(!marshal.is_open());
	assert!(marshal.stream_mut().is_none());
}

#[test]
fn test_reset_clears_exchange_state_and_keeps_stream() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = TcpMarshal::default();
	assert!(marshal.open("127.0.0.1", port));

	marshal.scratch_mut().extend_from_slice(b"request");
	assert_eq!(marshal.next_message_id(), 0);
	assert_eq!(marshal.next_message_id(), 1);

	marshal.reset();

	assert!(marshal.scratch_mut().is_empty());
	assert_eq!(marshal.next_message_id(), 0);
	assert!(marshal.is_open());
}

#[test]
fn test_stream_carries_bytes_to_daemon() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = TcpMarshal::default();
	assert!(marshal.open("127.0.0.1", port));
	let (mut accepted, _) = listener.accept().unwrap();

	marshal.stream_mut().unwrap().write_all(b"ping").unwrap();

	let mut buf = [0u8; 4];
	accepted.read_exact(&mut buf).unwrap();
	assert_eq!(&buf, b"ping");
}

#[test]
fn test_factory_applies_options() {
	let options = TcpOptions {
		connect_timeout: Duration::from_secs(1),
		io_timeout: Some(Duration::from_secs(2)),
		nodelay: false,
		keepalive: None,
	};
	let factory = TcpMarshalFactory::new(options);
	assert_eq!(factory.options(), &options);

	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = factory.create();
	assert!(marshal.open("127.0.0.1", port));
	let stream = marshal.stream_mut().unwrap();
	assert_eq!(stream.read_timeout().unwrap(), Some(Duration::from_secs(2)));
	assert!(!stream.nodelay().unwrap());
}

#[test]
fn test_keepalive_is_applied_to_stream() {
	let keepalive = Keepalive {
		time: Duration::from_secs(30),
		interval: Duration::from_secs(5),
		retries: 4,
	};
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = TcpMarshal::new(TcpOptions {
		keepalive: Some(keepalive),
		..TcpOptions::default()
	});
	assert!(marshal.open("127.0.0.1", port));

	let socket = SockRef::from(&*marshal.stream_mut().unwrap());
	assert!(socket.keepalive().unwrap());
	#[cfg(target_os = "linux")]
	{
		assert_eq!(socket.keepalive_time().unwrap(), keepalive.time);
		assert_eq!(socket.keepalive_interval().unwrap(), keepalive.interval);
		assert_eq!(socket.keepalive_retries().unwrap(), keepalive.retries);
	}
}

#[test]
fn test_keepalive_off_by_default() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	let mut marshal = TcpMarshal::default();
	assert!(marshal.open("127.0.0.1", port));

	let socket = SockRef::from(&*marshal.stream_mut().unwrap());
	assert!(!socket.keepalive().unwrap());
}

#[test]
fn test_rejected_socket_option_fails_open() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();

	// A zero read/write timeout is refused by the OS after the connect succeeds.
	let mut marshal = TcpMarshal::new(TcpOptions {
		io_timeout: Some(Duration::ZERO),
		..TcpOptions::default()
	});

	let err = marshal.connect("127.0.0.1", port).unwrap_err();
	assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

	assert!(!marshal.open("127.0.0.1", port));
	assert!(!marshal.is_open());
}
