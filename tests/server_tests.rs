//! Server Tests
//!
//! End-to-end tests over real TCP connections.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ferrokv::config::{Config, LogSyncStrategy};
use ferrokv::network::{Client, Server, ShutdownHandle};
use ferrokv::{Engine, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct Running {
    _temp: TempDir,
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: JoinHandle<ferrokv::Result<()>>,
}

impl Running {
    fn stop(self) {
        self.shutdown.shutdown();
        self.thread.join().unwrap().unwrap();
    }
}

fn start_server(max_connections: usize) -> Running {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .listen_addr("127.0.0.1:0")
        .max_connections(max_connections)
        .log_sync_strategy(LogSyncStrategy::OsManaged)
        .build();

    let engine = Arc::new(Engine::open(config.clone()).unwrap());
    let server = Server::bind(config, engine).unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let thread = thread::spawn(move || server.run());

    Running {
        _temp: temp_dir,
        addr,
        shutdown,
        thread,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_round_trip_over_tcp() {
    let server = start_server(16);
    let mut client = Client::connect(server.addr).unwrap();

    assert_eq!(client.call(["PING"]).unwrap(), Value::simple("Pong"));
    assert_eq!(client.call(["SET", "k", "v"]).unwrap(), Value::ok());
    assert_eq!(client.call(["get", "k"]).unwrap(), Value::bulk("v"));
    assert_eq!(client.call(["GET", "missing"]).unwrap(), Value::Null);
    assert_eq!(
        client.call(["HGET", "h"]).unwrap(),
        Value::error("ERR wrong number of arguments for 'HGET' command")
    );

    drop(client);
    server.stop();
}

#[test]
fn test_accepts_clients_after_first_disconnects() {
    let server = start_server(16);

    {
        let mut first = Client::connect(server.addr).unwrap();
        assert_eq!(first.call(["SET", "shared", "1"]).unwrap(), Value::ok());
    }

    let mut second = Client::connect(server.addr).unwrap();
    assert_eq!(second.call(["GET", "shared"]).unwrap(), Value::bulk("1"));

    drop(second);
    server.stop();
}

#[test]
fn test_raw_bytes_pipeline() {
    let server = start_server(16);
    let mut stream = TcpStream::connect(server.addr).unwrap();

    // Two requests in one write
    stream
        .write_all(b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n*2\r\n$3\r\nGET\r\n$1\r\na\r\n")
        .unwrap();

    let expected = b"+OK\r\n$1\r\n1\r\n";
    let mut reply = vec![0u8; expected.len()];
    stream.read_exact(&mut reply).unwrap();
    assert_eq!(reply, expected);

    drop(stream);
    server.stop();
}

#[test]
fn test_protocol_error_closes_connection() {
    let server = start_server(16);
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream.write_all(b"?nonsense\r\n").unwrap();

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).unwrap();
    assert!(reply.starts_with(b"-ERR Protocol error"));

    drop(stream);
    server.stop();
}
