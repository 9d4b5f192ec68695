//! TCP Server
//!
//! Accepts connections until shut down and hands each one to its own
//! thread.

use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{encode_value, Value};
use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for ferrokv
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

/// Cloneable handle that asks a running server to stop accepting
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    /// Accept connections until shutdown (blocking)
    ///
    /// Connections already being served run to completion on their own
    /// threads.
    pub fn run(&self) -> Result<()> {
        self.listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", self.local_addr()?);

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.spawn_connection(stream) {
                        tracing::warn!("Failed to start connection for {}: {}", peer, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!(
            "Server stopped accepting connections ({} still active)",
            self.active_connections()
        );
        Ok(())
    }

    fn spawn_connection(&self, mut stream: TcpStream) -> Result<()> {
        stream.set_nonblocking(false)?;

        let active = self.active_connections.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!("Connection limit ({}) reached", self.config.max_connections);
            let reply = Value::error("ERR max number of clients reached");
            let _ = stream.write_all(&encode_value(&reply));
            return Ok(());
        }

        let mut connection = Connection::new(stream, Arc::clone(&self.engine))
            .and_then(|mut c| {
                c.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
                Ok(c)
            })
            .map_err(|e| {
                self.active_connections.fetch_sub(1, Ordering::AcqRel);
                e
            })?;

        let active_connections = Arc::clone(&self.active_connections);
        let spawned = thread::Builder::new()
            .name("ferrokv-conn".to_string())
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} closed with error: {}", connection.peer_addr(), e);
                }
                active_connections.fetch_sub(1, Ordering::AcqRel);
            });

        if let Err(e) = spawned {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            return Err(e.into());
        }
        Ok(())
    }
}
