//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::error::{PhoneBookError, Result};
use crate::protocol::{write_response, Response};
use crate::store::PhoneBook;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and drain its workers
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for the phone book
pub struct Server {
    config: Config,
    store: Arc<PhoneBook>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listen address from `config`
    ///
    /// Port 0 picks a free port; see [`Server::local_addr`].
    pub fn bind(config: Config, store: Arc<PhoneBook>) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Connections queue on a bounded channel of `max_connections`; once it
    /// is full new clients get an ERROR response and are closed.
    pub fn run(&self) -> Result<()> {
        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);

        let workers = (0..self.config.worker_threads)
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<Result<Vec<_>>>()?;
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            workers.len()
        );

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    // accepted sockets may inherit non-blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    tracing::trace!("Accepted connection from {}", addr);

                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(mut stream)) => {
                            tracing::warn!("Connection limit reached, rejecting {}", addr);
                            let _ = write_response(
                                &mut stream,
                                &Response::error("server busy: too many connections"),
                            );
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(PhoneBookError::Protocol(
                                "worker pool terminated".to_string(),
                            ));
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let store = Arc::clone(&self.store);
        let read_timeout = self.config.read_timeout_ms;
        let write_timeout = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("phonebook-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let mut connection = match Connection::new(stream, Arc::clone(&store)) {
                        Ok(c) => c,
                        Err(e) => {
                            tracing::warn!("Failed to set up connection: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = connection.set_timeouts(read_timeout, write_timeout) {
                        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
                    }
                    if let Err(e) = connection.handle() {
                        tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                    }
                }
                tracing::trace!("Worker {} exiting", id);
            })?;

        Ok(handle)
    }
}
