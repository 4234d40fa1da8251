//! Connection Handler
//!
//! Serves one client socket: read a command, run it against the phone
//! book, write the response, repeat.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PhoneBookError, Result};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::record::document;
use crate::store::PhoneBook;

/// One accepted client socket bound to the shared store
pub struct Connection {
    /// Buffered read half
    reader: BufReader<TcpStream>,

    /// Buffered write half
    writer: BufWriter<TcpStream>,

    /// Shared store every command runs against
    store: Arc<PhoneBook>,

    /// Remote address, for log lines
    peer_addr: String,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, store: Arc<PhoneBook>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Responses are small; do not let Nagle hold them back
        stream.set_nodelay(true)?;

        let read_half = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
            store,
            peer_addr,
        })
    }

    /// Apply socket timeouts; 0 leaves a direction unbounded
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Serve requests until the client goes away
    ///
    /// A disconnect or an idle read timeout ends the session cleanly; a
    /// malformed frame is answered with ERROR and ends it with that error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Serving {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(PhoneBookError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("{} closed the connection", self.peer_addr);
                    return Ok(());
                }
                Err(PhoneBookError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // WouldBlock on unix, TimedOut on Windows
                    tracing::debug!("{} idle past read timeout", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Bad request frame from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("{} -> {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                if let PhoneBookError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "{} left before its response was written: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Failed to answer {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command and map the outcome to a response
    ///
    /// not found → NOT_FOUND, malformed input → BAD_REQUEST,
    /// I/O failure or stored corruption → ERROR
    fn execute_command(&self, command: Command) -> Response {
        let kind = command.command_type();
        match self.dispatch(command) {
            Ok(payload) => {
                tracing::info!("{} {:?} ok", self.peer_addr, kind);
                Response::ok(payload)
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("{} {:?} not found", self.peer_addr, kind);
                Response::not_found()
            }
            Err(e) if e.is_bad_request() => {
                tracing::info!("{} {:?} rejected: {}", self.peer_addr, kind, e);
                Response::bad_request(&e.to_string())
            }
            Err(e) => {
                tracing::error!("{} {:?} failed: {}", self.peer_addr, kind, e);
                Response::error(&e.to_string())
            }
        }
    }

    fn dispatch(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::List => self.store.export_listing().map(Some),
            Command::GetRecord { surname } => {
                let record = self.store.get_record(&surname)?;
                document::encode_record(&record).map(Some)
            }
            Command::GetEntry {
                surname,
                first_name,
            } => {
                let entry = self.store.get_entry(&surname, &first_name)?;
                document::encode_entry(&entry).map(Some)
            }
            Command::Put { document } => {
                let outcome = self.store.apply_update(&document)?;
                Ok(Some(outcome.as_str().as_bytes().to_vec()))
            }
            Command::DeleteRecord { surname } => {
                self.store.delete_record(&surname)?;
                Ok(None)
            }
            Command::DeleteEntry {
                surname,
                first_name,
            } => {
                self.store.delete_entry(&surname, &first_name)?;
                Ok(None)
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Remote address as text
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
