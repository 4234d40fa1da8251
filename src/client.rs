//! Blocking Client
//!
//! Speaks the wire protocol over one TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{PhoneBookError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::record::{document, Entry, Record};

/// Client connection to a phone book server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Health check; returns the server's reply
    pub fn ping(&mut self) -> Result<String> {
        let response = self.call(Command::Ping)?;
        Ok(response.message())
    }

    /// Every record on the server
    pub fn list(&mut self) -> Result<Vec<Record>> {
        let response = self.call(Command::List)?;
        document::decode_listing(response.payload.as_deref().unwrap_or_default())
    }

    /// The record for a surname, if any
    pub fn get_record(&mut self, surname: &str) -> Result<Option<Record>> {
        let response = self.call(Command::GetRecord {
            surname: surname.to_string(),
        })?;
        match response.status {
            Status::NotFound => Ok(None),
            _ => document::decode_record(response.payload.as_deref().unwrap_or_default()).map(Some),
        }
    }

    /// One entry, if any
    pub fn get_entry(&mut self, surname: &str, first_name: &str) -> Result<Option<Entry>> {
        let response = self.call(Command::GetEntry {
            surname: surname.to_string(),
            first_name: first_name.to_string(),
        })?;
        match response.status {
            Status::NotFound => Ok(None),
            _ => document::decode_entry(response.payload.as_deref().unwrap_or_default()).map(Some),
        }
    }

    /// Merge one entry under a surname; returns the outcome name
    /// (`created`, `inserted`, `replaced` or `unchanged`)
    pub fn put(&mut self, surname: &str, entry: &Entry) -> Result<String> {
        let document = document::encode_update(surname, entry)?;
        self.put_document(document)
    }

    /// Send a raw update document
    pub fn put_document(&mut self, document: Vec<u8>) -> Result<String> {
        let response = self.call(Command::Put { document })?;
        Ok(response.message())
    }

    /// Delete a whole record
    pub fn delete_record(&mut self, surname: &str) -> Result<()> {
        self.call(Command::DeleteRecord {
            surname: surname.to_string(),
        })?;
        Ok(())
    }

    /// Delete one entry
    pub fn delete_entry(&mut self, surname: &str, first_name: &str) -> Result<()> {
        self.call(Command::DeleteEntry {
            surname: surname.to_string(),
            first_name: first_name.to_string(),
        })?;
        Ok(())
    }

    /// Send a command and map failure statuses to errors
    ///
    /// NOT_FOUND is passed through for the caller to interpret.
    fn call(&mut self, command: Command) -> Result<Response> {
        write_command(&mut self.writer, &command)?;
        let response = read_response(&mut self.reader)?;

        match response.status {
            Status::Ok | Status::NotFound => Ok(response),
            Status::BadRequest => Err(PhoneBookError::InvalidInput(response.message())),
            Status::Error => Err(PhoneBookError::Remote(response.message())),
        }
    }
}
