//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    GetRecord = 0x02,
    GetEntry = 0x03,
    Put = 0x04,
    DeleteRecord = 0x05,
    DeleteEntry = 0x06,
    Ping = 0x07,
}

impl TryFrom<u8> for CommandType {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        match byte {
            0x01 => Ok(CommandType::List),
            0x02 => Ok(CommandType::GetRecord),
            0x03 => Ok(CommandType::GetEntry),
            0x04 => Ok(CommandType::Put),
            0x05 => Ok(CommandType::DeleteRecord),
            0x06 => Ok(CommandType::DeleteEntry),
            0x07 => Ok(CommandType::Ping),
            other => Err(other),
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every record
    List,

    /// Get the record for a surname
    GetRecord { surname: String },

    /// Get one entry of a record
    GetEntry { surname: String, first_name: String },

    /// Merge an update document (JSON, one entry)
    Put { document: Vec<u8> },

    /// Delete a whole record
    DeleteRecord { surname: String },

    /// Delete one entry of a record
    DeleteEntry { surname: String, first_name: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::GetRecord { .. } => CommandType::GetRecord,
            Command::GetEntry { .. } => CommandType::GetEntry,
            Command::Put { .. } => CommandType::Put,
            Command::DeleteRecord { .. } => CommandType::DeleteRecord,
            Command::DeleteEntry { .. } => CommandType::DeleteEntry,
            Command::Ping => CommandType::Ping,
        }
    }
}
