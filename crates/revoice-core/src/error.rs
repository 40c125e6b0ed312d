use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("Corrupt archive header: entry count {0}")]
    CorruptHeader(u32),

    #[error("Archive truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Failed to open audio output device: {0}")]
    DeviceOpenFailed(String),

    #[error("Archive index out of range: {index} (table has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
