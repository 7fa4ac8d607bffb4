use std::io;
use thiserror::Error;

/// Errors produced while reading or parsing DBC sources.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed BO_ line: {line}")]
    MalformedMessage { line: String },
    #[error("Malformed SG_ line: {line}")]
    MalformedSignal { line: String },
    #[error("SG_ line without an owning BO_ message: {line}")]
    OrphanSignal { line: String },
}

/// Errors that abort building a decoder or an encoder.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] DbcParseError),
    #[error("Format '{format}' is not yet supported")]
    Unsupported { format: String },
}

/// Errors produced while verifying that a signal fits a CAN frame layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageLayoutError {
    #[error("Signal Bit Length cannot be zero")]
    ZeroBitLength,
    #[error(
        "Out of bounds (Intel)! \nSignal end bit = {end} \nMessage total bits = {total_bits} (bytes={byte_length})"
    )]
    IntelOutOfBounds {
        end: usize,
        total_bits: usize,
        byte_length: u16,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal start bit = {start} \nMessage total bits = {total_bits} (bytes={byte_length})"
    )]
    MotorolaStartOutOfBounds {
        start: usize,
        total_bits: usize,
        byte_length: u16,
    },
    #[error("Out of bounds (Motorola): Signal ends in byte {end_byte} (bytes={byte_length})")]
    MotorolaEndOutOfBounds { end_byte: usize, byte_length: u16 },
}
