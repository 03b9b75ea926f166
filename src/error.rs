//! ==============================================================================
//! error.rs - typed failures for the monitor pipeline
//! ==============================================================================
//!
//! none of these abort a tick. the render step logs them and keeps going;
//! only the binary edge (config load, server bind) uses anyhow.
//!
//! ==============================================================================

use thiserror::Error;

/// a sensor line that could not be turned into a sample
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line is not valid utf-8")]
    Encoding,
    #[error("missing ',' separator in {line:?}")]
    MissingSeparator { line: String },
    #[error("value field {field:?} is not a number: {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("value {value} is not finite")]
    NonFinite { value: f64 },
}

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port query failed: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CsvLogError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("buffer.capacity must be at least 1")]
    ZeroCapacity,
    #[error("polling.interval_ms must be greater than zero")]
    ZeroInterval,
    #[error("serial.baud_rate must be greater than zero")]
    ZeroBaudRate,
}
