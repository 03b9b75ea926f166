//! ==============================================================================
//! serial.rs - line-oriented sensor input
//! ==============================================================================
//!
//! purpose:
//!     pulls at most one "id,value" record per tick off the serial device and
//!     turns it into a floating point reading.
//!
//! relationships:
//!     - used by: monitor.rs (polls one line per tick)
//!     - uses: serialport (device access)
//!     - configured by: config.rs (SerialConfig)
//!
//! framing:
//!     the device sends "intField,floatField\n". only bytes that are already
//!     pending are read, so a poll never waits on the device. incomplete
//!     lines are held until their newline arrives; extra complete lines stay
//!     queued for later ticks.
//!
//! ==============================================================================

use std::collections::VecDeque;
use std::io::{self, Read};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{info, warn};

use crate::config::SerialConfig;
use crate::error::{ParseError, SerialError};

/// longest line accepted before the pending bytes are thrown away
pub const MAX_LINE_BYTES: usize = 4096;

const READ_CHUNK: usize = 1024;

// ==============================================================================
// parsing
// ==============================================================================

/// decode raw line bytes as utf-8 text
pub fn decode_line(raw: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(raw).map_err(|_| ParseError::Encoding)
}

/// parse "id,value" and return the value; the id is ignored
pub fn parse_line(line: &str) -> Result<f64, ParseError> {
    let line = line.trim();
    let (_, field) = line
        .split_once(',')
        .ok_or_else(|| ParseError::MissingSeparator { line: line.to_string() })?;

    let field = field.trim();
    let value: f64 = field.parse().map_err(|source| ParseError::InvalidValue {
        field: field.to_string(),
        source,
    })?;

    if !value.is_finite() {
        return Err(ParseError::NonFinite { value });
    }
    Ok(value)
}

// ==============================================================================
// line sources
// ==============================================================================

/// Something that yields complete sensor lines without blocking.
pub trait LineSource: Send {
    /// next complete line with its terminator stripped, if one is ready
    fn poll_line(&mut self) -> Result<Option<Vec<u8>>, SerialError>;
}

/// Accumulates raw bytes and splits them on '\n'.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    /// append bytes; returns how many were discarded for overrunning
    /// MAX_LINE_BYTES without a newline
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        self.pending.extend_from_slice(bytes);
        if !self.pending.contains(&b'\n') && self.pending.len() > MAX_LINE_BYTES {
            let dropped = self.pending.len();
            self.pending.clear();
            return dropped;
        }
        0
    }

    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    pub fn has_line(&self) -> bool {
        self.pending.contains(&b'\n')
    }
}

/// Line source backed by a real serial port.
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    assembler: LineAssembler,
}

impl SerialLineSource {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port, assembler: LineAssembler::default() }
    }

    pub fn open(config: &SerialConfig) -> Result<Self, SerialError> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|source| SerialError::Open { port: config.port.clone(), source })?;
        Ok(Self::new(port))
    }
}

impl LineSource for SerialLineSource {
    fn poll_line(&mut self) -> Result<Option<Vec<u8>>, SerialError> {
        if self.assembler.has_line() {
            return Ok(self.assembler.next_line());
        }

        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(None);
        }

        let mut chunk = [0u8; READ_CHUNK];
        let want = available.min(chunk.len());
        let read = match self.port.read(&mut chunk[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(SerialError::Io(e)),
        };

        let dropped = self.assembler.extend(&chunk[..read]);
        if dropped > 0 {
            warn!(dropped, "discarding serial bytes with no line terminator");
        }
        Ok(self.assembler.next_line())
    }
}

/// In-memory source for tests and deterministic playback.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Vec<u8>, io::ErrorKind>>,
}

impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut source = Self::default();
        for line in lines {
            source.push_line(line);
        }
        source
    }

    pub fn push_line(&mut self, line: impl AsRef<[u8]>) {
        self.script.push_back(Ok(line.as_ref().to_vec()));
    }

    /// queue a read failure of the given kind
    pub fn push_failure(&mut self, kind: io::ErrorKind) {
        self.script.push_back(Err(kind));
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl LineSource for ScriptedSource {
    fn poll_line(&mut self) -> Result<Option<Vec<u8>>, SerialError> {
        match self.script.pop_front() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(kind)) => Err(SerialError::Io(io::Error::new(kind, "scripted failure"))),
            None => Ok(None),
        }
    }
}

// ==============================================================================
// startup
// ==============================================================================

/// open the configured port, or log why not and carry on without one
pub fn open_port(config: &SerialConfig) -> Option<SerialLineSource> {
    match SerialLineSource::open(config) {
        Ok(source) => {
            info!(port = %config.port, baud = config.baud_rate, "serial port opened");
            Some(source)
        }
        Err(e) => {
            warn!("{e}; continuing without sensor input");
            None
        }
    }
}

/// list detected ports as a hint when the configured one is wrong
pub fn log_available_ports() {
    match serialport::available_ports() {
        Ok(ports) if ports.is_empty() => warn!("no serial ports detected"),
        Ok(ports) => {
            let list = ports
                .into_iter()
                .map(|p| p.port_name)
                .collect::<Vec<_>>()
                .join(", ");
            info!("available serial ports: {list}");
        }
        Err(e) => warn!("could not enumerate serial ports: {e}"),
    }
}
