use serde::{Deserialize, Serialize};

/// one reading taken from the sensor line
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// seconds since the unix epoch, fractional
    pub timestamp: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// stamp a value with the current wall clock
    pub fn now(value: f64) -> Self {
        Self::new(epoch_seconds(), value)
    }
}

/// current time as fractional seconds since the unix epoch
pub fn epoch_seconds() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// counters published alongside each figure
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorStats {
    pub ticks: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub csv_failures: u64,
    pub serial_connected: bool,
}
