//! serial sensor monitor: reads "id,value" lines from a serial device,
//! keeps the last hundred readings, appends each to a CSV log and serves
//! a live chart with a confirm-to-stop control.

pub mod buffer;
pub mod chart;
pub mod config;
pub mod csv_log;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod serial;
pub mod server;
pub mod termination;

pub use domain::Sample;
pub use monitor::Monitor;
