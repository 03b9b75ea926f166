//! ==============================================================================
//! monitor.rs - the per-tick render step
//! ==============================================================================
//!
//! purpose:
//!     owns everything the polling task mutates: the line source, the
//!     series buffer and the csv log. one call to `tick` is one refresh of
//!     the dashboard chart.
//!
//! flow per tick:
//!     terminated? -> terminal figure (serial port released on first sight)
//!     otherwise   -> poll one line -> parse -> buffer + csv -> live figure
//!
//! nothing here returns an error. bad lines and csv failures are logged
//! and counted; a dead port is dropped and the chart just stops moving.
//!
//! ==============================================================================

use tracing::{debug, error, info, warn};

use crate::buffer::SeriesBuffer;
use crate::chart::{self, Figure};
use crate::config::MonitorConfig;
use crate::csv_log::CsvLog;
use crate::domain::{MonitorStats, Sample};
use crate::serial::{decode_line, parse_line, LineSource};

pub struct Monitor {
    source: Option<Box<dyn LineSource>>,
    buffer: SeriesBuffer,
    csv: CsvLog,
    stats: MonitorStats,
    show_sensor_data: bool,
}

impl Monitor {
    pub fn new(source: Option<Box<dyn LineSource>>, buffer: SeriesBuffer, csv: CsvLog) -> Self {
        Self { source, buffer, csv, stats: MonitorStats::default(), show_sensor_data: false }
    }

    pub fn from_config(config: &MonitorConfig, source: Option<Box<dyn LineSource>>) -> Self {
        Self::new(
            source,
            SeriesBuffer::with_capacity(config.buffer.capacity),
            CsvLog::new(config.csv.path.clone()),
        )
        .with_sensor_echo(config.logging.show_sensor_data)
    }

    /// log every accepted value at info level
    pub fn with_sensor_echo(mut self, enabled: bool) -> Self {
        self.show_sensor_data = enabled;
        self
    }

    pub fn buffer(&self) -> &SeriesBuffer {
        &self.buffer
    }

    pub fn csv(&self) -> &CsvLog {
        &self.csv
    }

    pub fn stats(&self) -> MonitorStats {
        MonitorStats { serial_connected: self.source.is_some(), ..self.stats }
    }

    /// run one refresh and return the figure to publish
    pub fn tick(&mut self, terminated: bool) -> Figure {
        self.stats.ticks += 1;

        if terminated {
            self.release_source();
            return chart::terminated_figure();
        }

        if let Some(value) = self.read_value() {
            let sample = Sample::now(value);
            self.buffer.push(sample);
            self.stats.accepted += 1;

            if let Err(e) = self.csv.append(&sample) {
                self.stats.csv_failures += 1;
                error!("error saving to csv: {e}");
            }
        }

        chart::live_figure(&self.buffer)
    }

    /// drop the serial handle; later ticks never read again
    pub fn release_source(&mut self) {
        if self.source.take().is_some() {
            info!("data collection terminated; serial port released");
        }
    }

    fn read_value(&mut self) -> Option<f64> {
        let source = self.source.as_mut()?;

        let raw = match source.poll_line() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("{e}; no further sensor input");
                self.source = None;
                return None;
            }
        };

        let parsed = decode_line(&raw).and_then(|line| {
            debug!(line, "received line");
            parse_line(line)
        });

        match parsed {
            Ok(value) => {
                if self.show_sensor_data {
                    info!(value, "sample");
                }
                Some(value)
            }
            Err(e) => {
                self.stats.rejected += 1;
                warn!("discarding sample: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{LIVE_TITLE, TERMINATED_TITLE};
    use crate::serial::ScriptedSource;
    use std::io;

    fn monitor_with(lines: &[&str], dir: &tempfile::TempDir) -> Monitor {
        let source: Box<dyn LineSource> = Box::new(ScriptedSource::new(lines.iter().copied()));
        Monitor::new(Some(source), SeriesBuffer::default(), CsvLog::new(dir.path().join("out.csv")))
    }

    #[test]
    fn accepted_line_lands_in_buffer_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = monitor_with(&["3,12.5"], &dir);

        let figure = monitor.tick(false);
        assert_eq!(figure.title(), LIVE_TITLE);
        assert_eq!(figure.data[0].y, vec![12.5]);
        assert_eq!(monitor.stats().accepted, 1);

        let csv = std::fs::read_to_string(monitor.csv().path()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn malformed_lines_are_counted_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = monitor_with(&["abc", "3,xyz"], &dir);

        monitor.tick(false);
        monitor.tick(false);

        assert!(monitor.buffer().is_empty());
        assert_eq!(monitor.stats().rejected, 2);
        assert!(!monitor.csv().path().exists());
    }

    #[test]
    fn no_source_still_renders_empty_live_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor =
            Monitor::new(None, SeriesBuffer::default(), CsvLog::new(dir.path().join("out.csv")));

        let figure = monitor.tick(false);
        assert_eq!(figure.title(), LIVE_TITLE);
        assert_eq!(figure.layout.yaxis.map(|a| a.range), Some([0.0, 1.0]));
        assert!(!monitor.stats().serial_connected);
    }

    #[test]
    fn termination_releases_port_and_stops_appending() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = monitor_with(&["1,1.0", "2,2.0", "3,3.0"], &dir);

        monitor.tick(false);
        for _ in 0..3 {
            let figure = monitor.tick(true);
            assert!(figure.is_empty());
            assert_eq!(figure.title(), TERMINATED_TITLE);
        }

        assert!(!monitor.stats().serial_connected);
        assert_eq!(monitor.buffer().len(), 1);
        assert_eq!(monitor.stats().ticks, 4);
    }

    #[test]
    fn read_failure_drops_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut scripted = ScriptedSource::default();
        scripted.push_failure(io::ErrorKind::BrokenPipe);
        scripted.push_line("1,1.0");
        let mut monitor = Monitor::new(
            Some(Box::new(scripted)),
            SeriesBuffer::default(),
            CsvLog::new(dir.path().join("out.csv")),
        );

        monitor.tick(false);
        monitor.tick(false);

        assert!(!monitor.stats().serial_connected);
        assert!(monitor.buffer().is_empty());
    }

    #[test]
    fn csv_failure_does_not_block_chart() {
        let dir = tempfile::tempdir().unwrap();
        let source: Box<dyn LineSource> = Box::new(ScriptedSource::new(["1,4.0"]));
        let mut monitor = Monitor::new(
            Some(source),
            SeriesBuffer::default(),
            CsvLog::new(dir.path().join("missing").join("out.csv")),
        );

        let figure = monitor.tick(false);
        assert_eq!(figure.data[0].y, vec![4.0]);
        assert_eq!(monitor.stats().csv_failures, 1);
    }
}
