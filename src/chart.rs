//! ==============================================================================
//! chart.rs - plotly-shaped figure payloads
//! ==============================================================================
//!
//! the dashboard page hands these straight to `Plotly.react`, so field names
//! follow plotly's figure schema rather than rust conventions.
//!
//! ==============================================================================

use serde::{Deserialize, Serialize};

use crate::buffer::SeriesBuffer;

pub const LIVE_TITLE: &str = "Live Graph";
pub const TERMINATED_TITLE: &str = "Program Terminated";

const TRACE_COLOR: &str = "rgb(0, 255, 0)";
const MARKER_SIZE: u32 = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    pub name: String,
    pub line: LineStyle,
    pub marker: MarkerStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: String,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub range: [f64; 2],
}

impl Figure {
    pub fn title(&self) -> &str {
        &self.layout.title
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// line-plus-markers figure over everything currently buffered
pub fn live_figure(buffer: &SeriesBuffer) -> Figure {
    let trace = Trace {
        x: buffer.timestamps(),
        y: buffer.values(),
        mode: "lines+markers".to_string(),
        name: "Data".to_string(),
        line: LineStyle { color: TRACE_COLOR.to_string() },
        marker: MarkerStyle { color: TRACE_COLOR.to_string(), size: MARKER_SIZE },
    };

    Figure {
        data: vec![trace],
        layout: Layout {
            title: LIVE_TITLE.to_string(),
            xaxis: Some(Axis { range: buffer.x_range() }),
            yaxis: Some(Axis { range: buffer.y_range() }),
        },
    }
}

/// empty figure shown once collection has been stopped
pub fn terminated_figure() -> Figure {
    Figure {
        data: Vec::new(),
        layout: Layout { title: TERMINATED_TITLE.to_string(), xaxis: None, yaxis: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sample;

    #[test]
    fn empty_buffer_gives_unit_axes() {
        let figure = live_figure(&SeriesBuffer::default());
        assert_eq!(figure.title(), LIVE_TITLE);
        assert_eq!(figure.data.len(), 1);
        assert!(figure.data[0].x.is_empty());
        assert_eq!(figure.layout.xaxis, Some(Axis { range: [0.0, 1.0] }));
        assert_eq!(figure.layout.yaxis, Some(Axis { range: [0.0, 1.0] }));
    }

    #[test]
    fn live_figure_serializes_as_plotly_json() {
        let mut buffer = SeriesBuffer::default();
        buffer.push(Sample::new(10.0, 1.5));
        buffer.push(Sample::new(11.0, 2.5));

        let json = serde_json::to_value(live_figure(&buffer)).unwrap();
        assert_eq!(json["data"][0]["mode"], "lines+markers");
        assert_eq!(json["data"][0]["y"], serde_json::json!([1.5, 2.5]));
        assert_eq!(json["data"][0]["marker"]["size"], 8);
        assert_eq!(json["layout"]["xaxis"]["range"], serde_json::json!([10.0, 11.0]));
        assert_eq!(json["layout"]["yaxis"]["range"], serde_json::json!([1.5, 2.5]));
    }

    #[test]
    fn terminated_figure_has_no_data_or_axes() {
        let figure = terminated_figure();
        assert!(figure.is_empty());
        assert_eq!(figure.title(), TERMINATED_TITLE);

        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
        assert!(json["layout"].get("xaxis").is_none());
    }
}
