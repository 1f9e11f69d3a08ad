//! Translation of a [`ChartSpec`] into a Plotly figure.
//!
//! Line and bar traces are built with the `plotly` crate; Plotly has no ring
//! chart type in that crate version, so the doughnut trace and the layouts
//! are plain JSON.

use common::format_millions;
use plotly::common::{Fill, Line, LineShape, Marker, Mode};
use plotly::{Bar, Scatter};
use serde_json::{Value, json};

use crate::charts::{ChartKind, ChartSpec, LegendPosition, ValueFormat};
use crate::error::Result;

/// Number of intervals the millions axis is split into.
const MAGNITUDE_TICKS: usize = 5;

/// Arguments for `Plotly.newPlot` / `Plotly.react`.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub data: Value,
    pub layout: Value,
    pub config: Value,
}

pub fn figure(spec: &ChartSpec) -> Result<Figure> {
    let trace = match spec.kind {
        ChartKind::Line => line_trace(spec)?,
        ChartKind::Bar => bar_trace(spec)?,
        ChartKind::Doughnut => doughnut_trace(spec),
    };

    Ok(Figure {
        data: Value::Array(vec![trace]),
        layout: layout(spec),
        config: json!({"responsive": true, "displayModeBar": false}),
    })
}

fn line_trace(spec: &ChartSpec) -> Result<Value> {
    let dataset = &spec.dataset;
    let mut trace = Scatter::new(spec.labels.clone(), dataset.values.clone())
        .mode(Mode::Lines)
        .fill(Fill::ToZeroY);

    if let Some(label) = dataset.label {
        trace = trace.name(label);
    }
    if let Some(stroke) = dataset.stroke {
        trace = trace.line(Line::new().color(stroke).shape(LineShape::Spline).width(2.0));
    }
    if let Some(fill) = dataset.fill {
        trace = trace.fill_color(fill);
    }

    Ok(serde_json::to_value(&trace)?)
}

fn bar_trace(spec: &ChartSpec) -> Result<Value> {
    let dataset = &spec.dataset;
    let mut trace = Bar::new(spec.labels.clone(), dataset.values.clone());

    if let Some(label) = dataset.label {
        trace = trace.name(label);
    }
    if !dataset.palette.is_empty() {
        trace = trace.marker(Marker::new().color_array(dataset.palette.clone()));
    }

    Ok(serde_json::to_value(&trace)?)
}

fn doughnut_trace(spec: &ChartSpec) -> Value {
    json!({
        "type": "pie",
        "labels": spec.labels,
        "values": spec.dataset.values,
        "hole": 0.7,
        "sort": false,
        "textinfo": "none",
        "marker": {
            "colors": spec.dataset.palette,
            "line": {"width": 0}
        }
    })
}

fn layout(spec: &ChartSpec) -> Value {
    let mut layout = json!({
        "margin": {"t": 10, "r": 10, "l": 50, "b": 30},
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)",
        "showlegend": spec.legend != LegendPosition::Hidden,
    });

    match spec.kind {
        ChartKind::Doughnut => {
            layout["margin"]["l"] = json!(10);
            if spec.legend == LegendPosition::Right {
                layout["legend"] = json!({"x": 1.05, "y": 0.5, "xanchor": "left", "yanchor": "middle"});
            }
        }
        ChartKind::Line | ChartKind::Bar => {
            layout["xaxis"] = json!({"showgrid": false, "type": "category"});
            layout["yaxis"] = y_axis(spec);
        }
    }

    layout
}

fn y_axis(spec: &ChartSpec) -> Value {
    let mut axis = json!({
        "rangemode": "tozero",
        "showgrid": true,
        "gridcolor": "#eee",
        "zeroline": false,
    });

    if spec.value_format == ValueFormat::Millions {
        let ticks = axis_ticks(&spec.dataset.values, MAGNITUDE_TICKS);
        let labels: Vec<String> = ticks.iter().map(|tick| format_millions(*tick)).collect();
        axis["tickmode"] = json!("array");
        axis["tickvals"] = json!(ticks);
        axis["ticktext"] = json!(labels);
    }

    axis
}

/// Evenly spaced ticks from zero up to the first tick at or above the
/// largest value, on a 1/2/2.5/5 step.
pub fn axis_ticks(values: &[f64], intervals: usize) -> Vec<f64> {
    let max = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 || intervals == 0 {
        return vec![0.0];
    }

    let step = nice_step(max / intervals as f64);
    let mut ticks = vec![0.0];
    let mut index = 1.0;
    while ticks[ticks.len() - 1] < max {
        ticks.push(index * step);
        index += 1.0;
    }
    ticks
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10_f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
