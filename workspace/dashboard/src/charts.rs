//! Declarative descriptions of the dashboard charts.
//!
//! A [`ChartSpec`] is what the controller hands to the charting library at
//! bootstrap and again on every redraw. Refreshes update the stored `ChartSpec`
//! and ask the library to draw it again.

use common::SeriesPayload;

use crate::config::{DashboardMode, DefaultSeries};

pub const BOOKINGS: &str = "bookings";
pub const REVENUE: &str = "revenue";

/// Charts the controller knows how to bootstrap, in bootstrap order.
pub const KNOWN_CHARTS: [&str; 2] = [BOOKINGS, REVENUE];

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const OPERATOR_LABELS: [&str; 4] = ["Jaguar Coaches", "Gateway Bus", "Mega Bus", "Others"];

pub const ROUTE_LABELS: [&str; 5] = [
    "Kampala-Gulu",
    "Kampala-Mbarara",
    "Kampala-Jinja",
    "Kampala-Lira",
    "Kampala-Fort Portal",
];

const SKY: &str = "rgba(14, 165, 233, 0.8)";
const FUCHSIA: &str = "rgba(217, 70, 239, 0.8)";
const TEAL: &str = "rgba(20, 184, 166, 0.8)";
const GRAY: &str = "rgba(156, 163, 175, 0.8)";
const AMBER: &str = "rgba(245, 158, 11, 0.8)";
const VIOLET: &str = "rgba(139, 92, 246, 0.8)";

/// Id of the element a chart is mounted on.
pub fn anchor_id(chart: &str) -> String {
    format!("{}Chart", chart)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Smoothed line with the area below filled.
    Line,
    /// Share of a whole, drawn as a ring.
    Doughnut,
    /// One bar per label.
    Bar,
}

/// How values are printed on the magnitude axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Plain,
    /// `UGX 1.2M`
    Millions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Hidden,
    Right,
}

/// The single dataset every dashboard chart draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: Option<&'static str>,
    pub values: Vec<f64>,
    /// Per-point colours for bars and slices.
    pub palette: Vec<&'static str>,
    pub stroke: Option<&'static str>,
    pub fill: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub dataset: Dataset,
    pub value_format: ValueFormat,
    pub legend: LegendPosition,
}

impl ChartSpec {
    /// Weekly booking trend.
    pub fn bookings(values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Line,
            labels: to_labels(&WEEKDAY_LABELS),
            dataset: Dataset {
                label: Some("Bookings"),
                values,
                palette: Vec::new(),
                stroke: Some("#0ea5e9"),
                fill: Some("rgba(14, 165, 233, 0.1)"),
            },
            value_format: ValueFormat::Plain,
            legend: LegendPosition::Hidden,
        }
    }

    /// Revenue share per operator, shown to administrators.
    pub fn revenue_share(values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Doughnut,
            labels: to_labels(&OPERATOR_LABELS),
            dataset: Dataset {
                label: None,
                values,
                palette: vec![SKY, FUCHSIA, TEAL, GRAY],
                stroke: None,
                fill: None,
            },
            value_format: ValueFormat::Plain,
            legend: LegendPosition::Right,
        }
    }

    /// Revenue per route, shown to operators.
    pub fn route_revenue(values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Bar,
            labels: to_labels(&ROUTE_LABELS),
            dataset: Dataset {
                label: Some("Revenue (UGX)"),
                values,
                palette: vec![SKY, FUCHSIA, TEAL, AMBER, VIOLET],
                stroke: None,
                fill: None,
            },
            value_format: ValueFormat::Millions,
            legend: LegendPosition::Hidden,
        }
    }

    pub fn revenue(mode: DashboardMode, series: &DefaultSeries) -> Self {
        match mode {
            DashboardMode::Admin => Self::revenue_share(series.revenue_distribution.clone()),
            DashboardMode::Operator => Self::route_revenue(series.route_revenue.clone()),
        }
    }

    /// Spec for one of the [`KNOWN_CHARTS`].
    pub fn for_chart(chart: &str, mode: DashboardMode, series: &DefaultSeries) -> Option<Self> {
        match chart {
            BOOKINGS => Some(Self::bookings(series.weekly_bookings.clone())),
            REVENUE => Some(Self::revenue(mode, series)),
            _ => None,
        }
    }

    /// Replaces the dataset values and, when given, the labels.
    pub fn apply(&mut self, payload: &SeriesPayload) {
        self.dataset.values = payload.values.clone();
        if let Some(labels) = &payload.labels {
            self.labels = labels.clone();
        }
    }
}

fn to_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}
