//! Controller for the server-rendered booking dashboard.
//!
//! The controller draws the bookings and revenue charts, reloads a chart when
//! its period selector changes, polls the live stats endpoint and wires the
//! layout controls. It talks to the page only through the traits in
//! [`platform`], so everything here runs natively under test.

pub mod charts;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod figure;
pub mod live_stats;
pub mod platform;
pub mod refresh;
pub mod toast;

#[cfg(test)]
mod testing;

pub use charts::{ChartKind, ChartSpec, anchor_id};
pub use config::{DashboardConfig, DashboardMode, DefaultSeries, InjectedSeries, SeriesConfig};
pub use controller::DashboardController;
pub use error::{DashboardError, Result};
pub use figure::{Figure, figure};
pub use platform::{ApiRequest, ApiResponse, ChartBackend, Page, Platform, Scheduler, Transport};
pub use toast::{Toast, ToastKind, show_toast};
