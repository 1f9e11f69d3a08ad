use std::cell::RefCell;
use std::time::Duration;

use dashboard::config::{DEFAULT_API_BASE, DEFAULT_CSRF_SELECTOR, DEFAULT_STATS_INTERVAL};
use dashboard::{DashboardConfig, DashboardMode, InjectedSeries};
use log::Level;
use wasm_bindgen::JsValue;
use web_sys::{window, Document, Window};

/// Body class marking the administrators' dashboard.
pub const ADMIN_BODY_CLASS: &str = "admin-dashboard";

/// Global application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Prefix of the dashboard endpoints (e.g. "/api/dashboard")
    pub api_base: String,

    /// Default log level for the application
    pub log_level: Level,

    /// Live stats refresh period in milliseconds
    pub stats_interval_ms: u32,

    /// Selector of the element holding the CSRF token
    pub csrf_selector: String,

    /// Enable debug mode
    pub debug_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            log_level: Level::Info,
            stats_interval_ms: DEFAULT_STATS_INTERVAL.as_millis() as u32,
            csrf_selector: DEFAULT_CSRF_SELECTOR.to_string(),
            debug_mode: false,
        }
    }
}

impl AppSettings {
    /// Create settings from environment/window location
    pub fn from_environment() -> Self {
        let mut settings = Self::default();

        let Some(window) = window() else {
            return settings;
        };

        // Local development gets verbose logging
        if let Ok(hostname) = window.location().hostname() {
            settings.debug_mode = hostname == "localhost" || hostname == "127.0.0.1";
            if settings.debug_mode {
                settings.log_level = Level::Debug;
            }
        }

        // Overrides from localStorage
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(Some(api_base)) = storage.get_item("bookutu_api_base") {
                settings.api_base = api_base;
            }

            if let Ok(Some(log_level)) = storage.get_item("bookutu_log_level") {
                settings.log_level = parse_level(&log_level).unwrap_or(settings.log_level);
            }

            if let Ok(Some(interval)) = storage.get_item("bookutu_stats_interval_ms") {
                match interval.parse::<u32>() {
                    Ok(value) if value > 0 => settings.stats_interval_ms = value,
                    _ => log::warn!("Ignoring invalid bookutu_stats_interval_ms: {}", interval),
                }
            }
        }

        settings
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.stats_interval_ms))
    }

    /// Controller configuration for the page currently loaded.
    pub fn dashboard_config(&self, window: &Window, document: &Document) -> DashboardConfig {
        DashboardConfig {
            csrf_selector: self.csrf_selector.clone(),
            ..DashboardConfig::default()
        }
        .with_mode(page_mode(document))
        .with_api_base(self.api_base.as_str())
        .with_stats_interval(self.stats_interval())
        .with_injected(injected_series(window))
    }
}

fn parse_level(name: &str) -> Option<Level> {
    match name.trim().to_lowercase().as_str() {
        "error" => Some(Level::Error),
        "warn" => Some(Level::Warn),
        "info" => Some(Level::Info),
        "debug" => Some(Level::Debug),
        "trace" => Some(Level::Trace),
        _ => None,
    }
}

/// Admin when the body carries [`ADMIN_BODY_CLASS`].
pub fn page_mode(document: &Document) -> DashboardMode {
    let is_admin = document
        .body()
        .map(|body| body.class_list().contains(ADMIN_BODY_CLASS))
        .unwrap_or(false);
    DashboardMode::from_admin_flag(is_admin)
}

/// Series the server inlined as window globals.
pub fn injected_series(window: &Window) -> InjectedSeries {
    InjectedSeries {
        weekly_bookings: read_series(window, "weeklyBookingsData"),
        revenue_distribution: read_series(window, "revenueDistributionData"),
        route_revenue: read_series(window, "routeRevenueData"),
    }
}

fn read_series(window: &Window, name: &str) -> Option<Vec<f64>> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }

    match serde_wasm_bindgen::from_value::<Vec<f64>>(value) {
        Ok(series) => {
            log::debug!("Using injected {} ({} values)", name, series.len());
            Some(series)
        }
        Err(err) => {
            log::warn!("Ignoring malformed {}: {}", name, err);
            None
        }
    }
}

thread_local! {
    static SETTINGS: RefCell<AppSettings> = RefCell::new(AppSettings::from_environment());
}

/// Get a copy of the current settings
pub fn get_settings() -> AppSettings {
    SETTINGS.with(|s| s.borrow().clone())
}

/// Initialize settings (call this at app startup)
pub fn init_settings() {
    SETTINGS.with(|s| {
        *s.borrow_mut() = AppSettings::from_environment();
    });
}
