//! Browser bindings for the booking dashboard.
//!
//! The module mounts a [`DashboardController`] on the server-rendered page
//! once the DOM is ready and exports a few helpers to JavaScript.

use std::cell::RefCell;

use dashboard::toast::show_toast;
use dashboard::{DashboardController, DashboardError, Platform, ToastKind};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod api_client;
pub mod charts;
pub mod page;
pub mod scheduler;
pub mod settings;

pub use api_client::FetchTransport;
pub use charts::PlotlyCharts;
pub use page::BrowserPage;
pub use scheduler::GlooScheduler;

/// The real browser: web-sys DOM, Plotly.js, fetch and gloo timers.
pub struct Browser;

impl Platform for Browser {
    type Page = BrowserPage;
    type Charts = PlotlyCharts;
    type Transport = FetchTransport;
    type Scheduler = GlooScheduler;
}

pub type BrowserController = DashboardController<Browser>;

thread_local! {
    static MOUNTED: RefCell<Option<BrowserController>> = RefCell::new(None);
}

fn js_error(err: DashboardError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Builds and starts a controller over the current document.
pub fn mount() -> dashboard::Result<BrowserController> {
    let window = web_sys::window()
        .ok_or_else(|| DashboardError::Dom("No window available".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| DashboardError::Dom("No document available".to_string()))?;

    let config = settings::get_settings().dashboard_config(&window, &document);
    log::debug!("Dashboard config: {:?}", config);

    Ok(DashboardController::mount(
        config,
        BrowserPage::new(document),
        PlotlyCharts,
        FetchTransport,
        GlooScheduler,
    ))
}

/// Makes `controller` the page's dashboard and shuts the previous one down,
/// which also disarms its listeners.
fn install(controller: BrowserController) {
    let previous = MOUNTED.with(|slot| slot.borrow_mut().replace(controller));
    if let Some(previous) = previous {
        log::debug!("Replacing mounted dashboard");
        previous.shutdown();
    }
}

fn mount_on_load() {
    match mount() {
        Ok(controller) => install(controller),
        Err(err) => log::error!("Failed to mount dashboard: {}", err),
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    // Initialize settings first
    settings::init_settings();

    // Initialize logger with settings
    let settings = settings::get_settings();
    wasm_logger::init(wasm_logger::Config::new(settings.log_level));

    log::info!("=== Bookutu Dashboard Starting ===");
    log::debug!("Application settings: {:?}", settings);

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        log::warn!("No document, dashboard not mounted");
        return;
    };

    if document.ready_state() == "loading" {
        log::trace!("Waiting for DOMContentLoaded");
        let on_ready = Closure::<dyn FnMut()>::new(mount_on_load);
        if let Err(err) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
        {
            log::error!("Failed to wait for DOMContentLoaded: {:?}", err);
        }
        on_ready.forget();
    } else {
        mount_on_load();
    }
}

/// JavaScript handle on a mounted dashboard.
#[wasm_bindgen]
pub struct DashboardHandle {
    controller: BrowserController,
}

#[wasm_bindgen]
impl DashboardHandle {
    /// Stops the live stats poll and disarms the page listeners. Returns
    /// whether the poll was running.
    pub fn shutdown(&self) -> bool {
        self.controller.shutdown()
    }

    #[wasm_bindgen(js_name = isStopped)]
    pub fn is_stopped(&self) -> bool {
        self.controller.is_stopped()
    }

    #[wasm_bindgen(js_name = isPolling)]
    pub fn is_polling(&self) -> bool {
        self.controller.is_polling()
    }

    #[wasm_bindgen(js_name = chartNames)]
    pub fn chart_names(&self) -> js_sys::Array {
        self.controller
            .chart_names()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Runs one stats refresh now; resolves with the number of cards updated.
    #[wasm_bindgen(js_name = refreshStats)]
    pub fn refresh_stats(&self) -> js_sys::Promise {
        let controller = self.controller.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let updated = controller.refresh_live_stats().await;
            Ok(JsValue::from(updated as u32))
        })
    }

    /// Same as picking `period` on the chart's period selector.
    #[wasm_bindgen(js_name = updateChartPeriod)]
    pub fn update_chart_period(&self, chart: String, period: String) -> js_sys::Promise {
        let controller = self.controller.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            controller.update_chart_period(&chart, &period).await;
            Ok(JsValue::UNDEFINED)
        })
    }
}

/// Mounts the dashboard now, replacing the one mounted at load.
#[wasm_bindgen(js_name = mountDashboard)]
pub fn mount_dashboard() -> Result<DashboardHandle, JsValue> {
    let controller = mount().map_err(js_error)?;
    install(controller.clone());
    Ok(DashboardHandle { controller })
}

/// Stops and releases the mounted dashboard.
#[wasm_bindgen(js_name = shutdownDashboard)]
pub fn shutdown_dashboard() -> bool {
    let mounted = MOUNTED.with(|slot| slot.borrow_mut().take());
    mounted.map(|controller| controller.shutdown()).unwrap_or(false)
}

#[wasm_bindgen(js_name = showToast)]
pub fn show_toast_js(message: &str, kind: Option<String>) -> Result<(), JsValue> {
    let page = BrowserPage::from_window().map_err(js_error)?;
    let kind = kind.as_deref().map(ToastKind::from_name).unwrap_or_default();
    show_toast(&page, &GlooScheduler, message, kind).map_err(js_error)?;
    Ok(())
}

#[wasm_bindgen(js_name = formatCurrency)]
pub fn format_currency(amount: f64) -> String {
    common::format_currency(amount)
}

#[wasm_bindgen(js_name = formatDate)]
pub fn format_date(input: &str) -> Result<String, JsValue> {
    common::format_date(input).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = formatStatValue)]
pub fn format_stat_value(key: &str, value: f64) -> String {
    common::format_stat_value(key, value)
}
