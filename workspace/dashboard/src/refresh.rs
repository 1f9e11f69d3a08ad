use common::SeriesPayload;
use log::{debug, error, info, trace};

use crate::charts::anchor_id;
use crate::controller::{CSRF_HEADER, DashboardController};
use crate::error::{DashboardError, Result};
use crate::platform::{ApiRequest, ChartBackend, Page, Platform, Transport};

pub const LOADING_CLASS: &str = "loading";
pub const CHART_CONTAINER: &str = ".chart-container";

/// Clears the loading state of a chart container when dropped, whatever way
/// the refresh ended.
struct LoadingGuard<'a, P: Platform> {
    controller: &'a DashboardController<P>,
    chart: &'a str,
}

impl<'a, P: Platform> LoadingGuard<'a, P> {
    fn show(controller: &'a DashboardController<P>, chart: &'a str) -> Self {
        controller.show_chart_loading(chart);
        Self { controller, chart }
    }
}

impl<P: Platform> Drop for LoadingGuard<'_, P> {
    fn drop(&mut self) {
        self.controller.hide_chart_loading(self.chart);
    }
}

impl<P: Platform> DashboardController<P> {
    /// Reloads `chart` for `period`.
    ///
    /// Never fails: errors are logged and the chart keeps its data. The
    /// loading marker is cleared exactly once per call.
    pub async fn update_chart_period(&self, chart: &str, period: &str) {
        let _loading = LoadingGuard::show(self, chart);

        let result = match self.fetch_chart_data(chart, period).await {
            Ok(payload) => self.update_chart(chart, &payload),
            Err(err) => Err(err),
        };

        match result {
            Ok(true) => info!("Chart {} updated for period {}", chart, period),
            Ok(false) => debug!("Chart {} is not on this page, nothing to update", chart),
            Err(err) => error!("Error updating chart {}: {}", chart, err),
        }
    }

    /// GETs `{api_base}/{chart}-data/?period={period}`.
    pub async fn fetch_chart_data(&self, chart: &str, period: &str) -> Result<SeriesPayload> {
        let url = self.inner.config.chart_data_url(chart, period);
        debug!("GET request to: {}", url);

        let request = ApiRequest::get(url.as_str())
            .header(CSRF_HEADER, &self.csrf_token())
            .header("Content-Type", "application/json");
        let response = self.inner.transport.get(request).await?;

        if !response.ok() {
            error!("GET {} - HTTP error: {}", url, response.status);
            return Err(DashboardError::Http {
                url,
                status: response.status,
            });
        }

        trace!("GET {} - Response received, parsing JSON", url);
        let payload: SeriesPayload = response.json()?;
        debug!("GET {} - Parsed {} value(s)", url, payload.values.len());
        Ok(payload)
    }

    /// Applies `payload` to a registered chart and redraws it.
    ///
    /// Returns `Ok(false)` when no chart is registered under `chart`. If the
    /// redraw fails the stored spec is left as it was.
    pub fn update_chart(&self, chart: &str, payload: &SeriesPayload) -> Result<bool> {
        let mut registry = self.inner.registry.borrow_mut();
        let Some(entry) = registry.get_mut(chart) else {
            return Ok(false);
        };

        let mut spec = entry.spec.clone();
        spec.apply(payload);
        self.inner.charts.update(&entry.handle, &spec)?;
        entry.spec = spec;
        Ok(true)
    }

    /// Marks the chart's container as loading. Returns false when the chart
    /// has no container on the page.
    pub fn show_chart_loading(&self, chart: &str) -> bool {
        match self.chart_container(chart) {
            Some(container) => {
                self.inner.page.add_class(&container, LOADING_CLASS);
                true
            }
            None => {
                trace!("No {} around #{}", CHART_CONTAINER, anchor_id(chart));
                false
            }
        }
    }

    pub fn hide_chart_loading(&self, chart: &str) -> bool {
        match self.chart_container(chart) {
            Some(container) => {
                self.inner.page.remove_class(&container, LOADING_CLASS);
                true
            }
            None => false,
        }
    }

    fn chart_container(&self, chart: &str) -> Option<<P::Page as Page>::Element> {
        let page = &self.inner.page;
        let anchor = page.element_by_id(&anchor_id(chart))?;
        page.closest(&anchor, CHART_CONTAINER)
    }
}
