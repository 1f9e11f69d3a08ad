use common::{StatsSnapshot, format_stat_value};
use log::{debug, error, info, trace};

use crate::controller::{CSRF_HEADER, DashboardController};
use crate::error::Result;
use crate::platform::{ApiRequest, Page, Platform, Scheduler, Transport};

/// Selector of the card showing the stat `key`.
pub fn stat_selector(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for ch in key.chars() {
        if ch == '"' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("[data-stat=\"{}\"]", escaped)
}

impl<P: Platform> DashboardController<P> {
    /// Starts the periodic stats refresh. Calling it again while the poll is
    /// running keeps the existing timer; a shut down controller never polls.
    pub fn start_live_stats(&self) -> bool {
        if self.is_stopped() {
            debug!("Dashboard is shut down, not polling");
            return false;
        }
        if self.is_polling() {
            debug!("Live stats already running");
            return false;
        }

        let period = self.inner.config.stats_interval;
        let weak = self.downgrade();
        let interval = self.inner.scheduler.interval(
            period,
            Box::new(move || {
                if let Some(controller) = weak.upgrade() {
                    let task = controller.clone();
                    controller.spawn(Box::pin(async move {
                        task.refresh_live_stats().await;
                    }));
                }
            }),
        );

        *self.inner.poller.borrow_mut() = Some(interval);
        info!("Live stats refresh every {:?}", period);
        true
    }

    /// Cancels the stats poll. Returns whether a poll was running.
    pub fn stop_live_stats(&self) -> bool {
        let poller = self.inner.poller.borrow_mut().take();
        match poller {
            Some(interval) => {
                drop(interval);
                info!("Live stats stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner.poller.borrow().is_some()
    }

    /// One refresh cycle. Returns the number of cards rewritten; failures
    /// are logged and leave the cards as they were.
    pub async fn refresh_live_stats(&self) -> usize {
        match self.fetch_live_stats().await {
            Ok(Some(snapshot)) => self.update_stat_cards(&snapshot),
            Ok(None) => 0,
            Err(err) => {
                error!("Error updating dashboard stats: {}", err);
                0
            }
        }
    }

    /// GETs `{api_base}/live-stats/`. A non-2xx answer is `Ok(None)`.
    pub async fn fetch_live_stats(&self) -> Result<Option<StatsSnapshot>> {
        let url = self.inner.config.live_stats_url();
        trace!("GET request to: {}", url);

        let request = ApiRequest::get(url.as_str()).header(CSRF_HEADER, &self.csrf_token());
        let response = self.inner.transport.get(request).await?;

        if !response.ok() {
            debug!("GET {} - HTTP {}, skipping this cycle", url, response.status);
            return Ok(None);
        }

        Ok(Some(response.json()?))
    }

    /// Writes every numeric stat into its `[data-stat]` card.
    pub fn update_stat_cards(&self, snapshot: &StatsSnapshot) -> usize {
        let page = &self.inner.page;

        for key in snapshot.skipped() {
            debug!("Stat {} is not a number, leaving its card alone", key);
        }

        let mut updated = 0;
        for (key, value) in snapshot.numeric() {
            if let Some(card) = page.query(&stat_selector(key)) {
                page.set_text(&card, &format_stat_value(key, value));
                updated += 1;
            }
        }
        updated
    }
}
