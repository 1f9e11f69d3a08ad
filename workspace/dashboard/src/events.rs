use log::{debug, info, trace, warn};

use crate::controller::DashboardController;
use crate::platform::{Page, Platform};

pub const MENU_BUTTON: &str = ".mobile-menu-btn";
pub const SIDEBAR: &str = ".sidebar";
pub const MAIN_CONTENT: &str = ".main-content";
pub const NOTIFICATION_BUTTON: &str = ".notification-btn";
pub const NOTIFICATION_DROPDOWN: &str = ".notification-dropdown";
pub const SEARCH_INPUT: &str = ".search-input";
pub const PERIOD_SELECTOR: &str = ".chart-period-selector";

pub const SIDEBAR_HIDDEN: &str = "mobile-hidden";
pub const MAIN_EXPANDED: &str = "mobile-expanded";
pub const DROPDOWN_HIDDEN: &str = "hidden";

/// Normalizes a search box value before it is acted on.
pub fn search_query(raw: &str) -> String {
    raw.to_lowercase()
}

type Element<P> = <<P as Platform>::Page as Page>::Element;

impl<P: Platform> DashboardController<P> {
    /// Attaches the page listeners. Controls missing from the page are
    /// skipped. Returns the number of listeners attached.
    pub fn wire_events(&self) -> usize {
        let page = self.page().clone();
        let mut attached = 0;

        if let Some(button) = page.query(MENU_BUTTON) {
            attached += usize::from(self.attach(&button, "click", |controller, _| {
                controller.toggle_mobile_menu();
            }));
        }

        if let Some(button) = page.query(NOTIFICATION_BUTTON) {
            attached += usize::from(self.attach(&button, "click", |controller, _| {
                controller.toggle_notifications();
            }));
        }

        if let Some(input) = page.query(SEARCH_INPUT) {
            attached += usize::from(self.attach(&input, "input", |controller, input| {
                controller.handle_search(input);
            }));
        }

        for selector in page.query_all(PERIOD_SELECTOR) {
            attached += usize::from(self.attach(&selector, "change", |controller, selector| {
                controller.change_period(selector);
            }));
        }

        debug!("Attached {} dashboard listener(s)", attached);
        attached
    }

    fn attach<F>(&self, element: &Element<P>, event: &str, handler: F) -> bool
    where
        F: Fn(&DashboardController<P>, &Element<P>) + 'static,
    {
        let weak = self.downgrade();
        let target = element.clone();
        let event_name = event.to_string();
        let result = self.page().listen(
            element,
            event,
            Box::new(move || {
                match weak.upgrade() {
                    Some(controller) if !controller.is_stopped() => handler(&controller, &target),
                    _ => trace!("Ignoring {} on a shut down dashboard", event_name),
                }
            }),
        );

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to attach {} listener: {}", event, err);
                false
            }
        }
    }

    /// Flips the sidebar and main content between their mobile states.
    pub fn toggle_mobile_menu(&self) {
        let page = self.page();
        for (selector, class) in [(SIDEBAR, SIDEBAR_HIDDEN), (MAIN_CONTENT, MAIN_EXPANDED)] {
            match page.query(selector) {
                Some(element) => {
                    page.toggle_class(&element, class);
                }
                None => debug!("No {} on this page", selector),
            }
        }
    }

    /// Shows or hides the notification dropdown. Returns whether it is
    /// visible afterwards, or `None` when the page has no dropdown.
    pub fn toggle_notifications(&self) -> Option<bool> {
        let page = self.page();
        let dropdown = page.query(NOTIFICATION_DROPDOWN)?;
        let hidden = page.toggle_class(&dropdown, DROPDOWN_HIDDEN);
        Some(!hidden)
    }

    /// Reads the search box and logs the normalized query.
    pub fn handle_search(&self, input: &Element<P>) -> String {
        let query = search_query(&self.page().value(input).unwrap_or_default());
        info!("Searching for: {}", query);
        query
    }

    /// Starts a refresh for the chart named by the selector's `data-chart`
    /// attribute. Selectors without one are ignored.
    pub fn change_period(&self, selector: &Element<P>) -> bool {
        let page = self.page();
        let Some(chart) = page.data(selector, "chart") else {
            warn!("Period selector without a data-chart attribute, ignoring");
            return false;
        };
        let period = page.value(selector).unwrap_or_default();
        debug!("Period of {} chart changed to {}", chart, period);

        let controller = self.clone();
        self.spawn(Box::pin(async move {
            controller.update_chart_period(&chart, &period).await;
        }));
        true
    }
}
