use futures::future::LocalBoxFuture;
use log::{debug, error, info};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::charts::{ChartSpec, KNOWN_CHARTS, anchor_id};
use crate::config::{DashboardConfig, DefaultSeries};
use crate::platform::{ChartBackend, Page, Platform, Scheduler};

/// Header carrying the anti-forgery token on every dashboard request.
pub const CSRF_HEADER: &str = "X-CSRFToken";

type Handle<P> = <<P as Platform>::Charts as ChartBackend>::Handle;
type Interval<P> = <<P as Platform>::Scheduler as Scheduler>::Interval;

/// A chart drawn at bootstrap, together with the [`ChartSpec`] it currently shows.
pub struct RegisteredChart<H> {
    pub spec: ChartSpec,
    pub handle: H,
}

pub(crate) struct Inner<P: Platform> {
    pub(crate) config: DashboardConfig,
    pub(crate) series: DefaultSeries,
    pub(crate) page: P::Page,
    pub(crate) charts: P::Charts,
    pub(crate) transport: P::Transport,
    pub(crate) scheduler: P::Scheduler,
    pub(crate) registry: RefCell<HashMap<String, RegisteredChart<Handle<P>>>>,
    pub(crate) poller: RefCell<Option<Interval<P>>>,
    pub(crate) stopped: Cell<bool>,
}

/// Drives one dashboard page: charts, listeners and the live stats poll.
///
/// Cloning is cheap and yields another handle to the same controller.
/// Listeners and timer callbacks only hold weak handles, so dropping the
/// last clone tears the controller down and cancels the poll. A controller
/// that is still referenced is torn down with [`shutdown`](Self::shutdown).
pub struct DashboardController<P: Platform> {
    pub(crate) inner: Rc<Inner<P>>,
}

impl<P: Platform> Clone for DashboardController<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub(crate) struct WeakController<P: Platform>(Weak<Inner<P>>);

impl<P: Platform> WeakController<P> {
    pub(crate) fn upgrade(&self) -> Option<DashboardController<P>> {
        self.0.upgrade().map(|inner| DashboardController { inner })
    }
}

impl<P: Platform> DashboardController<P> {
    /// Builds a controller without touching the page.
    ///
    /// The series configuration is resolved here, once.
    pub fn new(
        config: DashboardConfig,
        page: P::Page,
        charts: P::Charts,
        transport: P::Transport,
        scheduler: P::Scheduler,
    ) -> Self {
        let series = config.series.clone().resolve();
        Self {
            inner: Rc::new(Inner {
                config,
                series,
                page,
                charts,
                transport,
                scheduler,
                registry: RefCell::new(HashMap::new()),
                poller: RefCell::new(None),
                stopped: Cell::new(false),
            }),
        }
    }

    /// Builds a controller and runs [`start`](Self::start) on it.
    pub fn mount(
        config: DashboardConfig,
        page: P::Page,
        charts: P::Charts,
        transport: P::Transport,
        scheduler: P::Scheduler,
    ) -> Self {
        let controller = Self::new(config, page, charts, transport, scheduler);
        controller.start();
        controller
    }

    /// Bootstraps charts, wires listeners and starts the live stats poll.
    pub fn start(&self) {
        info!("Starting dashboard in {:?} mode", self.inner.config.mode);
        let charts = self.bootstrap_charts();
        let listeners = self.wire_events();
        let polling = self.start_live_stats();
        info!(
            "Dashboard started: {} chart(s), {} listener(s), polling={}",
            charts, listeners, polling
        );
    }

    /// Cancels the stats poll and disarms every listener this controller
    /// attached. Returns whether a poll was running.
    ///
    /// Listeners stay registered on the page but ignore further events, so a
    /// replacement controller can be mounted on the same markup.
    pub fn shutdown(&self) -> bool {
        if !self.inner.stopped.replace(true) {
            info!("Shutting down dashboard");
        }
        self.stop_live_stats()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn page(&self) -> &P::Page {
        &self.inner.page
    }

    pub fn scheduler(&self) -> &P::Scheduler {
        &self.inner.scheduler
    }

    /// Draws every known chart whose anchor is on the page.
    ///
    /// Absent anchors are skipped; a chart the library refuses is logged and
    /// left unregistered. Returns the number of charts registered by this call.
    pub fn bootstrap_charts(&self) -> usize {
        let inner = &self.inner;
        let mut created = 0;

        for name in KNOWN_CHARTS {
            if self.has_chart(name) {
                debug!("Chart {} already registered, skipping", name);
                continue;
            }

            let anchor = anchor_id(name);
            if inner.page.element_by_id(&anchor).is_none() {
                debug!("No #{} anchor on this page, skipping {} chart", anchor, name);
                continue;
            }

            let Some(spec) = ChartSpec::for_chart(name, inner.config.mode, &inner.series) else {
                continue;
            };

            match inner.charts.create(&anchor, &spec) {
                Ok(handle) => {
                    debug!("Rendered {} chart with {} point(s)", name, spec.dataset.values.len());
                    inner.registry.borrow_mut().insert(
                        name.to_string(),
                        RegisteredChart { spec, handle },
                    );
                    created += 1;
                }
                Err(err) => error!("Failed to render {} chart: {}", name, err),
            }
        }

        created
    }

    pub fn has_chart(&self, name: &str) -> bool {
        self.inner.registry.borrow().contains_key(name)
    }

    /// Registered chart names, sorted.
    pub fn chart_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.registry.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// The [`ChartSpec`] a registered chart currently shows.
    pub fn chart_spec(&self, name: &str) -> Option<ChartSpec> {
        self.inner
            .registry
            .borrow()
            .get(name)
            .map(|chart| chart.spec.clone())
    }

    /// Token from the page's CSRF holder, empty when there is none.
    pub fn csrf_token(&self) -> String {
        let page = &self.inner.page;
        page.query(&self.inner.config.csrf_selector)
            .and_then(|holder| page.value(&holder))
            .unwrap_or_default()
    }

    pub(crate) fn downgrade(&self) -> WeakController<P> {
        WeakController(Rc::downgrade(&self.inner))
    }

    pub(crate) fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.inner.scheduler.spawn(task);
    }
}
