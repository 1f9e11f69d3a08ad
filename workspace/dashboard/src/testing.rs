//! In-memory platform for the unit tests. Timers run on tokio's paused clock.

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::{self, JoinHandle, LocalSet};
use tokio::time::{self, Instant, Sleep};

use crate::charts::ChartSpec;
use crate::config::DashboardConfig;
use crate::controller::DashboardController;
use crate::error::{DashboardError, Result};
use crate::figure::figure;
use crate::platform::{ApiRequest, ApiResponse, ChartBackend, Page, Platform, Scheduler, Transport};

// Page

type Listener = Rc<RefCell<Box<dyn FnMut()>>>;

#[derive(Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    text: String,
    value: Option<String>,
    parent: Option<usize>,
    attached: bool,
    listeners: Vec<(String, Listener)>,
    class_ops: Vec<String>,
}

impl Node {
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => Some(self.classes.join(" ")),
            _ => self.attributes.get(name).cloned(),
        }
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.id.as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.classes.iter().any(|c| c == class);
        }
        if let Some(attr) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match attr.split_once('=') {
                Some((name, value)) => {
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value);
                    self.attribute(name) == Some(unescape(value))
                }
                None => self.attribute(attr).is_some(),
            };
        }
        self.tag == selector
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// A flat DOM supporting `#id`, `.class`, `[attr]`, `[attr=value]` and tag
/// selectors. Elements are indices into the node list.
#[derive(Clone, Default)]
pub struct FakePage {
    dom: Rc<RefCell<Vec<Node>>>,
}

pub struct ElementBuilder<'a> {
    page: &'a FakePage,
    node: Node,
}

impl ElementBuilder<'_> {
    pub fn id(mut self, id: &str) -> Self {
        self.node.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.node.classes.extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.node.value = Some(value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_string();
        self
    }

    pub fn child_of(mut self, parent: usize) -> Self {
        self.node.parent = Some(parent);
        self
    }

    pub fn build(mut self) -> usize {
        self.node.attached = true;
        let mut dom = self.page.dom.borrow_mut();
        dom.push(self.node);
        dom.len() - 1
    }
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            page: self,
            node: Node {
                tag: tag.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn text(&self, element: usize) -> String {
        self.dom.borrow()[element].text.clone()
    }

    pub fn classes(&self, element: usize) -> Vec<String> {
        self.dom.borrow()[element].classes.clone()
    }

    /// Every add/remove/toggle on the element, as `+class` or `-class`.
    pub fn class_ops(&self, element: usize) -> Vec<String> {
        self.dom.borrow()[element].class_ops.clone()
    }

    pub fn set_value(&self, element: usize, value: &str) {
        self.dom.borrow_mut()[element].value = Some(value.to_string());
    }

    pub fn is_attached(&self, element: usize) -> bool {
        self.dom.borrow()[element].attached
    }

    pub fn listener_count(&self, element: usize, event: &str) -> usize {
        self.dom.borrow()[element]
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Runs the listeners registered for `event` on `element`.
    pub fn dispatch(&self, element: usize, event: &str) -> usize {
        let listeners: Vec<Listener> = self.dom.borrow()[element]
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &listeners {
            let mut handler = listener.borrow_mut();
            (&mut **handler)();
        }
        listeners.len()
    }

    fn set_class(&self, element: usize, class: &str, present: bool) {
        let mut dom = self.dom.borrow_mut();
        let node = &mut dom[element];
        node.classes.retain(|c| c != class);
        if present {
            node.classes.push(class.to_string());
            node.class_ops.push(format!("+{}", class));
        } else {
            node.class_ops.push(format!("-{}", class));
        }
    }
}

impl Page for FakePage {
    type Element = usize;

    fn query(&self, selector: &str) -> Option<usize> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.dom
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.attached && node.matches(selector))
            .map(|(index, _)| index)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<usize> {
        self.query(&format!("#{}", id))
    }

    fn closest(&self, element: &usize, selector: &str) -> Option<usize> {
        let dom = self.dom.borrow();
        let mut current = Some(*element);
        while let Some(index) = current {
            if dom[index].matches(selector) {
                return Some(index);
            }
            current = dom[index].parent;
        }
        None
    }

    fn has_class(&self, element: &usize, class: &str) -> bool {
        self.dom.borrow()[*element].classes.iter().any(|c| c == class)
    }

    fn add_class(&self, element: &usize, class: &str) {
        self.set_class(*element, class, true);
    }

    fn remove_class(&self, element: &usize, class: &str) {
        self.set_class(*element, class, false);
    }

    fn toggle_class(&self, element: &usize, class: &str) -> bool {
        let present = !self.has_class(element, class);
        self.set_class(*element, class, present);
        present
    }

    fn set_text(&self, element: &usize, text: &str) {
        self.dom.borrow_mut()[*element].text = text.to_string();
    }

    fn value(&self, element: &usize) -> Option<String> {
        self.dom.borrow()[*element].value.clone()
    }

    fn data(&self, element: &usize, key: &str) -> Option<String> {
        self.dom.borrow()[*element].attribute(&format!("data-{}", key))
    }

    fn create_element(&self, tag: &str, class_name: &str, text: &str) -> Result<usize> {
        let mut dom = self.dom.borrow_mut();
        dom.push(Node {
            tag: tag.to_string(),
            classes: class_name.split_whitespace().map(str::to_string).collect(),
            text: text.to_string(),
            ..Default::default()
        });
        Ok(dom.len() - 1)
    }

    fn append_to_body(&self, element: &usize) -> Result<()> {
        let mut dom = self.dom.borrow_mut();
        let node = &mut dom[*element];
        node.parent = None;
        node.attached = true;
        Ok(())
    }

    fn remove_element(&self, element: &usize) {
        self.dom.borrow_mut()[*element].attached = false;
    }

    fn listen(&self, element: &usize, event: &str, handler: Box<dyn FnMut()>) -> Result<()> {
        self.dom.borrow_mut()[*element]
            .listeners
            .push((event.to_string(), Rc::new(RefCell::new(handler))));
        Ok(())
    }
}

// Charts

#[derive(Default)]
struct ChartsState {
    drawn: Vec<(String, ChartSpec)>,
    updates: Vec<usize>,
    failing: Vec<String>,
}

/// Records what would have been drawn. Every spec also goes through the
/// Plotly translation so an untranslatable spec fails the test.
#[derive(Clone, Default)]
pub struct FakeCharts {
    state: Rc<RefCell<ChartsState>>,
}

impl FakeCharts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create` fail for `anchor`.
    pub fn fail_on(&self, anchor: &str) {
        self.state.borrow_mut().failing.push(anchor.to_string());
    }

    /// Anchors drawn so far, in creation order.
    pub fn created(&self) -> Vec<String> {
        self.state
            .borrow()
            .drawn
            .iter()
            .map(|(anchor, _)| anchor.clone())
            .collect()
    }

    /// Spec currently drawn on `anchor`.
    pub fn drawn(&self, anchor: &str) -> Option<ChartSpec> {
        self.state
            .borrow()
            .drawn
            .iter()
            .find(|(drawn, _)| drawn == anchor)
            .map(|(_, spec)| spec.clone())
    }

    pub fn update_count(&self) -> usize {
        self.state.borrow().updates.len()
    }
}

impl ChartBackend for FakeCharts {
    type Handle = usize;

    fn create(&self, anchor_id: &str, spec: &ChartSpec) -> Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.failing.iter().any(|anchor| anchor == anchor_id) {
            return Err(DashboardError::Chart(format!("cannot draw on #{}", anchor_id)));
        }
        figure(spec)?;
        state.drawn.push((anchor_id.to_string(), spec.clone()));
        Ok(state.drawn.len() - 1)
    }

    fn update(&self, handle: &usize, spec: &ChartSpec) -> Result<()> {
        figure(spec)?;
        let mut state = self.state.borrow_mut();
        state.drawn[*handle].1 = spec.clone();
        state.updates.push(*handle);
        Ok(())
    }
}

// Transport

#[derive(Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
}

#[derive(Clone)]
struct Script {
    url_contains: String,
    reply: Reply,
    delay: Duration,
    repeat: bool,
}

#[derive(Default)]
struct TransportState {
    scripts: Vec<Script>,
    requests: Vec<ApiRequest>,
}

/// Answers requests from scripted replies matched by URL substring, in
/// script order. Unscripted requests fail as network errors.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<TransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, url_contains: &str, reply: Reply, delay: Duration, repeat: bool) {
        self.state.borrow_mut().scripts.push(Script {
            url_contains: url_contains.to_string(),
            reply,
            delay,
            repeat,
        });
    }

    /// Answers the next matching request once.
    pub fn respond(&self, url_contains: &str, status: u16, body: &str) {
        self.respond_after(url_contains, status, body, Duration::ZERO);
    }

    pub fn respond_after(&self, url_contains: &str, status: u16, body: &str, delay: Duration) {
        let reply = Reply::Respond(ApiResponse::new(status, body));
        self.script(url_contains, reply, delay, false);
    }

    /// Answers every matching request.
    pub fn respond_always(&self, url_contains: &str, status: u16, body: &str) {
        let reply = Reply::Respond(ApiResponse::new(status, body));
        self.script(url_contains, reply, Duration::ZERO, true);
    }

    /// Fails the next matching request with a network error.
    pub fn fail(&self, url_contains: &str, message: &str) {
        self.script(url_contains, Reply::Fail(message.to_string()), Duration::ZERO, false);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self, url_contains: &str) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|request| request.url.contains(url_contains))
            .count()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse> {
        let script = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request.clone());
            let position = state
                .scripts
                .iter()
                .position(|script| request.url.contains(&script.url_contains));
            match position {
                Some(index) if state.scripts[index].repeat => Some(state.scripts[index].clone()),
                Some(index) => Some(state.scripts.remove(index)),
                None => None,
            }
        };

        let Some(script) = script else {
            return Err(DashboardError::Network(format!("no reply scripted for {}", request.url)));
        };

        if !script.delay.is_zero() {
            time::sleep(script.delay).await;
        }

        match script.reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(message) => Err(DashboardError::Network(message)),
        }
    }
}

// Scheduler

#[derive(Default)]
struct TimerLog {
    sleeps: Vec<Duration>,
    intervals: usize,
}

/// Aborts its ticking task when dropped.
pub struct IntervalTask {
    task: JoinHandle<()>,
    log: Rc<RefCell<TimerLog>>,
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        self.task.abort();
        self.log.borrow_mut().intervals -= 1;
    }
}

/// Tokio timers and `spawn_local`. Tests run on a paused clock inside a
/// [`LocalSet`], see [`run_local`].
#[derive(Clone, Default)]
pub struct TokioScheduler {
    log: Rc<RefCell<TimerLog>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.log.borrow().sleeps.clone()
    }

    pub fn active_intervals(&self) -> usize {
        self.log.borrow().intervals
    }
}

impl Scheduler for TokioScheduler {
    type Sleep = Sleep;
    type Interval = IntervalTask;

    fn sleep(&self, duration: Duration) -> Sleep {
        self.log.borrow_mut().sleeps.push(duration);
        time::sleep(duration)
    }

    fn interval(&self, period: Duration, mut tick: Box<dyn FnMut()>) -> IntervalTask {
        // First tick one period from now, like setInterval
        let mut interval = time::interval_at(Instant::now() + period, period);
        let handle = task::spawn_local(async move {
            loop {
                interval.tick().await;
                tick();
            }
        });

        self.log.borrow_mut().intervals += 1;
        IntervalTask {
            task: handle,
            log: Rc::clone(&self.log),
        }
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        task::spawn_local(future);
    }
}

/// Runs `test` on a [`LocalSet`] so the controller can spawn `!Send` tasks.
pub async fn run_local<F: Future>(test: F) -> F::Output {
    LocalSet::new().run_until(test).await
}

// Harness

pub struct TestPlatform;

impl Platform for TestPlatform {
    type Page = FakePage;
    type Charts = FakeCharts;
    type Transport = FakeTransport;
    type Scheduler = TokioScheduler;
}

pub const CSRF_TOKEN: &str = "test-csrf-token";

/// Fake platform pieces for one page.
pub struct Harness {
    pub page: FakePage,
    pub charts: FakeCharts,
    pub transport: FakeTransport,
    pub scheduler: TokioScheduler,
}

impl Harness {
    /// A blank page.
    pub fn empty() -> Self {
        Self {
            page: FakePage::new(),
            charts: FakeCharts::new(),
            transport: FakeTransport::new(),
            scheduler: TokioScheduler::new(),
        }
    }

    /// A page with the full dashboard markup: both chart containers, the
    /// layout controls, a period selector per chart, stat cards and the CSRF
    /// token input.
    pub fn new() -> Self {
        let harness = Self::empty();
        let page = &harness.page;

        page.element("input")
            .attr("name", "csrfmiddlewaretoken")
            .value(CSRF_TOKEN)
            .build();
        page.element("aside").class("sidebar").build();
        page.element("main").class("main-content").build();
        page.element("button").class("mobile-menu-btn").build();
        page.element("button").class("notification-btn").build();
        page.element("div")
            .class("notification-dropdown hidden")
            .build();
        page.element("input").class("search-input").value("").build();

        for chart in ["bookings", "revenue"] {
            let container = page.element("div").class("chart-container").build();
            page.element("div")
                .id(&format!("{}Chart", chart))
                .child_of(container)
                .build();
            page.element("select")
                .class("chart-period-selector")
                .attr("data-chart", chart)
                .value("week")
                .build();
        }

        for stat in ["today_bookings", "today_revenue", "occupancy_rate", "active_buses"] {
            page.element("span").attr("data-stat", stat).text("-").build();
        }

        harness
    }

    /// The first element matching `selector`; panics when there is none.
    pub fn find(&self, selector: &str) -> usize {
        self.page
            .query(selector)
            .unwrap_or_else(|| panic!("no element matches {}", selector))
    }

    pub fn controller(&self, config: DashboardConfig) -> DashboardController<TestPlatform> {
        DashboardController::new(
            config,
            self.page.clone(),
            self.charts.clone(),
            self.transport.clone(),
            self.scheduler.clone(),
        )
    }

    pub fn mount(&self, config: DashboardConfig) -> DashboardController<TestPlatform> {
        let controller = self.controller(config);
        controller.start();
        controller
    }

    /// Moves the paused clock forward by `by`. The clock only advances while
    /// every task is idle, so timers due on the way fire and their tasks run
    /// before this returns.
    pub async fn advance(&self, by: Duration) {
        time::sleep(by).await;
    }

    /// Lets spawned tasks run until they all wait on something.
    pub async fn settle(&self) {
        self.advance(Duration::from_millis(1)).await;
    }
}
