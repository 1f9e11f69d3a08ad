//! Seams between the controller and the environment it runs in.
//!
//! The browser bindings implement these traits over web-sys, Plotly.js,
//! gloo-net and gloo-timers; the test harness implements them in memory with
//! tokio's paused clock.

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

use crate::charts::ChartSpec;
use crate::error::Result;

/// Read/write access to the page the dashboard is mounted on.
///
/// Lookups return `None` for absent elements; mutations on an element are
/// best effort and never fail the caller.
pub trait Page: Clone + 'static {
    type Element: Clone + 'static;

    fn query(&self, selector: &str) -> Option<Self::Element>;

    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Nearest ancestor (or the element itself) matching `selector`.
    fn closest(&self, element: &Self::Element, selector: &str) -> Option<Self::Element>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_class(&self, element: &Self::Element, class: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Flips `class` and returns whether it is now present.
    fn toggle_class(&self, element: &Self::Element, class: &str) -> bool;

    fn set_text(&self, element: &Self::Element, text: &str);

    /// Current value of a form control.
    fn value(&self, element: &Self::Element) -> Option<String>;

    /// Value of the `data-{key}` attribute.
    fn data(&self, element: &Self::Element, key: &str) -> Option<String>;

    fn create_element(&self, tag: &str, class_name: &str, text: &str) -> Result<Self::Element>;

    fn append_to_body(&self, element: &Self::Element) -> Result<()>;

    fn remove_element(&self, element: &Self::Element);

    /// Attaches `handler` to `event` on `element` for the page's lifetime.
    fn listen(&self, element: &Self::Element, event: &str, handler: Box<dyn FnMut()>) -> Result<()>;
}

/// A charting library able to draw a [`ChartSpec`] and redraw it in place.
pub trait ChartBackend: 'static {
    type Handle: 'static;

    fn create(&self, anchor_id: &str, spec: &ChartSpec) -> Result<Self::Handle>;

    fn update(&self, handle: &Self::Handle, spec: &ChartSpec) -> Result<()>;
}

/// Outgoing GET request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client used for the dashboard endpoints.
#[async_trait(?Send)]
pub trait Transport: 'static {
    /// Resolves with any HTTP status; only transport failures are errors.
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Timers and task spawning on the page's event loop.
pub trait Scheduler: Clone + 'static {
    type Sleep: Future<Output = ()> + 'static;

    /// Repeating timer; dropping it cancels further ticks.
    type Interval: 'static;

    fn sleep(&self, duration: Duration) -> Self::Sleep;

    fn interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Self::Interval;

    /// Runs `task` detached; nobody observes its completion.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Bundles the environment types a controller is built on.
pub trait Platform: 'static {
    type Page: Page;
    type Charts: ChartBackend;
    type Transport: Transport;
    type Scheduler: Scheduler;
}
