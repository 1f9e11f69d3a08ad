use log::debug;
use std::time::Duration;

use crate::error::Result;
use crate::platform::{Page, Scheduler};

/// Delay before the `show` class is added, so the entry transition runs.
pub const SHOW_DELAY: Duration = Duration::from_millis(100);
/// Time from creation until the toast starts hiding.
pub const DISMISS_AFTER: Duration = Duration::from_millis(3000);
/// Time between hiding and removing the element.
pub const REMOVE_DELAY: Duration = Duration::from_millis(300);

pub const SHOW_CLASS: &str = "show";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn class(self) -> &'static str {
        match self {
            ToastKind::Info => "toast-info",
            ToastKind::Success => "toast-success",
            ToastKind::Warning => "toast-warning",
            ToastKind::Error => "toast-error",
        }
    }

    /// Unknown names fall back to `Info`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => ToastKind::Success,
            "warning" => ToastKind::Warning,
            "error" => ToastKind::Error,
            _ => ToastKind::Info,
        }
    }
}

/// A transient notification appended to the page body.
pub struct Toast<P: Page> {
    page: P,
    element: P::Element,
}

impl<P: Page> Toast<P> {
    /// Appends the toast element. It stays invisible until [`run`](Self::run)
    /// adds the `show` class.
    pub fn attach(page: &P, message: &str, kind: ToastKind) -> Result<Self> {
        let element = page.create_element("div", &format!("toast {}", kind.class()), message)?;
        page.append_to_body(&element)?;
        Ok(Self {
            page: page.clone(),
            element,
        })
    }

    pub fn element(&self) -> &P::Element {
        &self.element
    }

    /// Shows, hides and finally removes the toast.
    pub async fn run<S: Scheduler>(self, scheduler: S) {
        scheduler.sleep(SHOW_DELAY).await;
        self.page.add_class(&self.element, SHOW_CLASS);

        scheduler.sleep(DISMISS_AFTER - SHOW_DELAY).await;
        self.page.remove_class(&self.element, SHOW_CLASS);

        scheduler.sleep(REMOVE_DELAY).await;
        self.page.remove_element(&self.element);
    }
}

/// Appends a toast and schedules its lifecycle. Returns the element.
pub fn show_toast<P: Page, S: Scheduler>(
    page: &P,
    scheduler: &S,
    message: &str,
    kind: ToastKind,
) -> Result<P::Element> {
    let toast = Toast::attach(page, message, kind)?;
    let element = toast.element().clone();
    debug!("Showing {:?} toast: {}", kind, message);
    scheduler.spawn(Box::pin(toast.run(scheduler.clone())));
    Ok(element)
}
