use std::time::Duration;

use dashboard::Scheduler;
use futures::future::LocalBoxFuture;
use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;

/// Browser timers and the `wasm-bindgen-futures` task queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

impl Scheduler for GlooScheduler {
    type Sleep = TimeoutFuture;
    type Interval = Interval;

    fn sleep(&self, duration: Duration) -> TimeoutFuture {
        TimeoutFuture::new(millis(duration))
    }

    fn interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Interval {
        Interval::new(millis(period), tick)
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
