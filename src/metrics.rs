//! Opt-in timing of git invocations, enabled via REVCOMPARE_METRICS=1.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static METRICS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Read REVCOMPARE_METRICS. Call once at startup.
pub fn init() {
    let enabled = std::env::var("REVCOMPARE_METRICS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    METRICS_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Check if metrics collection is enabled.
#[inline]
pub fn enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}

/// RAII timer that emits its elapsed time as a debug event on drop.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Start a timer if metrics are enabled.
    #[inline]
    pub fn start(label: &'static str) -> Option<Self> {
        enabled().then(|| Self {
            label,
            start: Instant::now(),
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(
            target: "revcompare::metrics",
            label = self.label,
            elapsed_us = self.start.elapsed().as_micros() as u64,
            "timing"
        );
    }
}
