//! Opt-in elapsed-time reporting for the heavy passes (fault detection,
//! statistics, condensation).
//!
//! Disabled unless `RG_TIMING` is set or [`enable_timing`] was called.
//! Reports go out as `tracing` debug events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var_os("RG_TIMING").is_some()
}

/// Wall-clock timer for one labelled pass.
pub struct Timer {
    label: &'static str,
    start: Option<Instant>,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed seconds; `None` when timing is disabled.
    pub fn stop(self) -> Option<f64> {
        self.start.map(|s| s.elapsed().as_secs_f64())
    }

    pub fn stop_and_log(self) {
        let label = self.label;
        if let Some(elapsed_s) = self.stop() {
            tracing::debug!(label, elapsed_s, "timing");
        }
    }
}
