//! Timing instrumentation for interaction hot paths.
//!
//! Pointer moves can arrive 60+ times per second and every transfer rebuilds
//! container lists, so both are wrapped in [`profile_scope!`]. The macro is
//! zero-cost unless the crate is built with the `profiling` feature:
//!
//! ```ignore
//! fn handle_pointer_move() {
//!     profile_scope!("pointer_move", 4.0);
//!     // ...
//! }
//! ```

use std::time::Instant;
use tracing::debug;

/// Profile a scope, reporting it when it runs longer than `threshold_ms`.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

/// RAII timer that logs on drop when the scope exceeded its budget.
pub struct ScopedTimer {
    name: &'static str,
    threshold_ms: f64,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            threshold_ms,
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer was created.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn is_over_budget(&self) -> bool {
        self.elapsed_ms() > self.threshold_ms
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if self.is_over_budget() {
            debug!(
                operation = self.name,
                elapsed_ms = self.elapsed_ms(),
                budget_ms = self.threshold_ms,
                "slow operation"
            );
        }
    }
}
