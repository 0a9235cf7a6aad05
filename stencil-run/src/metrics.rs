//! Per-run counters and timings.

use std::collections::HashMap;
use std::time::Duration;

/// Counters for one run. A fresh value is created when the run starts and
/// handed back to the caller at the end, on success and on failure alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    pub templates_gathered: usize,
    pub templates_processed: usize,
    pub errors: usize,
    pub gather_duration: Duration,
    /// Render time per template name.
    pub render_duration: HashMap<String, Duration>,
    pub total_render_duration: Duration,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}
