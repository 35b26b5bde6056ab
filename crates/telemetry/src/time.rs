// Path: crates/telemetry/src/time.rs
use crate::sinks::RelayMetricsSink;
use std::time::Instant;

/// Records the lifetime of a forwarding call into the relay sink on drop.
pub struct ForwardTimer<'a> {
    sink: &'a dyn RelayMetricsSink,
    start: Instant,
}

impl<'a> ForwardTimer<'a> {
    pub fn new(sink: &'a dyn RelayMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for ForwardTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_forward_duration(self.start.elapsed().as_secs_f64());
    }
}
