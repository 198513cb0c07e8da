/// Monotonic counter identifying the most recently issued request.
///
/// Each request captures the value returned by [`RequestEpoch::issue`]; a
/// completion is applied only while its captured value is still current.
/// This gives last-keystroke-wins semantics without cancelling network
/// calls.
#[derive(Debug, Default)]
pub struct RequestEpoch {
    latest: u64,
}

/// The value one request captured at issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

impl RequestEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to a new latest request and return its identity.
    pub fn issue(&mut self) -> Epoch {
        self.latest += 1;
        Epoch(self.latest)
    }

    /// True while no newer request has been issued.
    pub fn is_current(&self, epoch: Epoch) -> bool {
        epoch.0 == self.latest
    }
}
