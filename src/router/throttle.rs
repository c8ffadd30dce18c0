use crate::NodeId;
use std::collections::HashMap;

/// Default minimum time between two route requests to the same destination.
pub const DEFAULT_RREQ_RETRY_INTERVAL: f64 = 300.0;

/// Rate-limits route requests to one per retry interval per destination.
/// Records live for the whole lifetime of the node.
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    retry_interval: f64,
    last_request: HashMap<NodeId, f64>,
}

impl Default for RequestThrottle {
    fn default() -> Self {
        RequestThrottle::new(DEFAULT_RREQ_RETRY_INTERVAL)
    }
}

impl RequestThrottle {
    pub fn new(retry_interval: f64) -> Self {
        RequestThrottle {
            retry_interval,
            last_request: HashMap::new(),
        }
    }

    /// Returns true, recording `now`, if no request to `destination` was issued yet or the
    /// last one is older than the retry interval. Otherwise leaves the state untouched.
    pub fn try_acquire(&mut self, destination: &str, now: f64) -> bool {
        if !self.is_open(destination, now) {
            return false;
        }
        self.record(destination, now);
        true
    }

    /// Whether a request to `destination` would be allowed at `now`.
    pub fn is_open(&self, destination: &str, now: f64) -> bool {
        match self.last_request.get(destination) {
            Some(last) => now - *last >= self.retry_interval,
            None => true,
        }
    }

    /// Records a request to `destination` issued at `now`.
    pub fn record(&mut self, destination: &str, now: f64) {
        self.last_request.insert(destination.to_string(), now);
    }

    /// Time of the last request issued towards `destination`.
    pub fn last_request_time(&self, destination: &str) -> Option<f64> {
        self.last_request.get(destination).copied()
    }
}
