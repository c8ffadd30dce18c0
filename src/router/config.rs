//! This module defines the RouterConfig struct. It allows the host to embed the router settings
//! in its own configuration and hand them over as a TOML fragment.
use crate::router::strategies::RouteSelectionPolicy;
use crate::router::suppressor::DEFAULT_REQUEST_MEMORY_SIZE;
use crate::router::throttle::DEFAULT_RREQ_RETRY_INTERVAL;
use crate::{DtnAodvError, DtnAodvErrorKind};

/// Settings of the router. Every field has a default, so a partial TOML table is valid.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct RouterConfig {
    /// Minimum simulation time between two route requests to the same destination.
    pub rreq_retry_interval: f64,
    /// Number of request ids remembered by each duplicate suppressor.
    pub request_memory_size: usize,
    /// How competing routes to the same destination are ranked.
    pub route_selection: RouteSelectionPolicy,
    /// Whether nodes holding a route answer requests on behalf of the destination.
    pub intermediate_replies: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            rreq_retry_interval: DEFAULT_RREQ_RETRY_INTERVAL,
            request_memory_size: DEFAULT_REQUEST_MEMORY_SIZE,
            route_selection: RouteSelectionPolicy::default(),
            intermediate_replies: false,
        }
    }
}

impl RouterConfig {
    ///Parses a configuration from a TOML fragment and validates it.
    pub fn from_toml_str(data: &str) -> Result<RouterConfig, DtnAodvError> {
        let config: RouterConfig = toml::from_str(data).map_err(|e| {
            let err_msg = String::from("Could not parse router configuration");
            DtnAodvError {
                kind: DtnAodvErrorKind::Configuration(err_msg),
                cause: Some(Box::new(e)),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    ///Renders the configuration as a TOML fragment.
    pub fn to_toml_string(&self) -> Result<String, DtnAodvError> {
        toml::to_string(self).map_err(|e| {
            let err_msg = String::from("Could not serialize router configuration");
            DtnAodvError {
                kind: DtnAodvErrorKind::Serialization(err_msg),
                cause: Some(Box::new(e)),
            }
        })
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> Result<(), DtnAodvError> {
        if !self.rreq_retry_interval.is_finite() || self.rreq_retry_interval < 0f64 {
            let err_msg = format!("Invalid rreq_retry_interval value: {}", self.rreq_retry_interval);
            return Err(DtnAodvErrorKind::Configuration(err_msg).into());
        }
        if self.request_memory_size == 0 {
            let err_msg = String::from("request_memory_size must be at least 1");
            return Err(DtnAodvErrorKind::Configuration(err_msg).into());
        }
        Ok(())
    }
}
