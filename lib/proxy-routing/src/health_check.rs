//! Target group health checks

use serde_json::{json, Map, Value};
use std::time::Duration;

/// Health check configuration for a target group
#[derive(Clone, Debug, PartialEq)]
pub struct HealthCheck {
    /// HTTP path to check for health
    pub path: String,
    /// Protocol used for the check
    pub protocol: String,
    /// Interval between health checks
    pub interval: Duration,
    /// Timeout for a single health check
    pub timeout: Duration,
    /// Consecutive successes before marking healthy (provider default when unset)
    pub healthy_threshold: Option<u32>,
    /// Consecutive failures before marking unhealthy (provider default when unset)
    pub unhealthy_threshold: Option<u32>,
}

impl HealthCheck {
    /// Check used by the TLS target group behind a network load balancer
    pub fn network() -> Self {
        Self {
            healthy_threshold: Some(2),
            unhealthy_threshold: Some(2),
            ..Self::application()
        }
    }

    /// Check used by the HTTPS target group behind an application load balancer
    pub fn application() -> Self {
        Self {
            path: "/".to_string(),
            protocol: "HTTPS".to_string(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
            healthy_threshold: None,
            unhealthy_threshold: None,
        }
    }

    /// Target group properties for this check
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("HealthCheckEnabled".to_string(), json!(true));
        props.insert("HealthCheckPath".to_string(), json!(self.path));
        props.insert("HealthCheckProtocol".to_string(), json!(self.protocol));
        props.insert("HealthCheckIntervalSeconds".to_string(), json!(self.interval.as_secs()));
        props.insert("HealthCheckTimeoutSeconds".to_string(), json!(self.timeout.as_secs()));
        if let Some(healthy) = self.healthy_threshold {
            props.insert("HealthyThresholdCount".to_string(), json!(healthy));
        }
        if let Some(unhealthy) = self.unhealthy_threshold {
            props.insert("UnhealthyThresholdCount".to_string(), json!(unhealthy));
        }
        props
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self::application()
    }
}
