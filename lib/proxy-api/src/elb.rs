use crate::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Load balancer flavour placed in front of the proxy targets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElbType {
    /// Network load balancer terminating TLS
    #[serde(rename = "NLB")]
    Network,
    /// Application load balancer terminating HTTPS
    #[default]
    #[serde(rename = "ALB")]
    Application,
}

impl FromStr for ElbType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nlb" | "network" => Ok(ElbType::Network),
            "alb" | "application" => Ok(ElbType::Application),
            _ => Err(ApiError::InvalidElbType(s.to_string())),
        }
    }
}

impl fmt::Display for ElbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElbType::Network => write!(f, "NLB"),
            ElbType::Application => write!(f, "ALB"),
        }
    }
}
