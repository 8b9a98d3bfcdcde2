//! Load balancer and private DNS routing for the reverse proxy
//!
//! Resources are declared into a [`Stack`], which serializes to a
//! CloudFormation-shaped deployment manifest:
//! - Private hosted zones and alias records per proxy domain
//! - Wildcard certificates, deduplicated per apex domain and public zone
//! - A network or application load balancer with its listener and target group
//! - An access-log bucket for the load balancer

pub mod access_logs;
pub mod certificates;
pub mod dns;
pub mod error;
pub mod health_check;
pub mod load_balancer;
pub mod manifest;
pub mod routing;
pub mod subnets;

pub use error::{Result, RoutingError};
pub use health_check::HealthCheck;
pub use manifest::{Resource, ResourceRef, Stack};
pub use routing::{ResolvedDomain, Routing, RoutingProps};
