//! Input and output data model for the private API reverse proxy
//!
//! This library defines the documents the proxy tooling consumes:
//! - ProxyDomain / ProxyFile: the proxied APIs, read from the `APIS` key
//! - StackOutputs: outputs of a previous provisioning run
//! - VpcConfig: the VPC the load balancer attaches to
//! - ElbType / VpcOwnership: deployment switches

pub mod domain;
pub mod elb;
pub mod error;
pub mod stack_outputs;
pub mod vpc;

pub use domain::{proxy_file_schema, ProxyDomain, ProxyFile};
pub use elb::ElbType;
pub use error::{ApiError, Result};
pub use stack_outputs::{StackOutput, StackOutputs};
pub use vpc::{SubnetConfig, VpcConfig, VpcOwnership};
