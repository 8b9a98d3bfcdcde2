use crate::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// VPC the routing resources attach to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct VpcConfig {
    /// VPC identifier (e.g., vpc-0123456789abcdef0)
    pub vpc_id: String,

    /// Private subnets with egress
    #[serde(default)]
    pub private_subnets: Vec<SubnetConfig>,

    /// Isolated subnets without a route to the internet
    #[serde(default)]
    pub isolated_subnets: Vec<SubnetConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SubnetConfig {
    pub subnet_id: String,

    pub availability_zone: String,
}

impl VpcConfig {
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// Whether the VPC is created alongside the proxy or supplied from outside
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VpcOwnership {
    /// The VPC comes from the same deployment; isolated subnets are picked automatically
    Managed,
    /// The VPC already exists; subnet ids may be supplied explicitly
    External,
}

impl FromStr for VpcOwnership {
    type Err = ApiError;

    /// Parses the `createVpc` flag
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "true" => Ok(VpcOwnership::Managed),
            "false" => Ok(VpcOwnership::External),
            _ => Err(ApiError::InvalidCreateVpc(s.to_string())),
        }
    }
}
