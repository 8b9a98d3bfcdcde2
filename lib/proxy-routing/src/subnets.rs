//! Subnet placement for the load balancer

use crate::{Result, RoutingError};
use proxy_api::{SubnetConfig, VpcConfig, VpcOwnership};
use std::collections::HashSet;
use tracing::{debug, info};

/// Resolve the subnets the load balancer is placed in.
///
/// An externally managed VPC uses the explicitly supplied subnet ids (a JSON
/// array) and falls back to the VPC's private subnets; a managed VPC places
/// the load balancer in its isolated subnets.
pub fn resolve_subnets(
    vpc: &VpcConfig,
    ownership: VpcOwnership,
    external_subnet_ids: Option<&str>,
) -> Result<Vec<String>> {
    let subnets = match ownership {
        VpcOwnership::External => {
            let explicit = parse_subnet_ids(external_subnet_ids)?;
            if !explicit.is_empty() {
                info!("Using {} explicitly supplied subnet(s)", explicit.len());
                return Ok(explicit);
            }
            debug!("No subnet ids supplied, falling back to private subnets of {}", vpc.vpc_id);
            one_per_availability_zone(&vpc.private_subnets)
        }
        VpcOwnership::Managed => one_per_availability_zone(&vpc.isolated_subnets),
    };

    if subnets.is_empty() {
        return Err(RoutingError::NoSubnets(vpc.vpc_id.clone()));
    }

    info!("Placing load balancer in {} subnet(s)", subnets.len());
    Ok(subnets)
}

fn parse_subnet_ids(raw: Option<&str>) -> Result<Vec<String>> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(raw).map_err(RoutingError::InvalidSubnetIds)
        }
        _ => Ok(Vec::new()),
    }
}

/// First subnet of every availability zone, in input order
fn one_per_availability_zone(subnets: &[SubnetConfig]) -> Vec<String> {
    let mut zones = HashSet::new();
    subnets
        .iter()
        .filter(|subnet| zones.insert(subnet.availability_zone.as_str()))
        .map(|subnet| subnet.subnet_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(id: &str, az: &str) -> SubnetConfig {
        SubnetConfig {
            subnet_id: id.to_string(),
            availability_zone: az.to_string(),
        }
    }

    fn vpc() -> VpcConfig {
        VpcConfig {
            vpc_id: "vpc-1".to_string(),
            private_subnets: vec![
                subnet("subnet-p1", "us-east-1a"),
                subnet("subnet-p2", "us-east-1a"),
                subnet("subnet-p3", "us-east-1b"),
            ],
            isolated_subnets: vec![subnet("subnet-i1", "us-east-1a"), subnet("subnet-i2", "us-east-1b")],
        }
    }

    #[test]
    fn test_external_vpc_uses_supplied_ids() {
        let subnets = resolve_subnets(&vpc(), VpcOwnership::External, Some(r#"["subnet-x", "subnet-y"]"#)).unwrap();
        assert_eq!(subnets, vec!["subnet-x", "subnet-y"]);
    }

    #[test]
    fn test_external_vpc_falls_back_to_private_subnets() {
        let expected = vec!["subnet-p1", "subnet-p3"];
        assert_eq!(resolve_subnets(&vpc(), VpcOwnership::External, None).unwrap(), expected);
        assert_eq!(resolve_subnets(&vpc(), VpcOwnership::External, Some("[]")).unwrap(), expected);
        assert_eq!(resolve_subnets(&vpc(), VpcOwnership::External, Some("")).unwrap(), expected);
    }

    #[test]
    fn test_managed_vpc_uses_isolated_subnets() {
        let subnets = resolve_subnets(&vpc(), VpcOwnership::Managed, Some(r#"["ignored"]"#)).unwrap();
        assert_eq!(subnets, vec!["subnet-i1", "subnet-i2"]);
    }

    #[test]
    fn test_malformed_subnet_ids_fail_fast() {
        let result = resolve_subnets(&vpc(), VpcOwnership::External, Some("subnet-x,subnet-y"));
        assert!(matches!(result, Err(RoutingError::InvalidSubnetIds(_))));
    }

    #[test]
    fn test_no_subnets() {
        let empty = VpcConfig {
            vpc_id: "vpc-2".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_subnets(&empty, VpcOwnership::Managed, None),
            Err(RoutingError::NoSubnets(id)) if id == "vpc-2"
        ));
    }
}
