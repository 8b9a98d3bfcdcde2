//! Private hosted zones and alias records

use crate::load_balancer::dualstack_dns_name;
use crate::manifest::{ResourceRef, Stack};
use crate::Result;
use serde_json::json;

pub const HOSTED_ZONE_TYPE: &str = "AWS::Route53::HostedZone";
pub const RECORD_SET_TYPE: &str = "AWS::Route53::RecordSet";

/// Metadata flag asking the provisioning layer to delete a conflicting record before creating this one
pub const DELETE_EXISTING_METADATA: &str = "delete_existing_record_set";

/// Private hosted zone named after `domain`, associated with the VPC in the stack's region
pub fn add_private_zone(stack: &mut Stack, domain: &str, vpc_id: &str) -> Result<ResourceRef> {
    stack.add_resource(
        &format!("hosted-zone-{}", domain),
        HOSTED_ZONE_TYPE,
        json!({
            "Name": fqdn(domain),
            "VPCs": [{
                "VPCId": vpc_id,
                "VPCRegion": { "Ref": "AWS::Region" },
            }],
        }),
    )
}

/// A record in `zone` aliasing `record_name` to the load balancer
pub fn add_alias_record(
    stack: &mut Stack,
    construct_id: &str,
    zone: &ResourceRef,
    record_name: &str,
    load_balancer: &ResourceRef,
    comment: Option<&str>,
) -> Result<ResourceRef> {
    let mut properties = json!({
        "Name": fqdn(record_name),
        "Type": "A",
        "HostedZoneId": zone.reference(),
        "AliasTarget": {
            "DNSName": dualstack_dns_name(load_balancer),
            "HostedZoneId": load_balancer.get_att("CanonicalHostedZoneID"),
        },
    });
    if let Some(comment) = comment {
        properties["Comment"] = json!(comment);
    }

    let record = stack.add_resource(construct_id, RECORD_SET_TYPE, properties)?;
    let metadata = stack.resource_mut(&record)?.metadata.get_or_insert_with(|| json!({}));
    metadata[DELETE_EXISTING_METADATA] = json!(true);
    Ok(record)
}

fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_zone_properties() {
        let mut stack = Stack::new("proxy");
        let zone = add_private_zone(&mut stack, "api.example.com", "vpc-1").unwrap();
        let resource = stack.resource(&zone).unwrap();
        assert_eq!(resource.resource_type, HOSTED_ZONE_TYPE);
        assert_eq!(resource.properties["Name"], "api.example.com.");
        assert_eq!(resource.properties["VPCs"][0]["VPCId"], "vpc-1");
        assert_eq!(resource.properties["VPCs"][0]["VPCRegion"]["Ref"], "AWS::Region");
    }

    #[test]
    fn test_one_zone_per_domain() {
        let mut stack = Stack::new("proxy");
        add_private_zone(&mut stack, "api.example.com", "vpc-1").unwrap();
        assert!(add_private_zone(&mut stack, "api.example.com", "vpc-1").is_err());
    }

    #[test]
    fn test_alias_record_targets_dualstack_name() {
        let mut stack = Stack::new("proxy");
        let zone = add_private_zone(&mut stack, "api.example.com", "vpc-1").unwrap();
        let lb = stack
            .add_resource("proxy-alb", "AWS::ElasticLoadBalancingV2::LoadBalancer", json!({}))
            .unwrap();
        let record = add_alias_record(&mut stack, "record", &zone, "api.example.com", &lb, Some("Alias to ALB")).unwrap();

        let props = &stack.resource(&record).unwrap().properties;
        assert_eq!(props["Type"], "A");
        assert_eq!(props["Name"], "api.example.com.");
        assert_eq!(props["HostedZoneId"]["Ref"], zone.logical_id());
        assert_eq!(props["AliasTarget"]["DNSName"]["Fn::Join"][1][0], "dualstack.");
        assert_eq!(props["AliasTarget"]["HostedZoneId"]["Fn::GetAtt"][1], "CanonicalHostedZoneID");
        assert_eq!(props["Comment"], "Alias to ALB");
    }

    #[test]
    fn test_alias_record_replaces_existing_record() {
        let mut stack = Stack::new("proxy");
        let zone = add_private_zone(&mut stack, "api.example.com", "vpc-1").unwrap();
        let lb = stack
            .add_resource("proxy-nlb", "AWS::ElasticLoadBalancingV2::LoadBalancer", json!({}))
            .unwrap();
        let record = add_alias_record(&mut stack, "record", &zone, "api.example.com", &lb, None).unwrap();

        let metadata = stack.resource(&record).unwrap().metadata.as_ref().unwrap();
        assert_eq!(metadata[DELETE_EXISTING_METADATA], true);
        assert!(stack.resource(&zone).unwrap().metadata.is_none());
    }
}
