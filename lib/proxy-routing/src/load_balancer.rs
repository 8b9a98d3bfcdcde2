//! Network and application load balancers with their listener and target group

use crate::certificates::{attach_additional_certificates, default_certificate};
use crate::health_check::HealthCheck;
use crate::manifest::{ResourceRef, Stack};
use crate::Result;
use serde_json::{json, Value};
use tracing::info;

pub const LOAD_BALANCER_TYPE: &str = "AWS::ElasticLoadBalancingV2::LoadBalancer";
pub const TARGET_GROUP_TYPE: &str = "AWS::ElasticLoadBalancingV2::TargetGroup";
pub const LISTENER_TYPE: &str = "AWS::ElasticLoadBalancingV2::Listener";
pub const SECURITY_GROUP_TYPE: &str = "AWS::EC2::SecurityGroup";

pub const LISTENER_PORT: u16 = 443;

/// Inputs shared by both load balancer flavours
#[derive(Clone, Debug)]
pub struct LoadBalancerSpec<'a> {
    pub vpc_id: &'a str,
    pub subnets: &'a [String],
    pub certificates: &'a [ResourceRef],
    /// Existing security group for an application load balancer
    pub security_group_id: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct LoadBalancerHandles {
    pub load_balancer: ResourceRef,
    pub target_group: ResourceRef,
    pub listener: ResourceRef,
}

/// `dualstack.` + the load balancer's DNS name
pub fn dualstack_dns_name(load_balancer: &ResourceRef) -> Value {
    json!({ "Fn::Join": ["", ["dualstack.", load_balancer.get_att("DNSName")]] })
}

/// Internal, cross-zone network load balancer with a TLS listener on 443
pub fn add_network_load_balancer(stack: &mut Stack, spec: &LoadBalancerSpec<'_>) -> Result<LoadBalancerHandles> {
    let name = stack.name().to_string();
    let default_certificate = default_certificate(spec.certificates)?;

    let load_balancer = stack.add_resource(
        &format!("{}-nlb", name),
        LOAD_BALANCER_TYPE,
        json!({
            "Type": "network",
            "Scheme": "internal",
            "Subnets": spec.subnets,
            "LoadBalancerAttributes": [
                { "Key": "load_balancing.cross_zone.enabled", "Value": "true" },
            ],
        }),
    )?;

    let target_group = add_target_group(
        stack,
        &format!("{}-nlb-target-group", name),
        "TLS",
        spec.vpc_id,
        &HealthCheck::network(),
    )?;

    let listener_id = format!("{}-nlb-listener", name);
    let listener = add_listener(stack, &listener_id, "TLS", &load_balancer, &target_group, default_certificate)?;
    attach_additional_certificates(stack, &listener_id, &listener, spec.certificates)?;

    info!(
        "Network load balancer declared with {} certificate(s) across {} subnet(s)",
        spec.certificates.len(),
        spec.subnets.len()
    );

    Ok(LoadBalancerHandles {
        load_balancer,
        target_group,
        listener,
    })
}

/// Internal application load balancer with an HTTPS listener on 443.
/// The listener is not opened to arbitrary ingress.
pub fn add_application_load_balancer(
    stack: &mut Stack,
    spec: &LoadBalancerSpec<'_>,
) -> Result<LoadBalancerHandles> {
    let name = stack.name().to_string();
    let default_certificate = default_certificate(spec.certificates)?;
    let alb_id = format!("{}-alb", name);

    let security_group = match spec.security_group_id {
        Some(id) => json!(id),
        None => {
            let group = stack.add_resource(
                &format!("{}-alb-sg", name),
                SECURITY_GROUP_TYPE,
                json!({
                    "GroupDescription": format!("Automatically created Security Group for ELB {}", alb_id),
                    "VpcId": spec.vpc_id,
                    "SecurityGroupEgress": [{
                        "CidrIp": "0.0.0.0/0",
                        "IpProtocol": "-1",
                        "Description": "Allow all outbound traffic by default",
                    }],
                }),
            )?;
            group.get_att("GroupId")
        }
    };

    let load_balancer = stack.add_resource(
        &alb_id,
        LOAD_BALANCER_TYPE,
        json!({
            "Type": "application",
            "Scheme": "internal",
            "Subnets": spec.subnets,
            "SecurityGroups": [security_group],
        }),
    )?;

    let target_group = add_target_group(
        stack,
        &format!("{}-alb-target-group", name),
        "HTTPS",
        spec.vpc_id,
        &HealthCheck::application(),
    )?;

    let listener_id = format!("{}-alb-listener", name);
    let listener = add_listener(stack, &listener_id, "HTTPS", &load_balancer, &target_group, default_certificate)?;
    attach_additional_certificates(stack, &listener_id, &listener, spec.certificates)?;

    info!(
        "Application load balancer declared with {} certificate(s) across {} subnet(s)",
        spec.certificates.len(),
        spec.subnets.len()
    );

    Ok(LoadBalancerHandles {
        load_balancer,
        target_group,
        listener,
    })
}

fn add_target_group(
    stack: &mut Stack,
    construct_id: &str,
    protocol: &str,
    vpc_id: &str,
    health_check: &HealthCheck,
) -> Result<ResourceRef> {
    let mut properties = health_check.to_properties();
    properties.insert("Port".to_string(), json!(LISTENER_PORT));
    properties.insert("Protocol".to_string(), json!(protocol));
    properties.insert("TargetType".to_string(), json!("ip"));
    properties.insert("VpcId".to_string(), json!(vpc_id));

    stack.add_resource(construct_id, TARGET_GROUP_TYPE, Value::Object(properties))
}

fn add_listener(
    stack: &mut Stack,
    construct_id: &str,
    protocol: &str,
    load_balancer: &ResourceRef,
    target_group: &ResourceRef,
    certificates: Value,
) -> Result<ResourceRef> {
    stack.add_resource(
        construct_id,
        LISTENER_TYPE,
        json!({
            "LoadBalancerArn": load_balancer.reference(),
            "Port": LISTENER_PORT,
            "Protocol": protocol,
            "Certificates": certificates,
            "DefaultActions": [{
                "Type": "forward",
                "TargetGroupArn": target_group.reference(),
            }],
        }),
    )
}
