//! Load balancer + private DNS routing for every proxy domain

use crate::access_logs::{add_access_logs_bucket, enable_access_logs};
use crate::certificates::add_certificates;
use crate::dns::{add_alias_record, add_private_zone};
use crate::load_balancer::{
    add_application_load_balancer, add_network_load_balancer, dualstack_dns_name, LoadBalancerSpec,
};
use crate::manifest::{ResourceRef, Stack};
use crate::subnets::resolve_subnets;
use crate::{Result, RoutingError};
use proxy_api::{ElbType, ProxyDomain, VpcConfig, VpcOwnership};
use proxy_core::{cert_domain, certificate_requests};
use serde_json::Value;
use tracing::{debug, info};

const ELB_LOGGING_REASON: &str = "This is designed to be a minimal solution, logging would add complexity and resources.  Users can enable access logging if required.";

#[derive(Clone, Debug)]
pub struct RoutingProps {
    pub vpc: VpcConfig,
    /// Security group for an application load balancer; one is generated when absent
    pub security_group_id: Option<String>,
    pub elb_type: ElbType,
    pub proxy_domains: Vec<ProxyDomain>,
    /// JSON array of subnet ids, only read for an externally managed VPC
    pub external_subnet_ids: Option<String>,
    pub ownership: VpcOwnership,
}

/// A proxy domain together with the resources derived for it
#[derive(Clone, Debug)]
pub struct ResolvedDomain {
    pub domain: ProxyDomain,
    pub private_zone: ResourceRef,
    pub cert_domain: String,
}

impl ResolvedDomain {
    pub fn private_zone_id(&self) -> Value {
        self.private_zone.reference()
    }
}

/// Handles produced by [`Routing::build`]
#[derive(Clone, Debug)]
pub struct Routing {
    pub target_group: ResourceRef,
    pub load_balancer: ResourceRef,
    /// Dual-stack DNS name of the load balancer
    pub elb_dns: Value,
    pub domains: Vec<ResolvedDomain>,
    pub certificates: Vec<ResourceRef>,
}

impl Routing {
    pub fn build(stack: &mut Stack, props: &RoutingProps) -> Result<Self> {
        let subnets = resolve_subnets(&props.vpc, props.ownership, props.external_subnet_ids.as_deref())?;

        let requests = certificate_requests(&props.proxy_domains);
        if requests.is_empty() {
            return Err(RoutingError::NoCertificates);
        }

        let mut domains = Vec::with_capacity(props.proxy_domains.len());
        for domain in &props.proxy_domains {
            let private_zone = add_private_zone(stack, &domain.custom_domain_url, &props.vpc.vpc_id)?;
            domains.push(ResolvedDomain {
                domain: domain.clone(),
                private_zone,
                cert_domain: cert_domain(&domain.custom_domain_url).to_string(),
            });
        }
        debug!("Declared {} private hosted zone(s)", domains.len());

        let certificates = add_certificates(stack, &requests)?;
        let access_logs = add_access_logs_bucket(stack)?;

        let spec = LoadBalancerSpec {
            vpc_id: &props.vpc.vpc_id,
            subnets: &subnets,
            certificates: &certificates,
            security_group_id: props.security_group_id.as_deref(),
        };
        let (handles, record_prefix, comment) = match props.elb_type {
            ElbType::Network => (add_network_load_balancer(stack, &spec)?, "a-record-nlb", None),
            ElbType::Application => (
                add_application_load_balancer(stack, &spec)?,
                "a-record-alb",
                Some("Alias to ALB"),
            ),
        };

        enable_access_logs(stack, &handles.load_balancer, &access_logs)?;
        stack
            .resource_mut(&handles.load_balancer)?
            .suppress_rule("AwsSolutions-ELB2", ELB_LOGGING_REASON);

        for resolved in &domains {
            let record_name = &resolved.domain.custom_domain_url;
            let construct_id = format!("{}-{}-{}", stack.name(), record_prefix, record_name);
            add_alias_record(
                stack,
                &construct_id,
                &resolved.private_zone,
                record_name,
                &handles.load_balancer,
                comment,
            )?;
        }

        info!(
            "{} routing declared for {} domain(s) with {} certificate(s)",
            props.elb_type,
            domains.len(),
            certificates.len()
        );

        Ok(Self {
            elb_dns: dualstack_dns_name(&handles.load_balancer),
            target_group: handles.target_group,
            load_balancer: handles.load_balancer,
            domains,
            certificates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::CERTIFICATE_TYPE;
    use crate::dns::{HOSTED_ZONE_TYPE, RECORD_SET_TYPE};
    use crate::load_balancer::{LISTENER_TYPE, LOAD_BALANCER_TYPE, TARGET_GROUP_TYPE};
    use proxy_api::SubnetConfig;

    fn props(elb_type: ElbType, domains: Vec<ProxyDomain>) -> RoutingProps {
        RoutingProps {
            vpc: VpcConfig {
                vpc_id: "vpc-1".to_string(),
                private_subnets: vec![SubnetConfig {
                    subnet_id: "subnet-p1".to_string(),
                    availability_zone: "us-east-1a".to_string(),
                }],
                isolated_subnets: vec![SubnetConfig {
                    subnet_id: "subnet-i1".to_string(),
                    availability_zone: "us-east-1a".to_string(),
                }],
            },
            security_group_id: Some("sg-1".to_string()),
            elb_type,
            proxy_domains: domains,
            external_subnet_ids: None,
            ownership: VpcOwnership::Managed,
        }
    }

    fn domains() -> Vec<ProxyDomain> {
        vec![
            ProxyDomain::new("api.example.com", "https://a.execute-api.us-east-1.amazonaws.com/prod")
                .with_public_zone("Z1"),
            ProxyDomain::new("admin.example.com", "https://b.execute-api.us-east-1.amazonaws.com/prod")
                .with_public_zone("Z1"),
            ProxyDomain::new("api.example.org", "https://c.execute-api.us-east-1.amazonaws.com/prod")
                .with_public_zone("Z2"),
        ]
    }

    #[test]
    fn test_network_routing() {
        let mut stack = Stack::new("proxy");
        let routing = Routing::build(&mut stack, &props(ElbType::Network, domains())).unwrap();

        assert_eq!(stack.resources_of_type(HOSTED_ZONE_TYPE).count(), 3);
        assert_eq!(stack.resources_of_type(CERTIFICATE_TYPE).count(), 2);
        assert_eq!(stack.resources_of_type(RECORD_SET_TYPE).count(), 3);
        assert_eq!(stack.resources_of_type(LOAD_BALANCER_TYPE).count(), 1);
        assert_eq!(stack.resources_of_type(TARGET_GROUP_TYPE).count(), 1);
        assert_eq!(stack.resources_of_type(LISTENER_TYPE).count(), 1);

        let lb = stack.resource(&routing.load_balancer).unwrap();
        assert_eq!(lb.properties["Type"], "network");
        assert_eq!(lb.properties["Subnets"][0], "subnet-i1");
        let attributes = lb.properties["LoadBalancerAttributes"].as_array().unwrap();
        assert!(attributes.iter().any(|a| a["Key"] == "access_logs.s3.enabled"));
        assert!(attributes.iter().any(|a| a["Key"] == "load_balancing.cross_zone.enabled"));
        assert_eq!(
            lb.metadata.as_ref().unwrap()["cdk_nag"]["rules_to_suppress"][0]["id"],
            "AwsSolutions-ELB2"
        );

        assert_eq!(routing.elb_dns["Fn::Join"][1][0], "dualstack.");
        assert!(stack
            .resources_of_type(RECORD_SET_TYPE)
            .all(|record| record.properties.get("Comment").is_none()));
    }

    #[test]
    fn test_application_routing() {
        let mut stack = Stack::new("proxy");
        let routing = Routing::build(&mut stack, &props(ElbType::Application, domains())).unwrap();

        let lb = stack.resource(&routing.load_balancer).unwrap();
        assert_eq!(lb.properties["Type"], "application");
        assert_eq!(lb.properties["SecurityGroups"][0], "sg-1");

        let tg = stack.resource(&routing.target_group).unwrap();
        assert_eq!(tg.properties["Protocol"], "HTTPS");

        for record in stack.resources_of_type(RECORD_SET_TYPE) {
            assert_eq!(record.properties["Comment"], "Alias to ALB");
        }
    }

    #[test]
    fn test_resolved_domains_are_derived() {
        let mut stack = Stack::new("proxy");
        let routing = Routing::build(&mut stack, &props(ElbType::Network, domains())).unwrap();

        let cert_domains: Vec<&str> = routing.domains.iter().map(|d| d.cert_domain.as_str()).collect();
        assert_eq!(cert_domains, vec!["example.com", "example.com", "example.org"]);

        for resolved in &routing.domains {
            let zone = stack.resource(&resolved.private_zone).unwrap();
            assert_eq!(zone.properties["Name"], format!("{}.", resolved.domain.custom_domain_url));
            assert_eq!(resolved.private_zone_id()["Ref"], resolved.private_zone.logical_id());
        }
    }

    #[test]
    fn test_each_record_lands_in_its_own_zone() {
        let mut stack = Stack::new("proxy");
        let routing = Routing::build(&mut stack, &props(ElbType::Network, domains())).unwrap();

        let zones: Vec<Value> = stack
            .resources_of_type(RECORD_SET_TYPE)
            .map(|record| record.properties["HostedZoneId"].clone())
            .collect();
        let expected: Vec<Value> = routing.domains.iter().map(ResolvedDomain::private_zone_id).collect();
        assert_eq!(zones, expected);
    }

    #[test]
    fn test_external_vpc_with_explicit_subnets() {
        let mut stack = Stack::new("proxy");
        let mut props = props(ElbType::Network, domains());
        props.ownership = VpcOwnership::External;
        props.external_subnet_ids = Some(r#"["subnet-x"]"#.to_string());
        let routing = Routing::build(&mut stack, &props).unwrap();

        let lb = stack.resource(&routing.load_balancer).unwrap();
        assert_eq!(lb.properties["Subnets"], serde_json::json!(["subnet-x"]));
    }

    #[test]
    fn test_empty_domain_list_is_rejected() {
        let mut stack = Stack::new("proxy");
        let result = Routing::build(&mut stack, &props(ElbType::Network, Vec::new()));
        assert!(matches!(result, Err(RoutingError::NoCertificates)));
        assert_eq!(stack.resource_count(), 0);
    }

    #[test]
    fn test_duplicate_custom_domain_is_rejected() {
        let mut stack = Stack::new("proxy");
        let mut domains = domains();
        domains.push(domains[0].clone());
        let result = Routing::build(&mut stack, &props(ElbType::Network, domains));
        assert!(matches!(result, Err(RoutingError::DuplicateConstruct(_))));
    }
}
