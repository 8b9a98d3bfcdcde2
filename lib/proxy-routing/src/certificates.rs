//! Wildcard certificates and listener certificate attachment

use crate::manifest::{ResourceRef, Stack};
use crate::{Result, RoutingError};
use proxy_core::CertificateRequest;
use serde_json::{json, Value};
use tracing::info;

pub const CERTIFICATE_TYPE: &str = "AWS::CertificateManager::Certificate";
pub const LISTENER_CERTIFICATE_TYPE: &str = "AWS::ElasticLoadBalancingV2::ListenerCertificate";

/// One DNS-validated wildcard certificate per request
pub fn add_certificates(stack: &mut Stack, requests: &[CertificateRequest]) -> Result<Vec<ResourceRef>> {
    let mut certificates = Vec::with_capacity(requests.len());

    for request in requests {
        let wildcard = request.wildcard_domain();
        let mut construct_id = format!("{}-certificate-{}", stack.name(), request.cert_domain);
        let mut properties = json!({
            "DomainName": wildcard,
            "ValidationMethod": "DNS",
        });

        // Without a public zone the validation records are created by the operator
        if let Some(zone_id) = &request.public_zone_id {
            construct_id = format!("{}-{}", construct_id, zone_id);
            properties["DomainValidationOptions"] = json!([{
                "DomainName": wildcard,
                "HostedZoneId": zone_id,
            }]);
        }

        info!("Requesting certificate for {}", wildcard);
        certificates.push(stack.add_resource(&construct_id, CERTIFICATE_TYPE, properties)?);
    }

    Ok(certificates)
}

/// The listener's default certificate: the first one requested
pub fn default_certificate(certificates: &[ResourceRef]) -> Result<Value> {
    let first = certificates.first().ok_or(RoutingError::NoCertificates)?;
    Ok(json!([{ "CertificateArn": first.reference() }]))
}

/// Attach every certificate after the first to the listener
pub fn attach_additional_certificates(
    stack: &mut Stack,
    listener_construct_id: &str,
    listener: &ResourceRef,
    certificates: &[ResourceRef],
) -> Result<Option<ResourceRef>> {
    if certificates.len() < 2 {
        return Ok(None);
    }

    let additional: Vec<Value> = certificates[1..]
        .iter()
        .map(|cert| json!({ "CertificateArn": cert.reference() }))
        .collect();

    let attachment = stack.add_resource(
        &format!("{}/AdditionalCertificates", listener_construct_id),
        LISTENER_CERTIFICATE_TYPE,
        json!({
            "ListenerArn": listener.reference(),
            "Certificates": additional,
        }),
    )?;
    Ok(Some(attachment))
}
