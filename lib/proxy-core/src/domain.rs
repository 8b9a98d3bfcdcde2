//! Apex-domain derivation and certificate deduplication

use proxy_api::ProxyDomain;
use std::collections::HashSet;
use tracing::debug;

/// Strip the first DNS label: `api.example.com` -> `example.com`.
/// A name without a dot is returned unchanged.
pub fn cert_domain(custom_domain: &str) -> &str {
    custom_domain
        .split_once('.')
        .map(|(_, apex)| apex)
        .unwrap_or(custom_domain)
}

/// One wildcard certificate to request
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CertificateRequest {
    /// Apex domain the wildcard covers
    pub cert_domain: String,
    /// Public hosted zone answering the DNS validation
    pub public_zone_id: Option<String>,
}

impl CertificateRequest {
    pub fn wildcard_domain(&self) -> String {
        format!("*.{}", self.cert_domain)
    }
}

/// One request per unique (apex domain, public zone) pair, in first-seen order
pub fn certificate_requests(domains: &[ProxyDomain]) -> Vec<CertificateRequest> {
    let mut seen = HashSet::new();
    let mut requests = Vec::new();

    for domain in domains {
        let request = CertificateRequest {
            cert_domain: cert_domain(&domain.custom_domain_url).to_string(),
            public_zone_id: domain.public_zone_id.clone(),
        };
        if seen.insert(request.clone()) {
            requests.push(request);
        } else {
            debug!(
                "Certificate for {} already requested, reusing it for {}",
                request.wildcard_domain(),
                domain.custom_domain_url
            );
        }
    }

    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(url: &str, zone: Option<&str>) -> ProxyDomain {
        let domain = ProxyDomain::new(url, "https://abc.execute-api.us-east-1.amazonaws.com/prod");
        match zone {
            Some(zone) => domain.with_public_zone(zone),
            None => domain,
        }
    }

    #[test]
    fn test_cert_domain() {
        assert_eq!(cert_domain("api.example.com"), "example.com");
        assert_eq!(cert_domain("a.b.example.com"), "b.example.com");
        assert_eq!(cert_domain("localhost"), "localhost");
    }

    #[test]
    fn test_shared_apex_and_zone_requests_one_certificate() {
        let domains = vec![
            domain("api.example.com", Some("Z1")),
            domain("admin.example.com", Some("Z1")),
        ];
        let requests = certificate_requests(&domains);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].wildcard_domain(), "*.example.com");
        assert_eq!(requests[0].public_zone_id.as_deref(), Some("Z1"));
    }

    #[test]
    fn test_distinct_zone_or_apex_requests_separate_certificates() {
        let domains = vec![
            domain("api.example.com", Some("Z1")),
            domain("web.example.com", Some("Z2")),
            domain("api.example.org", Some("Z1")),
            domain("other.example.org", Some("Z1")),
            domain("api.example.net", None),
            domain("web.example.net", None),
        ];
        let requests = certificate_requests(&domains);
        let pairs: Vec<(&str, Option<&str>)> = requests
            .iter()
            .map(|r| (r.cert_domain.as_str(), r.public_zone_id.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("example.com", Some("Z1")),
                ("example.com", Some("Z2")),
                ("example.org", Some("Z1")),
                ("example.net", None),
            ]
        );
    }

    #[test]
    fn test_no_domains_no_requests() {
        assert!(certificate_requests(&[]).is_empty());
    }
}
