//! Resource policies restricting private API Gateways to the proxy

use crate::api_url::{PrivateApiUrl, DENY_RESOURCE};
use crate::Result;
use proxy_api::ProxyDomain;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
pub const DENY_SID: &str = "reverse-proxy-deny";
pub const ALLOW_SID_PREFIX: &str = "reverse-proxy-allow-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Condition operator -> (condition key -> value)
pub type Condition = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: Effect,
    pub principal: String,
    pub action: String,
    pub resource: Vec<String>,
    pub condition: Condition,
}

impl PolicyStatement {
    /// Deny every invocation that does not come through the VPC endpoint
    pub fn deny_outside_vpc_endpoint(vpc_endpoint_id: &str) -> Self {
        Self {
            sid: DENY_SID.to_string(),
            effect: Effect::Deny,
            principal: "*".to_string(),
            action: INVOKE_ACTION.to_string(),
            resource: vec![DENY_RESOURCE.to_string()],
            condition: condition("StringNotEquals", "aws:SourceVpce", vpc_endpoint_id),
        }
    }

    /// Allow invocations whose referer is the proxied custom domain
    pub fn allow_for_domain(domain: &ProxyDomain, api_url: &PrivateApiUrl) -> Self {
        Self {
            sid: format!("{}{}", ALLOW_SID_PREFIX, string_hash(&domain.private_api_url)),
            effect: Effect::Allow,
            principal: "*".to_string(),
            action: INVOKE_ACTION.to_string(),
            resource: api_url.allow_resources(domain.verbs()),
            condition: condition("StringEquals", "aws:Referer", &domain.custom_domain_url),
        }
    }
}

fn condition(operator: &str, key: &str, value: &str) -> Condition {
    let mut inner = BTreeMap::new();
    inner.insert(key.to_string(), value.to_string());
    let mut outer = BTreeMap::new();
    outer.insert(operator.to_string(), inner);
    outer
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    fn new(vpc_endpoint_id: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement::deny_outside_vpc_endpoint(vpc_endpoint_id)],
        }
    }

    fn push(&mut self, statement: PolicyStatement) {
        // Statement ids come from a 32-bit hash; a clash is reported, not rewritten
        if self.statement.iter().any(|existing| existing.sid == statement.sid) {
            warn!("Duplicate statement id {} in resource policy", statement.sid);
        }
        self.statement.push(statement);
    }
}

/// API gateway id -> resource policy, in first-seen gateway order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyMapping {
    entries: Vec<(String, PolicyDocument)>,
}

impl PolicyMapping {
    /// Group domains by gateway id: one deny statement per gateway followed by
    /// one allow statement per domain, in input order
    pub fn build(domains: &[ProxyDomain], vpc_endpoint_id: &str) -> Result<Self> {
        let mut mapping = Self::default();

        for domain in domains {
            let api_url = PrivateApiUrl::parse(&domain.private_api_url)?;
            let statement = PolicyStatement::allow_for_domain(domain, &api_url);

            match mapping.entries.iter_mut().find(|(id, _)| *id == api_url.gateway_id) {
                Some((_, document)) => document.push(statement),
                None => {
                    debug!("Creating resource policy for API gateway {}", api_url.gateway_id);
                    let mut document = PolicyDocument::new(vpc_endpoint_id);
                    document.push(statement);
                    mapping.entries.push((api_url.gateway_id, document));
                }
            }
        }

        Ok(mapping)
    }

    pub fn get(&self, gateway_id: &str) -> Option<&PolicyDocument> {
        self.entries
            .iter()
            .find(|(id, _)| id == gateway_id)
            .map(|(_, document)| document)
    }

    pub fn gateway_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PolicyMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (gateway_id, document) in &self.entries {
            map.serialize_entry(gateway_id, document)?;
        }
        map.end()
    }
}

/// djb2-xor string hash over UTF-16 code units, walked from the end.
/// Statement ids generated by earlier deployments rely on these exact values.
pub fn string_hash(input: &str) -> u32 {
    let units: Vec<u16> = input.encode_utf16().collect();
    units
        .iter()
        .rev()
        .fold(5381u32, |hash, &unit| hash.wrapping_mul(33) ^ u32::from(unit))
}
