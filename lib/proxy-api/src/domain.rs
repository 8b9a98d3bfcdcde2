use crate::Result;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProxyDomain maps a public-facing custom domain onto a private API Gateway endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProxyDomain {
    /// Fully-qualified domain name exposed to clients (e.g., api.example.com)
    pub custom_domain_url: String,

    /// Upstream URL: https://{api-id}.execute-api.{region}.amazonaws.com/{stage}/{path...}
    pub private_api_url: String,

    /// Public hosted zone used for DNS validation of the wildcard certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_zone_id: Option<String>,

    /// HTTP methods allowed through the proxy (any method when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbs: Option<Vec<String>>,
}

impl ProxyDomain {
    pub fn new(custom_domain_url: impl Into<String>, private_api_url: impl Into<String>) -> Self {
        Self {
            custom_domain_url: custom_domain_url.into(),
            private_api_url: private_api_url.into(),
            public_zone_id: None,
            verbs: None,
        }
    }

    pub fn with_public_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.public_zone_id = Some(zone_id.into());
        self
    }

    pub fn with_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs = Some(verbs.into_iter().map(Into::into).collect());
        self
    }

    /// Declared verbs; an empty list counts as "none declared"
    pub fn verbs(&self) -> Option<&[String]> {
        self.verbs.as_deref().filter(|verbs| !verbs.is_empty())
    }
}

/// Proxy definition file; every proxied API lives under `APIS`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFile {
    /// Proxied APIs
    #[serde(rename = "APIS")]
    pub apis: Vec<ProxyDomain>,
}

impl ProxyFile {
    /// Parse a proxy file. JSON documents are accepted as well since YAML is a superset.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// JSON Schema describing the proxy file
pub fn proxy_file_schema() -> RootSchema {
    schemars::schema_for!(ProxyFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proxy_file() {
        let yaml = r#"
APIS:
  - CUSTOM_DOMAIN_URL: api.example.com
    PRIVATE_API_URL: https://abc123.execute-api.us-east-1.amazonaws.com/prod/orders
    PUBLIC_ZONE_ID: Z0123456789
    VERBS: [get, post]
  - CUSTOM_DOMAIN_URL: admin.example.com
    PRIVATE_API_URL: https://def456.execute-api.us-east-1.amazonaws.com/dev
"#;
        let file = ProxyFile::from_yaml(yaml).unwrap();
        assert_eq!(file.apis.len(), 2);
        assert_eq!(file.apis[0].public_zone_id.as_deref(), Some("Z0123456789"));
        assert_eq!(file.apis[0].verbs().unwrap(), ["get", "post"]);
        assert!(file.apis[1].public_zone_id.is_none());
        assert!(file.apis[1].verbs().is_none());
    }

    #[test]
    fn test_parse_json_proxy_file() {
        let json = r#"{"APIS": [{"CUSTOM_DOMAIN_URL": "a.example.com", "PRIVATE_API_URL": "https://x.execute-api.eu-west-1.amazonaws.com/v1", "EXTRA": 1}]}"#;
        let file = ProxyFile::from_yaml(json).unwrap();
        assert_eq!(file.apis[0], ProxyDomain::new("a.example.com", "https://x.execute-api.eu-west-1.amazonaws.com/v1"));
    }

    #[test]
    fn test_missing_apis_key_is_rejected() {
        assert!(ProxyFile::from_yaml("OTHER: []").is_err());
    }

    #[test]
    fn test_empty_verbs_treated_as_absent() {
        let domain = ProxyDomain::new("a.example.com", "https://x.execute-api/v1").with_verbs(Vec::<String>::new());
        assert!(domain.verbs.is_some());
        assert!(domain.verbs().is_none());
    }

    #[test]
    fn test_schema_uses_document_keys() {
        let schema = serde_json::to_value(proxy_file_schema()).unwrap();
        assert!(schema["properties"]["APIS"].is_object());
        let definition = &schema["definitions"]["ProxyDomain"];
        assert!(definition["properties"]["CUSTOM_DOMAIN_URL"].is_object());
        assert!(definition["properties"]["VERBS"].is_object());
    }
}
