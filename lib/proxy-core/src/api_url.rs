//! Parsing of private API Gateway invoke URLs

use crate::{CoreError, Result};

const SCHEME: &str = "https://";
const EXECUTE_API: &str = ".execute-api";

/// Resource matched by the default-deny statement
pub const DENY_RESOURCE: &str = "execute-api:/*/*/*";

/// Components of `https://{api-id}.execute-api.{region}.amazonaws.com/{stage}/{path...}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateApiUrl {
    /// API Gateway identifier (host label before `.execute-api`)
    pub gateway_id: String,
    /// Deployment stage (first path segment)
    pub stage: String,
    /// Remaining path segments joined by `/`, or `*` when there are none
    pub resource_path: String,
}

impl PrivateApiUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason| CoreError::InvalidApiUrl {
            url: url.to_string(),
            reason,
        };

        let rest = url.strip_prefix(SCHEME).ok_or_else(|| invalid("expected https scheme"))?;

        // Drop query string and fragment
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        let (host, path) = match rest.find('/') {
            Some(slash) => (&rest[..slash], &rest[slash + 1..]),
            None => (rest, ""),
        };

        let gateway_id = match host.find(EXECUTE_API) {
            Some(end) => &host[..end],
            None => return Err(invalid("host is not an execute-api endpoint")),
        };
        if gateway_id.is_empty() {
            return Err(invalid("missing API gateway id"));
        }

        let mut segments = path.split('/');
        let stage = segments.next().unwrap_or_default();
        if stage.is_empty() {
            return Err(invalid("missing stage"));
        }

        let resource_path = segments.collect::<Vec<_>>().join("/");
        let resource_path = if resource_path.is_empty() {
            "*".to_string()
        } else {
            resource_path
        };

        Ok(Self {
            gateway_id: gateway_id.to_string(),
            stage: stage.to_string(),
            resource_path,
        })
    }

    /// Resources for an allow statement: one per verb, or a wildcard method
    pub fn allow_resources(&self, verbs: Option<&[String]>) -> Vec<String> {
        match verbs {
            Some(verbs) if !verbs.is_empty() => verbs
                .iter()
                .map(|verb| self.resource(&verb.to_uppercase()))
                .collect(),
            _ => vec![self.resource("*")],
        }
    }

    fn resource(&self, method: &str) -> String {
        format!("execute-api:/{}/{}/{}", self.stage, method, self.resource_path)
    }
}
