//! Deployment outputs file: stack outputs plus the resource-policy mapping

use crate::policy::PolicyMapping;
use crate::{CoreError, Result};
use proxy_api::{ProxyDomain, StackOutputs};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Stack output carrying the API Gateway VPC interface endpoint id
pub const VPC_ENDPOINT_OUTPUT_KEY: &str = "apigatewayvpceid";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutputsFile {
    #[serde(rename = "STACK_OUTPUTS")]
    pub stack_outputs: StackOutputs,

    #[serde(rename = "API_RESOURCE_POLICY_MAPPING")]
    pub policy_mapping: PolicyMapping,
}

impl OutputsFile {
    pub fn build(stack_outputs: StackOutputs, domains: &[ProxyDomain]) -> Result<Self> {
        let policy_mapping = if domains.is_empty() {
            PolicyMapping::default()
        } else {
            let vpc_endpoint_id = stack_outputs
                .find(VPC_ENDPOINT_OUTPUT_KEY)
                .ok_or_else(|| CoreError::MissingStackOutput(VPC_ENDPOINT_OUTPUT_KEY.to_string()))?;
            PolicyMapping::build(domains, vpc_endpoint_id)?
        };

        debug!(
            "Built resource policies for {} API gateway(s) from {} domain(s)",
            policy_mapping.len(),
            domains.len()
        );

        Ok(Self {
            stack_outputs,
            policy_mapping,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reject destination paths carrying a null byte
pub fn validate_destination(path: &str) -> Result<()> {
    if path.contains('\0') {
        return Err(CoreError::UnsafeDestinationPath(path.to_string()));
    }
    Ok(())
}

/// Write the outputs file, creating parent directories as needed
pub async fn write_outputs_file(path: &str, outputs: &OutputsFile) -> Result<()> {
    validate_destination(path)?;
    let contents = outputs.to_json_pretty()?;

    let destination = Path::new(path);
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|source| CoreError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    tokio::fs::write(destination, contents).await.map_err(|source| CoreError::Io {
        path: path.to_string(),
        source,
    })?;

    info!("Outputs file written to {}", path);
    Ok(())
}
