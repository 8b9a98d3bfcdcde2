//! Core logic for the private API reverse proxy
//!
//! This library provides:
//! - Apex-domain derivation and wildcard certificate deduplication
//! - Parsing of private API Gateway URLs into gateway id, stage and resource path
//! - Resource-policy generation grouped by API Gateway
//! - Assembly and guarded writing of the deployment outputs file

pub mod api_url;
pub mod domain;
pub mod error;
pub mod outputs;
pub mod policy;

pub use api_url::PrivateApiUrl;
pub use domain::{cert_domain, certificate_requests, CertificateRequest};
pub use error::{CoreError, Result};
pub use outputs::{validate_destination, write_outputs_file, OutputsFile, VPC_ENDPOINT_OUTPUT_KEY};
pub use policy::{string_hash, Effect, PolicyDocument, PolicyMapping, PolicyStatement};
