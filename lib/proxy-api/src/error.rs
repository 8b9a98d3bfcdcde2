use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid load balancer type: {0} (expected NLB or ALB)")]
    InvalidElbType(String),

    #[error("Invalid createVpc flag: {0} (expected true or false)")]
    InvalidCreateVpc(String),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
