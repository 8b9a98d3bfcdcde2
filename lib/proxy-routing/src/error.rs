use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutingError>;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("There is already a construct with id {0}")]
    DuplicateConstruct(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Invalid subnet id list: {0}")]
    InvalidSubnetIds(#[source] serde_json::Error),

    #[error("No subnets available in VPC {0}")]
    NoSubnets(String),

    #[error("Listener needs at least one certificate, no proxy domains were supplied")]
    NoCertificates,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
