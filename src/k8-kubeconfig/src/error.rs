use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;
use thiserror::Error;
use yaml_rust::ScanError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Yaml error: {0}")]
    SerdeError(#[from] SerdeYamlError),
    #[error("Yaml scan error: {0}")]
    ScanError(#[from] ScanError),
    /// document root is missing or is not a mapping
    #[error("Format error: {0}")]
    Format(String),
    /// document structure does not match the expected schema
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("No active Kubernetes context")]
    NoCurrentContext,
    #[error("Unknown error: {0}")]
    Other(String),
}

impl ConfigError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
