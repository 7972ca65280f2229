mod config;
mod decode;
mod encode;
mod error;
mod exec_credential;
mod node;
mod property;

pub use config::KubeConfig;
pub use decode::decode_configuration;
pub use decode::decode_exec_credential;
pub use decode::decode_key_value;
pub use decode::decode_key_value_sequence;
pub use decode::decode_properties;
pub use decode::decode_property;
pub use decode::decode_property_as;
pub use decode::decode_property_sequence;
pub use decode::decode_string_sequence;
pub use decode::DecodeProperty;
pub use encode::encode_configuration;
pub use encode::encode_property;
pub use error::ConfigError;
pub use exec_credential::parse_exec_credential;
pub use exec_credential::ExecCredential;
pub use exec_credential::ExecCredentialStatus;
pub use node::Node;
pub use node::NodeKind;
pub use node::TreeAdapter;
pub use node::YamlTree;
pub use property::AuthProvider;
pub use property::Cluster;
pub use property::Context;
pub use property::Exec;
pub use property::KeyValuePair;
pub use property::Property;
pub use property::PropertyKind;
pub use property::User;
