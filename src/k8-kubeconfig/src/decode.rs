use std::fmt::Display;

use tracing::debug;
use tracing::trace;

use crate::property::key;
use crate::AuthProvider;
use crate::Cluster;
use crate::ConfigError;
use crate::Context;
use crate::Exec;
use crate::ExecCredential;
use crate::ExecCredentialStatus;
use crate::KeyValuePair;
use crate::KubeConfig;
use crate::Node;
use crate::Property;
use crate::PropertyKind;
use crate::User;

fn expect_mapping(node: &Node, what: impl Display) -> Result<&[(Node, Node)], ConfigError> {
    node.as_mapping().ok_or_else(|| {
        ConfigError::schema(format!("{} must be a mapping, found {}", what, node.kind()))
    })
}

fn expect_sequence(node: &Node, what: impl Display) -> Result<&[Node], ConfigError> {
    node.as_sequence().ok_or_else(|| {
        ConfigError::schema(format!("{} must be a sequence, found {}", what, node.kind()))
    })
}

fn scalar_key(node: &Node, what: impl Display) -> Result<&str, ConfigError> {
    node.as_scalar().ok_or_else(|| {
        ConfigError::schema(format!(
            "key node of {} is not a scalar but a {}",
            what,
            node.kind()
        ))
    })
}

/// decode sequence of scalars, order is preserved
pub fn decode_string_sequence(node: &Node) -> Result<Vec<String>, ConfigError> {
    expect_sequence(node, "string list")?
        .iter()
        .map(|item| {
            item.as_scalar().map(str::to_owned).ok_or_else(|| {
                ConfigError::schema(format!("string list item is a {}", item.kind()))
            })
        })
        .collect()
}

/// Decode `{name, value}` mapping.
/// Unlike properties, any other key is rejected.
pub fn decode_key_value(node: &Node) -> Result<KeyValuePair, ConfigError> {
    let mut name = None;
    let mut value = None;
    for (key_node, value_node) in expect_mapping(node, "exec env entry")? {
        let field = scalar_key(key_node, "exec env entry")?;
        let slot = match field {
            key::EXEC_ENV_NAME => &mut name,
            key::EXEC_ENV_VALUE => &mut value,
            _ => {
                return Err(ConfigError::schema(format!(
                    "invalid key in exec env entry: {}",
                    field
                )))
            }
        };
        let text = value_node.as_scalar().ok_or_else(|| {
            ConfigError::schema(format!(
                "exec env {} must be a scalar, found {}",
                field,
                value_node.kind()
            ))
        })?;
        *slot = Some(text.to_owned());
    }

    match (name, value) {
        (Some(name), Some(value)) => Ok(KeyValuePair::new(name, value)),
        (None, _) => Err(ConfigError::schema("exec env entry has no name")),
        (Some(name), None) => Err(ConfigError::schema(format!(
            "exec env entry {} has no value",
            name
        ))),
    }
}

pub fn decode_key_value_sequence(node: &Node) -> Result<Vec<KeyValuePair>, ConfigError> {
    expect_sequence(node, "exec env")?
        .iter()
        .map(decode_key_value)
        .collect()
}

/// Field set of one property variant.
///
/// [`decode_property_as`] walks the mapping and hands every pair to the
/// matching hook. Hooks return `false` for keys they do not know, which are
/// then ignored.
pub trait DecodeProperty: Default + Into<Property> {
    const KIND: PropertyKind;

    fn name_mut(&mut self) -> &mut Option<String>;

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool;

    /// Nested mapping. Unless the variant owns a child under `field`, the
    /// mapping is read into the same property.
    fn decode_mapping(&mut self, field: &str, node: &Node) -> Result<(), ConfigError> {
        trace!(kind = %Self::KIND, field, "flattening nested mapping");
        decode_fields(self, node)
    }

    fn decode_sequence(&mut self, _field: &str, _node: &Node) -> Result<bool, ConfigError> {
        Ok(false)
    }
}

fn set(slot: &mut Option<String>, value: &str) -> bool {
    *slot = Some(value.to_owned());
    true
}

impl DecodeProperty for Cluster {
    const KIND: PropertyKind = PropertyKind::Cluster;

    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool {
        match field {
            key::CERTIFICATE_AUTHORITY_DATA => set(&mut self.certificate_authority_data, value),
            key::SERVER => set(&mut self.server, value),
            _ => false,
        }
    }
}

impl DecodeProperty for Context {
    const KIND: PropertyKind = PropertyKind::Context;

    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool {
        match field {
            key::CLUSTER => set(&mut self.cluster, value),
            key::NAMESPACE => set(&mut self.namespace, value),
            key::USER => set(&mut self.user, value),
            _ => false,
        }
    }
}

impl DecodeProperty for User {
    const KIND: PropertyKind = PropertyKind::User;

    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool {
        match field {
            key::CLIENT_CERTIFICATE_DATA => set(&mut self.client_certificate_data, value),
            key::CLIENT_KEY_DATA => set(&mut self.client_key_data, value),
            _ => false,
        }
    }

    fn decode_mapping(&mut self, field: &str, node: &Node) -> Result<(), ConfigError> {
        match field {
            key::EXEC => {
                debug!(user = ?self.name, "decoding exec");
                self.exec = Some(decode_property_as(node)?);
            }
            key::AUTH_PROVIDER => {
                debug!(user = ?self.name, "decoding auth provider");
                self.auth_provider = Some(decode_property_as(node)?);
            }
            _ => decode_fields(self, node)?,
        }
        Ok(())
    }
}

impl DecodeProperty for Exec {
    const KIND: PropertyKind = PropertyKind::UserExec;

    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool {
        match field {
            key::API_VERSION => set(&mut self.api_version, value),
            key::EXEC_COMMAND => set(&mut self.command, value),
            _ => false,
        }
    }

    fn decode_sequence(&mut self, field: &str, node: &Node) -> Result<bool, ConfigError> {
        match field {
            key::EXEC_ENV => self.envs = decode_key_value_sequence(node)?,
            key::EXEC_ARGS => self.args = decode_string_sequence(node)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl DecodeProperty for AuthProvider {
    const KIND: PropertyKind = PropertyKind::UserAuthProvider;

    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }

    fn decode_scalar(&mut self, field: &str, value: &str) -> bool {
        let slot = match field {
            key::ACCESS_TOKEN => &mut self.access_token,
            key::CLIENT_ID => &mut self.client_id,
            key::CLIENT_SECRET => &mut self.client_secret,
            key::CMD_PATH => &mut self.cmd_path,
            key::EXPIRES_ON => &mut self.expires_on,
            key::EXPIRY => &mut self.expiry,
            key::ID_TOKEN => &mut self.id_token,
            key::IDP_CERTIFICATE_AUTHORITY => &mut self.idp_certificate_authority,
            key::IDP_ISSUER_URL => &mut self.idp_issuer_url,
            key::REFRESH_TOKEN => &mut self.refresh_token,
            _ => return false,
        };
        set(slot, value)
    }
}

fn decode_fields<P: DecodeProperty>(property: &mut P, node: &Node) -> Result<(), ConfigError> {
    for (key_node, value) in expect_mapping(node, P::KIND)? {
        let field = scalar_key(key_node, P::KIND)?;
        let known = match value {
            Node::Scalar(text) if field == key::NAME => set(property.name_mut(), text),
            Node::Scalar(text) => property.decode_scalar(field, text),
            Node::Mapping(_) => {
                property.decode_mapping(field, value)?;
                true
            }
            Node::Sequence(_) => property.decode_sequence(field, value)?,
        };
        if !known {
            trace!(kind = %P::KIND, field, "ignoring unknown key");
        }
    }
    Ok(())
}

/// decode mapping into a fresh property of type `P`
pub fn decode_property_as<P: DecodeProperty>(node: &Node) -> Result<P, ConfigError> {
    let mut property = P::default();
    decode_fields(&mut property, node)?;
    Ok(property)
}

pub fn decode_property(node: &Node, kind: PropertyKind) -> Result<Property, ConfigError> {
    match kind {
        PropertyKind::Cluster => decode_property_as::<Cluster>(node).map(Property::from),
        PropertyKind::Context => decode_property_as::<Context>(node).map(Property::from),
        PropertyKind::User => decode_property_as::<User>(node).map(Property::from),
        PropertyKind::UserExec => decode_property_as::<Exec>(node).map(Property::from),
        PropertyKind::UserAuthProvider => {
            decode_property_as::<AuthProvider>(node).map(Property::from)
        }
    }
}

/// decode every item of the sequence, failing on the first bad item
pub fn decode_properties<P: DecodeProperty>(node: &Node) -> Result<Vec<P>, ConfigError> {
    expect_sequence(node, format!("{} list", P::KIND))?
        .iter()
        .map(decode_property_as)
        .collect()
}

pub fn decode_property_sequence(
    node: &Node,
    kind: PropertyKind,
) -> Result<Vec<Property>, ConfigError> {
    expect_sequence(node, format!("{} list", kind))?
        .iter()
        .map(|item| decode_property(item, kind))
        .collect()
}

pub fn decode_configuration(root: &Node) -> Result<KubeConfig, ConfigError> {
    let pairs = root.as_mapping().ok_or_else(|| {
        ConfigError::Format(format!(
            "not a valid kubeconfig, root node is a {}",
            root.kind()
        ))
    })?;

    let mut config = KubeConfig::default();
    for (key_node, value) in pairs {
        let field = scalar_key(key_node, "kubeconfig")?;
        match (field, value) {
            (key::API_VERSION, Node::Scalar(text)) => config.api_version = Some(text.clone()),
            (key::KIND, Node::Scalar(text)) => config.kind = Some(text.clone()),
            (key::CURRENT_CONTEXT, Node::Scalar(text)) => {
                config.current_context = Some(text.clone())
            }
            (_, Node::Scalar(_)) => trace!(field, "ignoring kubeconfig scalar"),
            (key::CLUSTERS, _) => config.clusters = decode_properties(value)?,
            (key::CONTEXTS, _) => config.contexts = decode_properties(value)?,
            (key::USERS, _) => config.users = decode_properties(value)?,
            _ => trace!(field, "ignoring kubeconfig key"),
        }
    }

    debug!(
        clusters = config.clusters.len(),
        contexts = config.contexts.len(),
        users = config.users.len(),
        "decoded kubeconfig"
    );
    Ok(config)
}

enum StatusKind {
    Token,
    ClientCert,
}

/// The variant follows the last credential key in the mapping.
fn decode_exec_credential_status(
    node: &Node,
) -> Result<Option<ExecCredentialStatus>, ConfigError> {
    let mut kind = None;
    let mut token = None;
    let mut client_certificate_data = None;
    let mut client_key_data = None;

    for (key_node, value) in expect_mapping(node, "exec credential status")? {
        let field = scalar_key(key_node, "exec credential status")?;
        let Some(text) = value.as_scalar() else {
            trace!(field, "ignoring non scalar status key");
            continue;
        };
        match field {
            key::TOKEN => {
                token = Some(text.to_owned());
                kind = Some(StatusKind::Token);
            }
            key::STATUS_CLIENT_CERTIFICATE_DATA => {
                client_certificate_data = Some(text.to_owned());
                kind = Some(StatusKind::ClientCert);
            }
            key::STATUS_CLIENT_KEY_DATA => {
                client_key_data = Some(text.to_owned());
                kind = Some(StatusKind::ClientCert);
            }
            _ => trace!(field, "ignoring status key"),
        }
    }

    Ok(match kind {
        Some(StatusKind::Token) => token.map(|token| ExecCredentialStatus::Token { token }),
        Some(StatusKind::ClientCert) => Some(ExecCredentialStatus::ClientCert {
            client_certificate_data,
            client_key_data,
        }),
        None => None,
    })
}

pub fn decode_exec_credential(root: &Node) -> Result<ExecCredential, ConfigError> {
    let pairs = root.as_mapping().ok_or_else(|| {
        ConfigError::Format(format!(
            "not a valid exec credential, root node is a {}",
            root.kind()
        ))
    })?;

    let mut credential = ExecCredential::default();
    for (key_node, value) in pairs {
        let field = scalar_key(key_node, "exec credential")?;
        match (field, value) {
            (key::API_VERSION, Node::Scalar(text)) => credential.api_version = Some(text.clone()),
            (key::KIND, Node::Scalar(text)) => credential.kind = Some(text.clone()),
            (_, Node::Scalar(_)) => trace!(field, "ignoring exec credential scalar"),
            (key::STATUS, _) => credential.status = decode_exec_credential_status(value)?,
            _ => trace!(field, "ignoring exec credential key"),
        }
    }
    Ok(credential)
}
