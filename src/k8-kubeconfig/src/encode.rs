use crate::property::key;
use crate::AuthProvider;
use crate::Cluster;
use crate::Context;
use crate::Exec;
use crate::KeyValuePair;
use crate::KubeConfig;
use crate::Node;
use crate::Property;
use crate::User;

/// accumulates pairs of a mapping node in insertion order
#[derive(Default)]
struct MappingNode(Vec<(Node, Node)>);

impl MappingNode {
    fn node(mut self, key: &str, value: Node) -> Self {
        self.0.push((Node::scalar(key), value));
        self
    }

    fn scalar(self, key: &str, value: &str) -> Self {
        self.node(key, Node::scalar(value))
    }

    /// unset values are left out
    fn optional(self, key: &str, value: &Option<String>) -> Self {
        match value {
            Some(value) => self.scalar(key, value),
            None => self,
        }
    }

    fn optional_node(self, key: &str, value: Option<Node>) -> Self {
        match value {
            Some(value) => self.node(key, value),
            None => self,
        }
    }

    fn build(self) -> Node {
        Node::Mapping(self.0)
    }
}

fn encode_cluster(cluster: &Cluster) -> Node {
    let detail = MappingNode::default()
        .optional(key::CERTIFICATE_AUTHORITY_DATA, &cluster.certificate_authority_data)
        .optional(key::SERVER, &cluster.server)
        .build();

    MappingNode::default()
        .node(key::CLUSTER, detail)
        .optional(key::NAME, &cluster.name)
        .build()
}

fn encode_context(context: &Context) -> Node {
    let detail = MappingNode::default()
        .optional(key::CLUSTER, &context.cluster)
        .optional(key::NAMESPACE, &context.namespace)
        .optional(key::USER, &context.user)
        .build();

    MappingNode::default()
        .node(key::CONTEXT, detail)
        .optional(key::NAME, &context.name)
        .build()
}

fn encode_user(user: &User) -> Node {
    let detail = MappingNode::default()
        .optional_node(
            key::AUTH_PROVIDER,
            user.auth_provider.as_ref().map(encode_auth_provider),
        )
        .optional(key::CLIENT_CERTIFICATE_DATA, &user.client_certificate_data)
        .optional(key::CLIENT_KEY_DATA, &user.client_key_data)
        .optional_node(key::EXEC, user.exec.as_ref().map(encode_exec))
        .build();

    MappingNode::default()
        .optional(key::NAME, &user.name)
        .node(key::USER, detail)
        .build()
}

fn encode_env(env: &KeyValuePair) -> Node {
    MappingNode::default()
        .scalar(key::EXEC_ENV_NAME, &env.key)
        .scalar(key::EXEC_ENV_VALUE, &env.value)
        .build()
}

fn encode_exec(exec: &Exec) -> Node {
    let args = (!exec.args.is_empty())
        .then(|| Node::Sequence(exec.args.iter().map(Node::scalar).collect()));
    let envs = (!exec.envs.is_empty())
        .then(|| Node::Sequence(exec.envs.iter().map(encode_env).collect()));

    MappingNode::default()
        .optional(key::API_VERSION, &exec.api_version)
        .optional_node(key::EXEC_ARGS, args)
        .optional(key::EXEC_COMMAND, &exec.command)
        .optional_node(key::EXEC_ENV, envs)
        .optional(key::NAME, &exec.name)
        .build()
}

fn encode_auth_provider(provider: &AuthProvider) -> Node {
    let config = MappingNode::default()
        .optional(key::ACCESS_TOKEN, &provider.access_token)
        .optional(key::CLIENT_ID, &provider.client_id)
        .optional(key::CLIENT_SECRET, &provider.client_secret)
        .optional(key::CMD_PATH, &provider.cmd_path)
        .optional(key::EXPIRES_ON, &provider.expires_on)
        .optional(key::EXPIRY, &provider.expiry)
        .optional(key::ID_TOKEN, &provider.id_token)
        .optional(key::IDP_CERTIFICATE_AUTHORITY, &provider.idp_certificate_authority)
        .optional(key::IDP_ISSUER_URL, &provider.idp_issuer_url)
        .optional(key::REFRESH_TOKEN, &provider.refresh_token)
        .build();

    MappingNode::default()
        .node(key::AUTH_PROVIDER_CONFIG, config)
        .optional(key::NAME, &provider.name)
        .build()
}

/// Encode a property the way it appears in its parent:
/// a list entry for clusters, contexts and users, a plain block for
/// exec and auth-provider.
pub fn encode_property(property: &Property) -> Node {
    match property {
        Property::Cluster(cluster) => encode_cluster(cluster),
        Property::Context(context) => encode_context(context),
        Property::User(user) => encode_user(user),
        Property::UserExec(exec) => encode_exec(exec),
        Property::UserAuthProvider(provider) => encode_auth_provider(provider),
    }
}

fn encode_list<T>(items: &[T], encode: fn(&T) -> Node) -> Node {
    Node::Sequence(items.iter().map(encode).collect())
}

/// Build document tree. Top level keys are always written in the same order
/// regardless of the order they were read in.
pub fn encode_configuration(config: &KubeConfig) -> Node {
    MappingNode::default()
        .optional(key::API_VERSION, &config.api_version)
        .node(key::CLUSTERS, encode_list(&config.clusters, encode_cluster))
        .node(key::CONTEXTS, encode_list(&config.contexts, encode_context))
        .optional(key::CURRENT_CONTEXT, &config.current_context)
        .optional(key::KIND, &config.kind)
        .node(key::PREFERENCES, Node::Mapping(vec![]))
        .node(key::USERS, encode_list(&config.users, encode_user))
        .build()
}
