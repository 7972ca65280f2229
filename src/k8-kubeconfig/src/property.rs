use std::fmt;

/// document keys shared by the decoder and the encoder
pub(crate) mod key {
    pub const API_VERSION: &str = "apiVersion";
    pub const KIND: &str = "kind";
    pub const CURRENT_CONTEXT: &str = "current-context";
    pub const PREFERENCES: &str = "preferences";
    pub const CLUSTERS: &str = "clusters";
    pub const CLUSTER: &str = "cluster";
    pub const CONTEXTS: &str = "contexts";
    pub const CONTEXT: &str = "context";
    pub const NAMESPACE: &str = "namespace";
    pub const USERS: &str = "users";
    pub const USER: &str = "user";
    pub const NAME: &str = "name";
    pub const SERVER: &str = "server";
    pub const CERTIFICATE_AUTHORITY_DATA: &str = "certificate-authority-data";
    pub const CLIENT_CERTIFICATE_DATA: &str = "client-certificate-data";
    pub const CLIENT_KEY_DATA: &str = "client-key-data";

    pub const EXEC: &str = "exec";
    pub const EXEC_COMMAND: &str = "command";
    pub const EXEC_ARGS: &str = "args";
    pub const EXEC_ENV: &str = "env";
    pub const EXEC_ENV_NAME: &str = "name";
    pub const EXEC_ENV_VALUE: &str = "value";

    pub const AUTH_PROVIDER: &str = "auth-provider";
    pub const AUTH_PROVIDER_CONFIG: &str = "config";
    pub const ACCESS_TOKEN: &str = "access-token";
    pub const CLIENT_ID: &str = "client-id";
    pub const CLIENT_SECRET: &str = "client-secret";
    pub const CMD_PATH: &str = "cmd-path";
    pub const EXPIRES_ON: &str = "expires-on";
    pub const EXPIRY: &str = "expiry";
    pub const ID_TOKEN: &str = "id-token";
    pub const IDP_CERTIFICATE_AUTHORITY: &str = "idp-certificate-authority";
    pub const IDP_ISSUER_URL: &str = "idp-issuer-url";
    pub const REFRESH_TOKEN: &str = "refresh-token";

    pub const STATUS: &str = "status";
    pub const TOKEN: &str = "token";
    pub const STATUS_CLIENT_CERTIFICATE_DATA: &str = "clientCertificateData";
    pub const STATUS_CLIENT_KEY_DATA: &str = "clientKeyData";
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PropertyKind {
    Cluster,
    Context,
    User,
    UserExec,
    UserAuthProvider,
}

impl PropertyKind {
    /// key under which the property is written in its parent mapping
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Cluster => key::CLUSTER,
            Self::Context => key::CONTEXT,
            Self::User => key::USER,
            Self::UserExec => key::EXEC,
            Self::UserAuthProvider => key::AUTH_PROVIDER,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// A kubeconfig entity. The variant is fixed when the value is built.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Property {
    Cluster(Cluster),
    Context(Context),
    User(User),
    UserExec(Exec),
    UserAuthProvider(AuthProvider),
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Cluster(_) => PropertyKind::Cluster,
            Self::Context(_) => PropertyKind::Context,
            Self::User(_) => PropertyKind::User,
            Self::UserExec(_) => PropertyKind::UserExec,
            Self::UserAuthProvider(_) => PropertyKind::UserAuthProvider,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Cluster(cluster) => cluster.name.as_deref(),
            Self::Context(context) => context.name.as_deref(),
            Self::User(user) => user.name.as_deref(),
            Self::UserExec(exec) => exec.name.as_deref(),
            Self::UserAuthProvider(provider) => provider.name.as_deref(),
        }
    }
}

impl From<Cluster> for Property {
    fn from(cluster: Cluster) -> Self {
        Self::Cluster(cluster)
    }
}

impl From<Context> for Property {
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

impl From<User> for Property {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}

impl From<Exec> for Property {
    fn from(exec: Exec) -> Self {
        Self::UserExec(exec)
    }
}

impl From<AuthProvider> for Property {
    fn from(provider: AuthProvider) -> Self {
        Self::UserAuthProvider(provider)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Cluster {
    pub name: Option<String>,
    pub certificate_authority_data: Option<String>,
    pub server: Option<String>,
}

/// Named binding of a cluster, a user and a namespace.
/// `cluster` and `user` refer to other entries by name.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Context {
    pub name: Option<String>,
    pub cluster: Option<String>,
    pub namespace: Option<String>,
    pub user: Option<String>,
}

impl Context {
    pub fn namespace(&self) -> &str {
        match &self.namespace {
            Some(nm) => nm,
            None => "default",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct User {
    pub name: Option<String>,
    pub client_certificate_data: Option<String>,
    pub client_key_data: Option<String>,
    pub exec: Option<Exec>,
    pub auth_provider: Option<AuthProvider>,
}

/// credential plugin invocation of a user
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Exec {
    pub name: Option<String>,
    pub api_version: Option<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub envs: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct AuthProvider {
    pub name: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub cmd_path: Option<String>,
    pub expires_on: Option<String>,
    pub expiry: Option<String>,
    pub id_token: Option<String>,
    pub idp_certificate_authority: Option<String>,
    pub idp_issuer_url: Option<String>,
    pub refresh_token: Option<String>,
}

/// exec environment variable
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
