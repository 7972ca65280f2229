use std::env;
use std::fs::read_to_string;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use dirs::home_dir;
use tracing::debug;
use tracing::warn;

use crate::decode::decode_configuration;
use crate::encode::encode_configuration;
use crate::Cluster;
use crate::ConfigError;
use crate::Context;
use crate::TreeAdapter;
use crate::User;
use crate::YamlTree;

const KUBECONFIG: &str = "KUBECONFIG";

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct KubeConfig {
    /// file this config was read from, target of [`KubeConfig::save`]
    pub path: PathBuf,
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub current_context: Option<String>,
    pub clusters: Vec<Cluster>,
    pub contexts: Vec<Context>,
    pub users: Vec<User>,
}

impl KubeConfig {
    /// read from `KUBECONFIG` if set, otherwise from home directory
    pub fn load() -> Result<Self, ConfigError> {
        match env::var_os(KUBECONFIG) {
            Some(paths) => match env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
                Some(path) => Self::from_file(path),
                None => Self::from_home(),
            },
            None => Self::from_home(),
        }
    }

    /// read from default home directory
    pub fn from_home() -> Result<Self, ConfigError> {
        let home_dir =
            home_dir().ok_or_else(|| ConfigError::Other("no home directory".to_owned()))?;
        Self::from_file(home_dir.join(".kube").join("config"))
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        debug!(path = %path.as_ref().display(), "loading kubeconfig");
        let input = read_to_string(path.as_ref())?;
        let mut config = Self::from_str_with(&YamlTree, &input)?;
        config.path = path.as_ref().to_path_buf();
        Ok(config)
    }

    /// Keep the last document of the stream that decodes; documents are
    /// not merged. Fails with the last document's error only when none decodes.
    pub fn from_str_with<A: TreeAdapter>(adapter: &A, input: &str) -> Result<Self, ConfigError> {
        let mut last_error = None;
        for document in adapter.parse_documents(input)?.iter().rev() {
            match decode_configuration(document) {
                Ok(config) => return Ok(config),
                Err(err) => {
                    warn!(%err, "skipping kubeconfig document");
                    last_error.get_or_insert(err);
                }
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(Self::default()),
        }
    }

    pub fn to_string_with<A: TreeAdapter>(&self, adapter: &A) -> Result<String, ConfigError> {
        adapter.emit_document(&encode_configuration(self))
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        self.to_string_with(&YamlTree)
    }

    /// write to `path`, replacing any existing content
    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> Result<(), ConfigError> {
        let output = self.to_yaml_string()?;
        debug!(path = %path.as_ref().display(), "saving kubeconfig");
        let mut file = File::create(path)?;
        file.write_all(output.as_bytes())?;
        Ok(file.sync_all()?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Other("kubeconfig path is not set".to_owned()));
        }
        self.to_file(&self.path)
    }

    pub fn current_context(&self) -> Option<&Context> {
        let current = self.current_context.as_deref()?;
        self.contexts
            .iter()
            .find(|c| c.name.as_deref() == Some(current))
    }

    pub fn current_cluster(&self) -> Option<&Cluster> {
        let cluster = self.current_context()?.cluster.as_deref()?;
        self.clusters
            .iter()
            .find(|c| c.name.as_deref() == Some(cluster))
    }

    pub fn current_user(&self) -> Option<&User> {
        let user = self.current_context()?.user.as_deref()?;
        self.users.iter().find(|u| u.name.as_deref() == Some(user))
    }

    pub fn put_user(&mut self, user: User) -> Option<User> {
        let prev = self
            .users
            .iter_mut()
            .find(|u| u.name.is_some() && u.name == user.name);
        match prev {
            Some(prev) => Some(std::mem::replace(prev, user)),
            None => {
                self.users.push(user);
                None
            }
        }
    }

    pub fn put_cluster(&mut self, cluster: Cluster) -> Option<Cluster> {
        let prev = self
            .clusters
            .iter_mut()
            .find(|c| c.name.is_some() && c.name == cluster.name);
        match prev {
            Some(prev) => Some(std::mem::replace(prev, cluster)),
            None => {
                self.clusters.push(cluster);
                None
            }
        }
    }

    pub fn put_context(&mut self, context: Context) -> Option<Context> {
        let prev = self
            .contexts
            .iter_mut()
            .find(|c| c.name.is_some() && c.name == context.name);
        match prev {
            Some(prev) => Some(std::mem::replace(prev, context)),
            None => {
                self.contexts.push(context);
                None
            }
        }
    }
}

impl FromStr for KubeConfig {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::from_str_with(&YamlTree, input)
    }
}

#[cfg(test)]
mod test {

    use std::env::temp_dir;

    use crate::{Cluster, ConfigError, Context, Node, TreeAdapter, User};

    use super::KubeConfig;

    #[test]
    fn test_decode_default_config() {
        let config = KubeConfig::from_file("data/k8config.yaml").expect("read");
        assert_eq!(config.api_version.as_deref(), Some("v1"));
        assert_eq!(config.kind.as_deref(), Some("Config"));
        assert_eq!(config.current_context.as_deref(), Some("flv"));
        assert_eq!(config.clusters.len(), 1);
        let cluster = &config.clusters[0];
        assert_eq!(cluster.server.as_deref(), Some("https://192.168.0.0:8443"));
        assert_eq!(cluster.certificate_authority_data.as_deref(), Some("Y2EtZGF0YQ=="));
        assert_eq!(config.contexts.len(), 2);
        let ctx = &config.contexts[0];
        assert_eq!(ctx.cluster.as_deref(), Some("minikube"));
        assert_eq!(ctx.namespace(), "flv");

        let current_cluster = config.current_cluster().expect("current");
        assert_eq!(current_cluster.name.as_deref(), Some("minikube"));
        let current_user = config.current_user().expect("user");
        assert_eq!(current_user.client_key_data.as_deref(), Some("a2V5LWRhdGE="));
        assert_eq!(config.path.to_str(), Some("data/k8config.yaml"));
    }

    #[test]
    fn test_config_ser() {
        //given
        let config = KubeConfig::from_file("data/k8config.yaml").expect("read");

        //when
        let serialized = config.to_yaml_string().expect("serialized");

        //then
        assert_eq!(
            serialized,
            r#"apiVersion: v1
clusters:
- cluster:
    certificate-authority-data: Y2EtZGF0YQ==
    server: https://192.168.0.0:8443
  name: minikube
contexts:
- context:
    cluster: minikube
    namespace: flv
    user: minikube
  name: flv
- context:
    cluster: minikube
    user: minikube
  name: minikube
current-context: flv
kind: Config
preferences: {}
users:
- name: minikube
  user:
    client-certificate-data: Y2VydC1kYXRh
    client-key-data: a2V5LWRhdGE=
"#
        );
    }

    #[test]
    fn test_multi_document_keeps_last() {
        let config = KubeConfig::from_file("data/multi-doc.yaml").expect("read");
        assert_eq!(config.current_context.as_deref(), Some("second"));
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].name.as_deref(), Some("second"));
    }

    #[test]
    fn test_multi_document_skips_undecodable_last() {
        let config: KubeConfig = "current-context: first\n---\n- not\n- a mapping\n"
            .parse()
            .expect("decodable document");
        assert_eq!(config.current_context.as_deref(), Some("first"));
    }

    #[test]
    fn test_scalars_keep_source_text() {
        let config: KubeConfig =
            "apiVersion: 1.10\ncurrent-context: 0x1F\ncontexts:\n- name: True\n  context:\n    namespace: 1e3\n"
                .parse()
                .expect("config");
        assert_eq!(config.api_version.as_deref(), Some("1.10"));
        assert_eq!(config.current_context.as_deref(), Some("0x1F"));
        assert_eq!(config.contexts[0].name.as_deref(), Some("True"));
        assert_eq!(config.contexts[0].namespace(), "1e3");
    }

    #[test]
    fn test_empty_stream() {
        let config: KubeConfig = "".parse().expect("empty");
        assert_eq!(config, KubeConfig::default());
    }

    #[test]
    fn test_non_mapping_root() {
        let err = "- a\n- b\n".parse::<KubeConfig>().expect_err("root");
        assert!(err.is_format());
    }

    #[test]
    fn test_missing_file() {
        let err = KubeConfig::from_file("data/does-not-exist.yaml").expect_err("missing");
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_save_and_reload() {
        //given
        let mut config = KubeConfig::from_file("data/k8config.yaml").expect("read");
        let path = temp_dir().join(format!("k8-kubeconfig-{}.yaml", std::process::id()));
        config.path = path.clone();
        config.current_context = Some("minikube".to_owned());

        //when
        config.save().expect("save");
        config.save().expect("save again");
        let reloaded = KubeConfig::from_file(&path).expect("reload");
        std::fs::remove_file(&path).expect("cleanup");

        //then
        assert_eq!(reloaded, config);
        assert_eq!(
            reloaded.current_context().and_then(|c| c.name.as_deref()),
            Some("minikube")
        );
    }

    #[test]
    fn test_save_without_path() {
        assert!(KubeConfig::default().save().is_err());
    }

    struct FixedTree(Vec<Node>);

    impl TreeAdapter for FixedTree {
        fn parse_documents(&self, _input: &str) -> Result<Vec<Node>, ConfigError> {
            Ok(self.0.clone())
        }

        fn emit_document(&self, root: &Node) -> Result<String, ConfigError> {
            Ok(format!("{:?}", root.kind()))
        }
    }

    #[test]
    fn test_injected_adapter() {
        let adapter = FixedTree(vec![Node::Mapping(vec![(
            Node::scalar("current-context"),
            Node::scalar("injected"),
        )])]);
        let config = KubeConfig::from_str_with(&adapter, "ignored").expect("config");
        assert_eq!(config.current_context.as_deref(), Some("injected"));
        assert_eq!(config.to_string_with(&adapter).expect("emit"), "Mapping");
    }

    #[test]
    fn test_current_context_missing() {
        let config = KubeConfig {
            current_context: Some("absent".to_owned()),
            ..Default::default()
        };
        assert!(config.current_context().is_none());
        assert!(config.current_cluster().is_none());
        assert!(config.current_user().is_none());
    }

    #[test]
    fn test_put_user() {
        //given
        let mut config = KubeConfig::default();

        let user1 = User {
            name: Some("user1".to_string()),
            client_key_data: Some("key1".to_string()),
            ..Default::default()
        };

        let user1_2 = User {
            name: Some("user1".to_string()),
            client_key_data: Some("key2".to_string()),
            ..Default::default()
        };

        let user2 = User {
            name: Some("user2".to_string()),
            ..Default::default()
        };

        //when
        assert!(config.put_user(user1).is_none());
        assert!(config.put_user(user2).is_none());

        let prev = config.put_user(user1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().client_key_data.unwrap(), "key1");
        assert_eq!(config.users.len(), 2);
    }

    #[test]
    fn test_put_cluster() {
        //given
        let mut config = KubeConfig::default();

        let cluster1 = Cluster {
            name: Some("cluster1".to_string()),
            server: Some("server1".to_string()),
            ..Default::default()
        };

        let cluster1_2 = Cluster {
            name: Some("cluster1".to_string()),
            server: Some("server2".to_string()),
            ..Default::default()
        };

        let cluster2 = Cluster {
            name: Some("cluster2".to_string()),
            ..Default::default()
        };

        //when
        assert!(config.put_cluster(cluster1).is_none());
        assert!(config.put_cluster(cluster2).is_none());

        let prev = config.put_cluster(cluster1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().server.unwrap(), "server1");
    }

    #[test]
    fn test_put_context() {
        //given
        let mut config = KubeConfig::default();

        let context1 = Context {
            name: Some("context1".to_string()),
            cluster: Some("cluster1".to_string()),
            ..Default::default()
        };

        let context1_2 = Context {
            name: Some("context1".to_string()),
            cluster: Some("cluster2".to_string()),
            ..Default::default()
        };

        let context2 = Context {
            name: Some("context2".to_string()),
            ..Default::default()
        };

        //when
        assert!(config.put_context(context1).is_none());
        assert!(config.put_context(context2).is_none());

        let prev = config.put_context(context1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().cluster.unwrap(), "cluster1");
    }

    #[test]
    fn test_put_unnamed_appends() {
        //given
        let mut config = KubeConfig::default();

        //when
        assert!(config.put_user(User::default()).is_none());
        assert!(config.put_user(User::default()).is_none());
        assert!(config.put_cluster(Cluster::default()).is_none());
        assert!(config.put_cluster(Cluster::default()).is_none());
        assert!(config.put_context(Context::default()).is_none());
        assert!(config.put_context(Context::default()).is_none());

        //then
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.clusters.len(), 2);
        assert_eq!(config.contexts.len(), 2);
    }
}
