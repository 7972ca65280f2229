use std::collections::HashMap;
use std::fmt;

use serde_yaml::Mapping;
use serde_yaml::Value;
use tracing::debug;
use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, TScalarStyle};

use crate::ConfigError;

/// Generic document tree node.
/// Scalars keep their source text; numbers and booleans are not interpreted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Sequence => write!(f, "sequence"),
            Self::Mapping => write!(f, "mapping"),
        }
    }
}

impl Node {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match self {
            Self::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(text) => Value::String(text.clone()),
            Node::Sequence(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            Node::Mapping(pairs) => {
                let mut mapping = Mapping::with_capacity(pairs.len());
                for (key, value) in pairs {
                    mapping.insert(Value::from(key), Value::from(value));
                }
                Value::Mapping(mapping)
            }
        }
    }
}

/// Reader/writer of generic document trees.
///
/// The decoders and the encoder only ever see [`Node`] values, so any
/// implementation can stand in for the YAML one.
pub trait TreeAdapter {
    /// parse every document of the stream, in order.
    fn parse_documents(&self, input: &str) -> Result<Vec<Node>, ConfigError>;

    /// render a single document
    fn emit_document(&self, root: &Node) -> Result<String, ConfigError>;
}

enum Frame {
    Sequence(Vec<Node>, usize),
    /// pairs so far and the key waiting for its value
    Mapping(Vec<(Node, Node)>, Option<Node>, usize),
}

/// Assembles nodes from parser events. Aliases are replaced by a copy of
/// the anchored node.
#[derive(Default)]
struct TreeBuilder {
    documents: Vec<Node>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Node>,
    unknown_alias: Option<usize>,
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

impl TreeBuilder {
    fn push(&mut self, node: Node, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            Some(Frame::Sequence(items, _)) => items.push(node),
            Some(Frame::Mapping(pairs, pending, _)) => match pending.take() {
                Some(key) => pairs.push((key, node)),
                None => *pending = Some(node),
            },
            None => self.documents.push(node),
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, _mark: Marker) {
        match event {
            Event::Scalar(value, style, anchor, _) => {
                // a document without root node carries nothing to decode
                if self.stack.is_empty() && style == TScalarStyle::Plain && is_null(&value) {
                    debug!("skipping empty document");
                    return;
                }
                self.push(Node::Scalar(value), anchor);
            }
            Event::SequenceStart(anchor) => self.stack.push(Frame::Sequence(vec![], anchor)),
            Event::MappingStart(anchor) => self.stack.push(Frame::Mapping(vec![], None, anchor)),
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence(items, anchor)) => self.push(Node::Sequence(items), anchor),
                Some(Frame::Mapping(pairs, _, anchor)) => self.push(Node::Mapping(pairs), anchor),
                None => {}
            },
            Event::Alias(id) => match self.anchors.get(&id).cloned() {
                Some(node) => self.push(node, 0),
                None => self.unknown_alias = Some(id),
            },
            _ => {}
        }
    }
}

/// [`TreeAdapter`] reading with the `yaml-rust` event parser, so scalars
/// arrive as written, and writing with `serde_yaml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlTree;

impl TreeAdapter for YamlTree {
    fn parse_documents(&self, input: &str) -> Result<Vec<Node>, ConfigError> {
        let mut builder = TreeBuilder::default();
        Parser::new(input.chars()).load(&mut builder, true)?;
        if let Some(id) = builder.unknown_alias {
            return Err(ConfigError::schema(format!("alias {} has no anchor", id)));
        }
        debug!(count = builder.documents.len(), "parsed yaml documents");
        Ok(builder.documents)
    }

    /// Entries are written in block style rather than flow style; the
    /// output is UTF-8 with scalars quoted wherever YAML would retype them.
    fn emit_document(&self, root: &Node) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&Value::from(root))?)
    }
}

#[cfg(test)]
mod test {

    use super::Node;
    use super::TreeAdapter;
    use super::YamlTree;

    #[test]
    fn test_parse_keeps_scalar_text() {
        let documents = YamlTree
            .parse_documents("port: 8443\nenabled: true\nname: test\n")
            .expect("parse");
        assert_eq!(documents.len(), 1);
        assert_eq!(
            documents[0],
            Node::Mapping(vec![
                (Node::scalar("port"), Node::scalar("8443")),
                (Node::scalar("enabled"), Node::scalar("true")),
                (Node::scalar("name"), Node::scalar("test")),
            ])
        );
    }

    #[test]
    fn test_parse_multiple_documents() {
        let documents = YamlTree
            .parse_documents("kind: Config\n---\nkind: Other\n")
            .expect("parse");
        assert_eq!(documents.len(), 2);
        assert_eq!(
            documents[1],
            Node::Mapping(vec![(Node::scalar("kind"), Node::scalar("Other"))])
        );
    }

    #[test]
    fn test_parse_sequence() {
        let documents = YamlTree.parse_documents("- a\n- b\n").expect("parse");
        let items = documents[0].as_sequence().expect("sequence");
        assert_eq!(items, &[Node::scalar("a"), Node::scalar("b")]);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(YamlTree.parse_documents("key: [unclosed\n").is_err());
    }

    #[test]
    fn test_emit_keeps_insertion_order() {
        //given
        let root = Node::Mapping(vec![
            (Node::scalar("kind"), Node::scalar("Config")),
            (
                Node::scalar("clusters"),
                Node::Sequence(vec![Node::Mapping(vec![(
                    Node::scalar("name"),
                    Node::scalar("minikube"),
                )])]),
            ),
            (Node::scalar("apiVersion"), Node::scalar("v1")),
            (Node::scalar("preferences"), Node::Mapping(vec![])),
        ]);

        //when
        let emitted = YamlTree.emit_document(&root).expect("emit");

        //then
        assert_eq!(
            emitted,
            "kind: Config\nclusters:\n- name: minikube\napiVersion: v1\npreferences: {}\n"
        );
    }

    #[test]
    fn test_emit_then_parse_keeps_numeric_text() {
        let root = Node::Mapping(vec![(Node::scalar("port"), Node::scalar("8443"))]);
        let emitted = YamlTree.emit_document(&root).expect("emit");
        let parsed = YamlTree.parse_documents(&emitted).expect("parse");
        assert_eq!(parsed, vec![root]);
    }

    #[test]
    fn test_parse_does_not_retype_scalars() {
        //given
        let input = "apiVersion: 1.10\ncurrent-context: 0x1F\nkind: ~\ncontexts:\n- name: True\n  context:\n    namespace: 1e3\n";

        //when
        let documents = YamlTree.parse_documents(input).expect("parse");

        //then
        assert_eq!(
            documents,
            vec![Node::Mapping(vec![
                (Node::scalar("apiVersion"), Node::scalar("1.10")),
                (Node::scalar("current-context"), Node::scalar("0x1F")),
                (Node::scalar("kind"), Node::scalar("~")),
                (
                    Node::scalar("contexts"),
                    Node::Sequence(vec![Node::Mapping(vec![
                        (Node::scalar("name"), Node::scalar("True")),
                        (
                            Node::scalar("context"),
                            Node::Mapping(vec![(Node::scalar("namespace"), Node::scalar("1e3"))]),
                        ),
                    ])]),
                ),
            ])]
        );
    }

    #[test]
    fn test_parse_skips_empty_documents() {
        let documents = YamlTree
            .parse_documents("---\n---\nkind: Config\n---\n~\n")
            .expect("parse");
        assert_eq!(
            documents,
            vec![Node::Mapping(vec![(Node::scalar("kind"), Node::scalar("Config"))])]
        );
    }

    #[test]
    fn test_parse_resolves_alias() {
        let documents = YamlTree
            .parse_documents("base: &base\n  server: https://a\ncopy: *base\n")
            .expect("parse");
        let pairs = documents[0].as_mapping().expect("mapping");
        assert_eq!(pairs[0].1, pairs[1].1);
        assert_eq!(
            pairs[1].1,
            Node::Mapping(vec![(Node::scalar("server"), Node::scalar("https://a"))])
        );
    }

    #[test]
    fn test_emit_block_style_utf8() {
        let root = Node::Mapping(vec![(
            Node::scalar("users"),
            Node::Sequence(vec![Node::Mapping(vec![(
                Node::scalar("name"),
                Node::scalar("jürgen"),
            )])]),
        )]);
        let emitted = YamlTree.emit_document(&root).expect("emit");
        assert_eq!(emitted, "users:\n- name: jürgen\n");
        assert_eq!(YamlTree.parse_documents(&emitted).expect("parse"), vec![root]);
    }
}
