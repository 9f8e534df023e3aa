use std::{convert::Infallible, fmt::Display, fs, path::Path, str::FromStr};

use crate::{parser, CfgError, OrderedMultiMap, ValueCollection, ValueStore};

/// A named node of a KSP ConfigNode tree: ordered `name = value` entries
/// followed by ordered child nodes.
///
/// # Text format
///
/// ```text
/// PART
/// {
///     name = fuelTank
///     mass = 0.5 //tonnes
///     RESOURCE
///     {
///         name = LiquidFuel
///     }
/// }
/// ```
///
/// `//` starts a comment that runs to the end of the line. A line followed
/// by `{` names the block that opens; a bare `{` opens an anonymous block.
/// Values are taken verbatim after splitting on the first `=`. There is no
/// quoting and no escaping.
///
/// Parsing is lenient and never fails: stray text that does not open a
/// block is skipped, an unmatched `}` ends the block it appears in, and an
/// unclosed block runs to the end of the input.
///
/// ```rust
/// use ksp_confignode::{ConfigNode, ValueStore};
///
/// let node = ConfigNode::from_text("PART\n{\n  name = fuelTank\n  mass = 0.5\n}");
/// assert_eq!(node.name(), "PART");
/// assert_eq!(node.get_value("mass", 0), Some(&"0.5".into()));
/// assert_eq!(
///     node.to_string(),
///     "PART\n{\n    name = fuelTank\n    mass = 0.5\n}"
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigNode {
    pub(crate) name: String,
    pub(crate) values: ValueCollection,
    pub(crate) subnodes: OrderedMultiMap<ConfigNode>,
}

impl ConfigNode {
    /// Creates a new, empty node with a given name.
    pub fn new(name: impl Into<String>) -> Self {
        ConfigNode {
            name: name.into(),
            values: ValueCollection::new(),
            subnodes: OrderedMultiMap::new(),
        }
    }

    /// Parses `text` into a new unnamed node. See [`Self::parse`].
    pub fn from_text(text: &str) -> Self {
        let mut node = ConfigNode::default();
        node.parse(text);
        node
    }

    /// Replaces this node's values and subnodes with the ones parsed from
    /// `text`.
    ///
    /// If the text yields no values and exactly one block, that block
    /// becomes this node (name included), so a file consisting of a single
    /// top-level block reads as that block.
    pub fn parse(&mut self, text: &str) {
        self.values = ValueCollection::new();
        self.subnodes = OrderedMultiMap::new();
        parser::parse_into(text, self);
        if self.values.is_empty() && self.subnodes.len() == 1 {
            let subnodes = std::mem::take(&mut self.subnodes);
            if let Some(only) = subnodes.into_iter().next() {
                *self = only;
            }
        }
    }

    /// Reads and parses the file at `path`.
    ///
    /// Failures are logged and yield an empty node, so that scans over many
    /// third-party files carry on past unreadable ones. Use
    /// [`Self::try_load`] to handle the error instead.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::try_load(path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "Unable to parse config file");
            ConfigNode::default()
        })
    }

    /// Reads and parses the file at `path`, reporting I/O and decoding
    /// failures.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, CfgError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CfgError::io(path, e))?;
        Ok(ConfigNode::from_text(&text))
    }

    /// Writes this node to `path`, without leading or trailing newlines.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CfgError> {
        let path = path.as_ref();
        let text = self.to_string();
        fs::write(path, text.trim_matches(['\n', '\r']))
            .map_err(|e| CfgError::io(path, e))
    }

    /// Gets this node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets this node's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns a reference to this node's children.
    pub fn subnodes(&self) -> &OrderedMultiMap<ConfigNode> {
        &self.subnodes
    }

    /// Returns a mutable reference to this node's children.
    pub fn subnodes_mut(&mut self) -> &mut OrderedMultiMap<ConfigNode> {
        &mut self.subnodes
    }

    /// Appends a new, empty child node and returns it.
    pub fn add_node(&mut self, name: impl Into<String>) -> &mut ConfigNode {
        self.push_node(ConfigNode::new(name))
    }

    /// Appends an existing node as a child and returns it.
    pub fn push_node(&mut self, node: ConfigNode) -> &mut ConfigNode {
        let name = node.name.clone();
        self.subnodes.add(name, node)
    }

    /// Gets the `idx`-th child called `name`.
    pub fn get_node(&self, name: &str, idx: usize) -> Option<&ConfigNode> {
        self.subnodes.get(name, idx)
    }

    /// Gets a mutable reference to the `idx`-th child called `name`.
    pub fn get_node_mut(&mut self, name: &str, idx: usize) -> Option<&mut ConfigNode> {
        self.subnodes.get_mut(name, idx)
    }

    /// Gets every child called `name`, in order.
    pub fn get_nodes(&self, name: &str) -> Vec<&ConfigNode> {
        self.subnodes.get_all(name)
    }

    /// Returns true if at least one child is called `name`.
    pub fn has_node(&self, name: &str) -> bool {
        self.subnodes.contains_key(name)
    }

    /// Returns true if this node has neither values nor children.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.subnodes.is_empty()
    }
}

impl ValueStore for ConfigNode {
    fn values(&self) -> &ValueCollection {
        &self.values
    }

    fn values_mut(&mut self) -> &mut ValueCollection {
        &mut self.values
    }
}

impl FromStr for ConfigNode {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(ConfigNode::from_text(input))
    }
}

impl Display for ConfigNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.stringify(f, 0)
    }
}

impl ConfigNode {
    pub(crate) fn stringify(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        indent: usize,
    ) -> std::fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.name, indent = indent)?;
        writeln!(f, "{:indent$}{{", "", indent = indent)?;
        for entry in &self.values {
            writeln!(f, "{:indent$}{}", "", entry, indent = indent + 4)?;
        }
        for node in &self.subnodes {
            node.stringify(f, indent + 4)?;
            writeln!(f)?;
        }
        write!(f, "{:indent$}}}", "", indent = indent)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::CfgValue;

    use super::*;

    fn sample() -> ConfigNode {
        let mut node = ConfigNode::new("test");
        node.add_value("a", "1");
        node.add_value("b", "2");
        let sub = node.add_node("sub");
        sub.add_value("c", "3");
        sub.add_value("d", "4");
        node
    }

    #[test]
    fn construction() {
        assert_eq!(
            sample().to_string(),
            "test\n{\n    a = 1\n    b = 2\n    sub\n    {\n        c = 3\n        d = 4\n    }\n}"
        );
        assert_eq!(ConfigNode::new("empty").to_string(), "empty\n{\n}");
    }

    #[test]
    fn root_unwrap() {
        let node = ConfigNode::from_text("Foo\n{\n  a = 1\n}");
        assert_eq!(node.name(), "Foo");
        assert_eq!(node.values().len(), 1);
        assert_eq!(node.get_value("a", 0), Some(&"1".into()));

        let node = ConfigNode::from_text("a = 1");
        assert_eq!(node.name(), "");
        assert_eq!(node.get_value("a", 0), Some(&"1".into()));
        assert!(node.subnodes().is_empty());

        let node = ConfigNode::from_text("a = 1\nFoo\n{\n}");
        assert_eq!(node.name(), "");
        assert!(node.has_node("Foo"));
    }

    #[test]
    fn anonymous_wrapper_is_transparent() {
        let node = ConfigNode::from_text("{\n  a = 1\n  PART\n  {\n  }\n}");
        assert_eq!(node.name(), "");
        assert_eq!(node.get_value("a", 0), Some(&"1".into()));
        assert!(node.has_node("PART"));
    }

    #[test]
    fn comment_stripping() {
        let node = ConfigNode::from_text("a = 1 //comment\n// full line\nb = 2");
        let values = node
            .values()
            .iter()
            .map(|e| (e.name(), e.value().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![("a", "1".to_string()), ("b", "2".to_string())]);
        assert!(node.values().iter().all(|e| e.comment().is_empty()));
    }

    #[test]
    fn round_trip() {
        let node = sample();
        let parsed = ConfigNode::from_text(&node.to_string());
        assert_eq!(parsed, node);
    }

    #[test]
    fn root_round_trip() {
        let mut root = ConfigNode::default();
        root.add_node("PART").add_value("name", "a");
        root.add_node("PART").add_value("name", "b");
        let parsed: ConfigNode = root.to_string().parse().unwrap();
        assert_eq!(parsed, root);
        assert_eq!(parsed.get_nodes("PART").len(), 2);
    }

    #[test]
    fn reserialization_is_idempotent() {
        let src = "\u{FEFF}PART { name = a\nmass=1 // heavy\n  MODULE {\nname = m }\n stray\n RESOURCE\n{\n}}";
        let first = ConfigNode::from_text(src).to_string();
        let second = ConfigNode::from_text(&first).to_string();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "PART\n{\n    name = a\n    mass = 1\n    MODULE\n    {\n        name = m\n    }\n    RESOURCE\n    {\n    }\n}"
        );
    }

    #[test]
    fn duplicate_nodes() {
        let node = ConfigNode::from_text("R\n{\nname = a\n}\nR\n{\nname = b\n}\nx = 1");
        assert_eq!(node.get_nodes("R").len(), 2);
        assert_eq!(
            node.get_node("R", 1).and_then(|n| n.get_value("name", 0)),
            Some(&CfgValue::from("b"))
        );
        assert!(node.get_node("R", 2).is_none());
    }

    #[test]
    fn parse_replaces_contents() {
        let mut node = sample();
        node.parse("x = 1");
        assert_eq!(node.name(), "test");
        assert!(!node.has_value("a"));
        assert!(!node.has_node("sub"));
        assert!(node.has_value("x"));
    }

    #[test]
    fn emptiness() {
        assert!(ConfigNode::new("x").is_empty());
        assert!(ConfigNode::from_text("// nothing here").is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn comments_written() {
        let mut node = ConfigNode::new("N");
        node.add_value("k", "v");
        node.set_comment("k", "note", 0);
        assert_eq!(node.to_string(), "N\n{\n    k = v //note\n}");
    }
}
