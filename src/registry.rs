use std::{collections::HashMap, fmt::Display, path::Path};

use crate::{
    CfgEntry, CfgValue, ConfigNode, LoadOptions, Module, NamedObject, ObjectIter, Part, Resource,
};

/// The closed set of object types the typed model knows about.
///
/// [`ObjectKind::Generic`] is the catch-all for node types that are not
/// registered. Generic objects keep every value and child, so loading and
/// saving them is lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A `PART` definition.
    Part,
    /// A `RESOURCE` block, usually inside a part.
    Resource,
    /// A `MODULE` block, usually inside a part.
    Module,
    /// Any other node type.
    Generic,
}

impl ObjectKind {
    /// The canonical node type tag, or `None` for [`ObjectKind::Generic`].
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ObjectKind::Part => Some(Part::TAG),
            ObjectKind::Resource => Some(Resource::TAG),
            ObjectKind::Module => Some(Module::TAG),
            ObjectKind::Generic => None,
        }
    }
}

/// ModuleManager patch operators, as prefixed to node and value names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    /// `@`: edit an existing node or value.
    Edit,
    /// `+`: copy a node.
    Copy,
    /// `!`: delete a node or value.
    Delete,
    /// `%`: edit a node or value, creating it if missing.
    EditOrCreate,
    /// `&`: create a node or value only if it does not exist yet.
    CreateIfAbsent,
}

impl PatchOp {
    /// The operator character.
    pub fn as_str(self) -> &'static str {
        match self {
            PatchOp::Edit => "@",
            PatchOp::Copy => "+",
            PatchOp::Delete => "!",
            PatchOp::EditOrCreate => "%",
            PatchOp::CreateIfAbsent => "&",
        }
    }
}

impl Display for PatchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps node type tags to [`ObjectKind`]s.
///
/// A registry is built once during setup and then only read. Tags that were
/// never registered resolve to [`ObjectKind::Generic`].
///
/// ```rust
/// use ksp_confignode::{ConfigNode, ObjectKind, Registry};
///
/// let mut registry = Registry::standard();
/// registry.register("PROP", ObjectKind::Part);
///
/// let node = ConfigNode::from_text("PROP\n{\n  name = panel\n  mass = 0.01\n}");
/// let prop = registry.load(&node);
/// assert_eq!(prop.as_part().and_then(|p| p.mass()), Some(0.01));
/// assert_eq!(registry.kind_of("EFFECTS"), ObjectKind::Generic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    kinds: HashMap<String, ObjectKind>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Creates a registry that knows no tags at all.
    pub fn new() -> Self {
        Registry {
            kinds: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in `PART`, `RESOURCE` and `MODULE`
    /// tags.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in [ObjectKind::Part, ObjectKind::Resource, ObjectKind::Module] {
            if let Some(tag) = kind.tag() {
                registry.register(tag, kind);
            }
        }
        registry
    }

    /// Maps `tag` to `kind`, replacing any previous mapping.
    pub fn register(&mut self, tag: impl Into<String>, kind: ObjectKind) -> &mut Self {
        self.kinds.insert(tag.into(), kind);
        self
    }

    /// Resolves a node type tag.
    pub fn kind_of(&self, tag: &str) -> ObjectKind {
        self.kinds.get(tag).copied().unwrap_or(ObjectKind::Generic)
    }

    /// Creates an empty object for the node type `ty`.
    pub fn create(&self, ty: impl Into<String>) -> NamedObject {
        let ty = ty.into();
        NamedObject::new(self.kind_of(&ty), ty)
    }

    /// Builds the object tree mirroring `node`.
    pub fn load(&self, node: &ConfigNode) -> NamedObject {
        let mut obj = self.create(node.name());
        obj.load(node, self);
        obj
    }

    /// Every object of type `tag` within `node`.
    ///
    /// A node whose name is `tag` is loaded as a whole; any other node is
    /// searched through its subnodes, since a single file commonly holds
    /// several definitions.
    pub fn objects_in_node(&self, node: &ConfigNode, tag: &str) -> Vec<NamedObject> {
        let mut found = Vec::new();
        self.collect_objects(node, tag, &mut found);
        found
    }

    fn collect_objects(&self, node: &ConfigNode, tag: &str, found: &mut Vec<NamedObject>) {
        if node.name() == tag {
            found.push(self.load(node));
        } else {
            for subnode in node.subnodes() {
                self.collect_objects(subnode, tag, found);
            }
        }
    }

    /// Every object of type `tag` in the file at `path`. An unreadable file
    /// is logged and yields nothing.
    pub fn load_from_file(&self, path: impl AsRef<Path>, tag: &str) -> Vec<NamedObject> {
        let path = path.as_ref();
        let found = self.objects_in_node(&ConfigNode::load(path), tag);
        tracing::debug!(path = %path.display(), tag, count = found.len(), "Loaded objects");
        found
    }

    /// Lazily loads every object of type `tag` from a file or a directory
    /// tree. See [`ObjectIter`].
    pub fn load_from_path<'r>(
        &'r self,
        path: impl AsRef<Path>,
        tag: impl Into<String>,
        options: &LoadOptions,
    ) -> ObjectIter<'r> {
        ObjectIter::new(self, path.as_ref(), tag.into(), options.clone())
    }

    /// Creates an object for a ModuleManager patch of the `tag` node named
    /// `name`, e.g. `@PART[fuelTank]:NEEDS[SomeMod]`. `spec` is appended
    /// verbatim and may be empty.
    pub fn patch(&self, tag: &str, op: PatchOp, name: &str, spec: &str) -> NamedObject {
        NamedObject::new(self.kind_of(tag), format!("{op}{tag}[{name}]{spec}"))
    }
}

impl NamedObject {
    /// Creates a ModuleManager patch entry, e.g. `@mass = 2`.
    pub fn patch_value(op: PatchOp, name: &str, value: impl Into<CfgValue>) -> CfgEntry {
        CfgEntry::new(format!("{op}{name}"), value)
    }
}
