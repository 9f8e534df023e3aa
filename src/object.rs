use std::fmt::Display;

use crate::{ConfigNode, Mirrored, ObjectKind, OrderedMultiMap, Registry, ValueCollection, ValueStore};

/// A typed object mirroring one [`ConfigNode`].
///
/// An object has a type (the node name it was loaded from, or will be saved
/// as), a [`ObjectKind`] resolved through a [`Registry`], its own copy of
/// the node's values, and child objects built from the node's subnodes.
/// Saving an object writes every value and child back, whatever its kind.
///
/// Typed fields are read through [`Mirrored`] accessors, which always go to
/// the values so the object and the text stay in step.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedObject {
    pub(crate) kind: ObjectKind,
    pub(crate) ty: String,
    pub(crate) values: ValueCollection,
    pub(crate) children: OrderedMultiMap<NamedObject>,
}

impl NamedObject {
    /// The `name` value every object can carry.
    pub const NAME: Mirrored<String> = Mirrored::text("name");

    /// Creates an empty object of a given kind and type.
    pub fn new(kind: ObjectKind, ty: impl Into<String>) -> Self {
        NamedObject {
            kind,
            ty: ty.into(),
            values: ValueCollection::new(),
            children: OrderedMultiMap::new(),
        }
    }

    /// Creates an empty [`ObjectKind::Generic`] object.
    pub fn generic(ty: impl Into<String>) -> Self {
        Self::new(ObjectKind::Generic, ty)
    }

    /// The object's kind.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// The node type this object is saved as.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Sets the node type this object is saved as.
    pub fn set_ty(&mut self, ty: impl Into<String>) {
        self.ty = ty.into();
    }

    /// Child objects, keyed by their type.
    pub fn children(&self) -> &OrderedMultiMap<NamedObject> {
        &self.children
    }

    /// Mutable access to the child objects.
    pub fn children_mut(&mut self) -> &mut OrderedMultiMap<NamedObject> {
        &mut self.children
    }

    /// Appends a child object and returns it.
    pub fn add_child(&mut self, child: NamedObject) -> &mut NamedObject {
        let ty = child.ty.clone();
        self.children.add(ty, child)
    }

    /// The `name` value, if any.
    pub fn name(&self) -> Option<String> {
        Self::NAME.get(self)
    }

    /// Sets the `name` value.
    pub fn set_name(&mut self, name: impl Into<String>) {
        Self::NAME.set(self, name.into());
    }

    /// Replaces this object's values and children with the ones of `node`.
    ///
    /// Values are copied. Every subnode becomes a child object, created
    /// through `registry` from the subnode's name and loaded the same way.
    /// The object's type and kind are left as they are.
    pub fn load(&mut self, node: &ConfigNode, registry: &Registry) {
        self.values.clone_from(node.values());
        self.children = OrderedMultiMap::new();
        for subnode in node.subnodes() {
            self.add_child(registry.load(subnode));
        }
    }

    /// Adds this object's values and children to `node`.
    ///
    /// Values are appended after the ones `node` already holds. Each child is
    /// saved into a new subnode named after the child's type. The node's own
    /// name is left alone.
    pub fn save(&self, node: &mut ConfigNode) {
        for entry in &self.values {
            node.add_entry(entry.clone());
        }
        for child in &self.children {
            child.save(node.add_node(child.ty.as_str()));
        }
    }

    /// Saves this object into a fresh node named after its type.
    pub fn to_node(&self) -> ConfigNode {
        let mut node = ConfigNode::new(self.ty.as_str());
        self.save(&mut node);
        node
    }
}

impl ValueStore for NamedObject {
    fn values(&self) -> &ValueCollection {
        &self.values
    }

    fn values_mut(&mut self) -> &mut ValueCollection {
        &mut self.values
    }
}

impl Display for NamedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_node().stringify(f, 0)
    }
}
