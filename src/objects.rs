use std::{fmt, ops::Deref};

use indexmap::IndexMap;

use crate::{CfgValue, NamedObject, ObjectKind, ValueStore};

/// A typed field backed by a named value.
///
/// Reading goes through the value store every time, so a field is never
/// out of date with the underlying entries. Reading a field that is missing
/// or does not convert gives `None`.
///
/// ```rust
/// use ksp_confignode::{NamedObject, Part, ValueStore};
///
/// let mut obj = NamedObject::generic("PART");
/// Part::MASS.set(&mut obj, 0.5);
/// assert_eq!(obj.get_value("mass", 0).map(|v| v.to_string()).as_deref(), Some("0.5"));
///
/// obj.set_value("mass", "1.25", 0);
/// assert_eq!(Part::MASS.get(&obj), Some(1.25));
/// ```
pub struct Mirrored<T> {
    name: &'static str,
    parse: fn(&CfgValue) -> Option<T>,
}

impl<T> Mirrored<T> {
    /// Creates a field mirroring the value called `name`, converted with
    /// `parse`.
    pub const fn new(name: &'static str, parse: fn(&CfgValue) -> Option<T>) -> Self {
        Mirrored { name, parse }
    }

    /// The name of the mirrored value.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the first value called [`Self::name`].
    pub fn get(&self, store: &impl ValueStore) -> Option<T> {
        store.get_value(self.name, 0).and_then(self.parse)
    }
}

impl<T: Into<CfgValue>> Mirrored<T> {
    /// Writes the first value called [`Self::name`], appending it if there is
    /// none yet.
    pub fn set(&self, store: &mut impl ValueStore, value: T) {
        store.set_value(self.name, value, 0);
    }
}

impl Mirrored<String> {
    /// A field holding the value's text.
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, text_value)
    }
}

impl Mirrored<f64> {
    /// A field holding a number.
    pub const fn float(name: &'static str) -> Self {
        Self::new(name, CfgValue::as_f64)
    }
}

fn text_value(value: &CfgValue) -> Option<String> {
    Some(value.to_string())
}

impl<T> Clone for Mirrored<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Mirrored<T> {}

impl<T> fmt::Debug for Mirrored<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirrored").field("name", &self.name).finish()
    }
}

/// Keeps the named children of `obj` with type `tag` and kind `kind`, keyed
/// by name. A later child replaces an earlier one with the same name.
fn named_children<'a, V>(
    obj: &'a NamedObject,
    tag: &str,
    kind: ObjectKind,
    view: fn(&'a NamedObject) -> V,
) -> IndexMap<String, V> {
    obj.children
        .get_all(tag)
        .into_iter()
        .filter(|child| child.kind == kind)
        .filter_map(|child| Some((child.name()?, view(child))))
        .collect()
}

/// True if every one of `names` is a key of `children`. Always false when
/// `children` is empty.
fn has_all<V>(children: &IndexMap<String, V>, names: &[&str]) -> bool {
    !children.is_empty() && names.iter().all(|name| children.contains_key(*name))
}

macro_rules! object_view {
    ($(#[$meta:meta])* $view:ident, $kind:ident, $tag:literal, $as_view:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $view<'a>(&'a NamedObject);

        impl<'a> $view<'a> {
            #[doc = concat!("The node type of `", $tag, "` objects.")]
            pub const TAG: &'static str = $tag;

            /// The viewed object.
            pub fn object(&self) -> &'a NamedObject {
                self.0
            }
        }

        impl Deref for $view<'_> {
            type Target = NamedObject;

            fn deref(&self) -> &Self::Target {
                self.0
            }
        }

        impl NamedObject {
            #[doc = concat!("Views this object as a [`", stringify!($view), "`], if it is one.")]
            pub fn $as_view(&self) -> Option<$view<'_>> {
                (self.kind == ObjectKind::$kind).then_some($view(self))
            }
        }
    };
}

object_view!(
    /// A `PART` definition.
    ///
    /// ```rust
    /// use ksp_confignode::{ConfigNode, Registry};
    ///
    /// let node = ConfigNode::from_text(
    ///     "PART\n{\nname = tank\nRESOURCE\n{\nname = LiquidFuel\namount = 90\n}\n}",
    /// );
    /// let obj = Registry::standard().load(&node);
    /// let part = obj.as_part().unwrap();
    /// assert!(part.has_resources(&["LiquidFuel"]));
    /// assert_eq!(part.resources()["LiquidFuel"].amount(), Some(90.0));
    /// ```
    Part,
    Part,
    "PART",
    as_part
);

object_view!(
    /// A `RESOURCE` block inside a part.
    Resource,
    Resource,
    "RESOURCE",
    as_resource
);

object_view!(
    /// A `MODULE` block inside a part.
    Module,
    Module,
    "MODULE",
    as_module
);

impl<'a> Part<'a> {
    /// Dry mass, in tonnes.
    pub const MASS: Mirrored<f64> = Mirrored::float("mass");
    /// Cost in funds.
    pub const COST: Mirrored<f64> = Mirrored::float("cost");
    /// The name shown in the editor.
    pub const TITLE: Mirrored<String> = Mirrored::text("title");
    /// Long description shown in the editor.
    pub const DESCRIPTION: Mirrored<String> = Mirrored::text("description");

    /// See [`Self::MASS`].
    pub fn mass(&self) -> Option<f64> {
        Self::MASS.get(self.0)
    }

    /// See [`Self::COST`].
    pub fn cost(&self) -> Option<f64> {
        Self::COST.get(self.0)
    }

    /// See [`Self::TITLE`].
    pub fn title(&self) -> Option<String> {
        Self::TITLE.get(self.0)
    }

    /// See [`Self::DESCRIPTION`].
    pub fn description(&self) -> Option<String> {
        Self::DESCRIPTION.get(self.0)
    }

    /// This part's named `RESOURCE` children, keyed by name.
    pub fn resources(&self) -> IndexMap<String, Resource<'a>> {
        named_children(self.0, Resource::TAG, ObjectKind::Resource, Resource)
    }

    /// This part's named `MODULE` children, keyed by name.
    pub fn modules(&self) -> IndexMap<String, Module<'a>> {
        named_children(self.0, Module::TAG, ObjectKind::Module, Module)
    }

    /// True if the part carries a resource for each of `names`. A part with
    /// no resources at all never matches, even for an empty list.
    pub fn has_resources(&self, names: &[&str]) -> bool {
        has_all(&self.resources(), names)
    }

    /// Like [`Self::has_resources`], for modules.
    pub fn has_modules(&self, names: &[&str]) -> bool {
        has_all(&self.modules(), names)
    }
}

impl Resource<'_> {
    /// Units of the resource currently held.
    pub const AMOUNT: Mirrored<f64> = Mirrored::float("amount");
    /// Units of the resource the part can hold.
    pub const MAX_AMOUNT: Mirrored<f64> = Mirrored::float("maxAmount");

    /// See [`Self::AMOUNT`].
    pub fn amount(&self) -> Option<f64> {
        Self::AMOUNT.get(self.0)
    }

    /// See [`Self::MAX_AMOUNT`].
    pub fn max_amount(&self) -> Option<f64> {
        Self::MAX_AMOUNT.get(self.0)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{ConfigNode, Registry};

    use super::*;

    const ENGINE: &str = "
PART
{
    name = engine
    title = LV-T30
    mass = 1.25
    cost = 1100
    MODULE
    {
        name = ModuleEngines
    }
    MODULE
    {
        name = ModuleGimbal
    }
    MODULE
    {
        isEnabled = true
    }
    RESOURCE
    {
        name = LiquidFuel
        amount = 90
        maxAmount = 100
    }
    RESOURCE
    {
        name = LiquidFuel
        amount = 10
    }
}";

    fn engine() -> NamedObject {
        Registry::standard().load(&ConfigNode::from_text(ENGINE))
    }

    #[test]
    fn typed_fields() {
        let obj = engine();
        let part = obj.as_part().expect("a part");
        assert_eq!(part.mass(), Some(1.25));
        assert_eq!(part.cost(), Some(1100.0));
        assert_eq!(part.title().as_deref(), Some("LV-T30"));
        assert_eq!(part.description(), None);
        assert!(obj.as_resource().is_none());
    }

    #[test]
    fn unparseable_field_reads_none() {
        let mut obj = engine();
        obj.set_value("mass", "heavy", 0);
        assert_eq!(obj.as_part().and_then(|p| p.mass()), None);
    }

    #[test]
    fn children_by_name() {
        let obj = engine();
        let part = obj.as_part().expect("a part");

        let modules = part.modules();
        assert_eq!(
            modules.keys().collect::<Vec<_>>(),
            vec!["ModuleEngines", "ModuleGimbal"]
        );

        let resources = part.resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources["LiquidFuel"].amount(), Some(10.0));
        assert_eq!(resources["LiquidFuel"].max_amount(), None);

        assert!(part.has_modules(&["ModuleEngines", "ModuleGimbal"]));
        assert!(part.has_modules(&[]));
        assert!(!part.has_modules(&["ModuleEngines", "ModuleRCS"]));
        assert!(part.has_resources(&["LiquidFuel"]));
    }

    #[test]
    fn empty_children_never_match() {
        let obj = Registry::standard().create("PART");
        let part = obj.as_part().expect("a part");
        assert!(!part.has_resources(&[]));
        assert!(!part.has_modules(&[]));
    }

    #[test]
    fn children_of_other_kinds_are_ignored() {
        let mut registry = Registry::standard();
        registry.register("RESOURCE", ObjectKind::Generic);
        let obj = registry.load(&ConfigNode::from_text(ENGINE));
        let part = obj.as_part().expect("a part");
        assert!(part.resources().is_empty());
        assert_eq!(part.modules().len(), 2);
    }

    #[test]
    fn setting_fields_writes_values() {
        let mut obj = Registry::standard().create("RESOURCE");
        Resource::AMOUNT.set(&mut obj, 50.0);
        Resource::MAX_AMOUNT.set(&mut obj, 100.0);
        assert_eq!(
            obj.to_string(),
            "RESOURCE\n{\n    amount = 50.0\n    maxAmount = 100.0\n}"
        );
        assert_eq!(obj.as_resource().and_then(|r| r.amount()), Some(50.0));
    }
}
