use std::{fmt::Display, str::FromStr};

use regex::Regex;

use crate::{CfgEntry, CfgError, ConfigNode, NamedObject, OrderedMultiMap, ValueStore};

/// Something search terms can be matched against.
///
/// Implemented for [`NamedObject`] (matched on its type) and for
/// [`ConfigNode`] (matched on its node name). Both are named through their
/// `name` value.
pub trait SearchTarget: ValueStore + Sized {
    /// The type a node segment is matched against.
    fn search_type(&self) -> &str;

    /// The name a `type:name` segment is matched against.
    fn search_name(&self) -> Option<String> {
        self.get_value("name", 0).map(|v| v.to_string())
    }

    /// The children a path descends into.
    fn search_children(&self) -> &OrderedMultiMap<Self>;
}

impl SearchTarget for NamedObject {
    fn search_type(&self) -> &str {
        self.ty()
    }

    fn search_name(&self) -> Option<String> {
        self.name()
    }

    fn search_children(&self) -> &OrderedMultiMap<Self> {
        self.children()
    }
}

impl SearchTarget for ConfigNode {
    fn search_type(&self) -> &str {
        self.name()
    }

    fn search_children(&self) -> &OrderedMultiMap<Self> {
        self.subnodes()
    }
}

/// A regular expression anchored at the start of the text only.
#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn new(source: &str) -> Result<Self, CfgError> {
        let regex = Regex::new(&format!("^(?:{source})")).map_err(|source_err| {
            CfgError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            }
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// One step of a search path: `type`, `type:name`, or the empty wildcard.
///
/// Both halves are regular expressions matched at the start of the text,
/// so `MODULE` also matches `MODULE_EXTRA`; append `$` to match whole.
/// In the last position of a path a segment is matched against values
/// instead: the first half against value names, the second against their
/// text.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    node: Pattern,
    name: Option<Pattern>,
}

impl PathSegment {
    /// Parses a single segment. More than one `:` is an error, as is an
    /// invalid regular expression.
    pub fn parse(segment: &str) -> Result<Self, CfgError> {
        let mut halves = segment.split(':');
        let node = halves.next().unwrap_or_default();
        let name = halves.next();
        if halves.next().is_some() {
            return Err(CfgError::MalformedSegment {
                segment: segment.to_string(),
            });
        }
        Ok(PathSegment {
            node: Pattern::new(node)?,
            name: name.map(Pattern::new).transpose()?,
        })
    }

    /// True for the empty segment, which matches anything.
    pub fn is_wildcard(&self) -> bool {
        self.node.source.is_empty() && self.name.is_none()
    }

    /// True if the type half matches `ty`.
    pub fn matches_type(&self, ty: &str) -> bool {
        self.node.matches(ty)
    }

    /// True if `target` has a matching type and, when the segment has a
    /// name half, a matching name. Targets without a name never match a
    /// name half.
    pub fn matches_node<T: SearchTarget>(&self, target: &T) -> bool {
        if self.is_wildcard() {
            return true;
        }
        self.matches_type(target.search_type())
            && self.name.as_ref().map_or(true, |name| {
                target
                    .search_name()
                    .map_or(false, |found| name.matches(&found))
            })
    }

    /// True if any of `target`'s entries matches. See
    /// [`Self::matches_entry`].
    pub fn matches_as_value<T: SearchTarget>(&self, target: &T) -> bool {
        self.is_wildcard() || target.values().iter().any(|entry| self.matches_entry(entry))
    }

    /// True if the entry's name matches the first half and, when there is
    /// one, its value text matches the second half.
    pub fn matches_entry(&self, entry: &CfgEntry) -> bool {
        self.node.matches(entry.name())
            && self
                .name
                .as_ref()
                .map_or(true, |value| value.matches(&entry.value().to_string()))
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.node.source)?;
        if let Some(name) = &self.name {
            write!(f, ":{}", name.source)?;
        }
        Ok(())
    }
}

/// What [`SearchTerm::select`] picks out of a tree.
#[derive(Debug, PartialEq)]
pub enum Selected<'a, T> {
    /// A whole object, picked by a trailing wildcard.
    Object(&'a T),
    /// A single value.
    Value(&'a CfgEntry),
}

/// A `/`-separated path through an object tree, optionally negated with a
/// leading `^`.
///
/// All segments but the last walk down the tree; the first one is matched
/// against the target itself. The last segment is matched against the
/// values of the object reached. A one-segment term therefore only tests
/// values: `name:fuel.*` is true for objects with a matching `name`.
///
/// ```rust
/// use ksp_confignode::{ConfigNode, Registry, SearchTerm};
///
/// let part = Registry::standard().load(&ConfigNode::from_text(
///     "PART\n{\nname = tank\nMODULE\n{\nname = ModuleFuelJettison\n}\n}",
/// ));
/// let has_jettison: SearchTerm = "PART/MODULE/name:ModuleFuel".parse().unwrap();
/// assert!(has_jettison.matches(&part));
///
/// let lacks_jettison: SearchTerm = "^PART/MODULE/name:ModuleFuel".parse().unwrap();
/// assert!(!lacks_jettison.matches(&part));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm {
    negative: bool,
    segments: Vec<PathSegment>,
}

impl SearchTerm {
    /// Parses a term. Only the first `^` is taken as negation.
    pub fn parse(term: &str) -> Result<Self, CfgError> {
        let (negative, path) = match term.strip_prefix('^') {
            Some(path) => (true, path),
            None => (false, term),
        };
        let segments = path
            .split('/')
            .map(PathSegment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchTerm { negative, segments })
    }

    /// True if the term was negated.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns the negated term.
    pub fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// The path's segments, first to last.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub(crate) fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }

    /// True if the path matches `target`, inverted for a negative term.
    pub fn matches<T: SearchTarget>(&self, target: &T) -> bool {
        match_path(target, &self.segments) != self.negative
    }

    /// Collects what the path reaches: whole objects for a trailing
    /// wildcard, matching values otherwise. Negation is ignored.
    pub fn select<'a, T: SearchTarget>(&self, target: &'a T) -> Vec<Selected<'a, T>> {
        let mut selected = Vec::new();
        select_path(target, &self.segments, &mut selected);
        selected
    }
}

fn match_path<T: SearchTarget>(target: &T, path: &[PathSegment]) -> bool {
    match path {
        [] => true,
        [last] => last.matches_as_value(target),
        [first, rest @ ..] => {
            if !first.matches_node(target) {
                false
            } else if rest.len() == 1 {
                match_path(target, rest)
            } else {
                target
                    .search_children()
                    .iter()
                    .any(|child| match_path(child, rest))
            }
        }
    }
}

fn select_path<'a, T: SearchTarget>(
    target: &'a T,
    path: &[PathSegment],
    selected: &mut Vec<Selected<'a, T>>,
) {
    match path {
        [] => {}
        [last] if last.is_wildcard() => selected.push(Selected::Object(target)),
        [last] => selected.extend(
            target
                .values()
                .iter()
                .filter(|entry| last.matches_entry(entry))
                .map(Selected::Value),
        ),
        [first, rest @ ..] => {
            if !first.matches_node(target) {
                return;
            }
            if rest.len() == 1 {
                select_path(target, rest, selected);
            } else {
                for child in target.search_children() {
                    select_path(child, rest, selected);
                }
            }
        }
    }
}

impl FromStr for SearchTerm {
    type Err = CfgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchTerm::parse(s)
    }
}

impl Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "^")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
