use std::fmt::Display;

use crate::{CfgError, SearchTarget, SearchTerm};

/// A trait used as the argument for [`SearchQuery::and`] and
/// [`SearchQuery::or`].
///
/// Implemented for parsed terms, groups and queries, and for strings, which
/// are parsed as a single [`SearchTerm`].
pub trait IntoSearchExpr: IntoSearchExprSealed {}

impl IntoSearchExpr for SearchExpr {}
impl IntoSearchExpr for SearchTerm {}
impl IntoSearchExpr for SearchGroup {}
impl IntoSearchExpr for SearchQuery {}
impl IntoSearchExpr for String {}
impl<'a> IntoSearchExpr for &'a str {}
impl<'a> IntoSearchExpr for &'a String {}

#[doc(hidden)]
pub trait IntoSearchExprSealed {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError>;
}

impl IntoSearchExprSealed for SearchExpr {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        Ok(self)
    }
}

impl IntoSearchExprSealed for SearchTerm {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        Ok(SearchExpr::Term(self))
    }
}

impl IntoSearchExprSealed for SearchGroup {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        Ok(SearchExpr::Group(self))
    }
}

impl IntoSearchExprSealed for SearchQuery {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        Ok(SearchExpr::Group(self.root))
    }
}

impl IntoSearchExprSealed for &str {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        SearchTerm::parse(self).map(SearchExpr::Term)
    }
}

impl IntoSearchExprSealed for String {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        self.as_str().into_search_expr()
    }
}

impl IntoSearchExprSealed for &String {
    fn into_search_expr(self) -> Result<SearchExpr, CfgError> {
        self.as_str().into_search_expr()
    }
}

/// A node of a search tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchExpr {
    /// A single path.
    Term(SearchTerm),
    /// A conjunction.
    Group(SearchGroup),
    /// True if either group is.
    Or(SearchGroup, SearchGroup),
}

impl SearchExpr {
    /// Evaluates this expression against `target`.
    pub fn matches<T: SearchTarget>(&self, target: &T) -> bool {
        match self {
            SearchExpr::Term(term) => term.matches(target),
            SearchExpr::Group(group) => group.matches(target),
            SearchExpr::Or(left, right) => left.matches(target) || right.matches(target),
        }
    }
}

impl Display for SearchExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchExpr::Term(term) => write!(f, "{term}"),
            SearchExpr::Group(group) => write!(f, "{group}"),
            SearchExpr::Or(left, right) => write!(f, "{left} OR {right}"),
        }
    }
}

/// Expressions that must all match. An empty group matches everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchGroup {
    items: Vec<SearchExpr>,
}

impl SearchGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Default::default()
    }

    /// The group's expressions, in order.
    pub fn items(&self) -> &[SearchExpr] {
        &self.items
    }

    /// Appends an expression.
    pub fn push(&mut self, expr: SearchExpr) {
        self.items.push(expr);
    }

    /// Number of expressions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the group holds no expressions.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True if every expression matches `target`.
    pub fn matches<T: SearchTarget>(&self, target: &T) -> bool {
        self.items.iter().all(|expr| expr.matches(target))
    }
}

impl From<Vec<SearchExpr>> for SearchGroup {
    fn from(items: Vec<SearchExpr>) -> Self {
        SearchGroup { items }
    }
}

impl FromIterator<SearchExpr> for SearchGroup {
    fn from_iter<I: IntoIterator<Item = SearchExpr>>(iter: I) -> Self {
        SearchGroup {
            items: iter.into_iter().collect(),
        }
    }
}

impl Display for SearchGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, expr) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{expr}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Active {
    #[default]
    Root,
    OrBranch,
}

/// A boolean combination of [`SearchTerm`]s.
///
/// Queries are built left to right. [`Self::and`] adds to whatever is
/// currently being built; [`Self::or`] wraps everything so far as the left
/// side of an OR, and subsequent `and`s extend the right side until
/// [`Self::brackets`] closes it.
///
/// ```rust
/// use ksp_confignode::{ConfigNode, Registry, SearchQuery};
///
/// let part = Registry::standard().load(&ConfigNode::from_text(
///     "PART\n{\nname = tank\nmass = 0.5\n}",
/// ));
///
/// let mut query = SearchQuery::new();
/// query.and("PART/cost")?.or("PART/mass")?.and("PART/name:tank")?;
/// assert_eq!(query.to_string(), "{{PART/cost} OR {PART/mass AND PART/name:tank}}");
/// assert!(query.matches(&part));
/// # Ok::<(), ksp_confignode::CfgError>(())
/// ```
///
/// The textual form with `&&`, `||` and braces is compiled by
/// [`Self::parse`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchQuery {
    pub(crate) root: SearchGroup,
    active: Active,
}

impl SearchQuery {
    /// Creates an empty query, which matches everything.
    pub fn new() -> Self {
        Default::default()
    }

    /// The top-level group.
    pub fn root(&self) -> &SearchGroup {
        &self.root
    }

    /// Consumes the query, returning its top-level group.
    pub fn into_group(self) -> SearchGroup {
        self.root
    }

    /// Adds `expr` to the group currently being built: the right side of the
    /// last OR if one is open, the top level otherwise.
    pub fn and(&mut self, expr: impl IntoSearchExpr) -> Result<&mut Self, CfgError> {
        let expr = expr.into_search_expr()?;
        match self.root.items.first_mut() {
            Some(SearchExpr::Or(_, branch)) if self.active == Active::OrBranch => branch.push(expr),
            _ => self.root.push(expr),
        }
        Ok(self)
    }

    /// Makes the query `{everything so far} OR {expr}`, and directs
    /// following [`Self::and`] calls to the right side.
    pub fn or(&mut self, expr: impl IntoSearchExpr) -> Result<&mut Self, CfgError> {
        let expr = expr.into_search_expr()?;
        let left = std::mem::take(&mut self.root);
        self.root = SearchGroup::from(vec![SearchExpr::Or(left, SearchGroup::from(vec![expr]))]);
        self.active = Active::OrBranch;
        Ok(self)
    }

    /// Closes the open OR branch, so following [`Self::and`] calls add to
    /// the top level again.
    pub fn brackets(&mut self) -> &mut Self {
        self.active = Active::Root;
        self
    }

    /// Evaluates the query against `target`.
    pub fn matches<T: SearchTarget>(&self, target: &T) -> bool {
        self.root.matches(target)
    }

    /// Lazily keeps the targets the query matches.
    pub fn filter<'a, T, I>(&'a self, targets: I) -> impl Iterator<Item = &'a T> + 'a
    where
        T: SearchTarget + 'a,
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        targets.into_iter().filter(move |target| self.matches(*target))
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
