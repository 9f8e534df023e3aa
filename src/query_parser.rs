use std::{str::FromStr, sync::Arc};

use winnow::{
    combinator::{alt, not, repeat},
    prelude::*,
    token::any,
};

use crate::{CfgError, PathSegment, SearchQuery, SearchTerm};

/// The query text expanded into nested groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryToken {
    Atom(String),
    And,
    Or,
    Group(Vec<QueryToken>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment<'s> {
    And,
    Or,
    Text(&'s str),
}

/// `operator := '&&' | '||'`
fn operator<'s>(input: &mut &'s str) -> PResult<&'s str> {
    alt(("&&", "||")).parse_next(input)
}

/// `fragment := '&&' | '||' | (!operator any)+`
fn fragment<'s>(input: &mut &'s str) -> PResult<Fragment<'s>> {
    alt((
        "&&".value(Fragment::And),
        "||".value(Fragment::Or),
        repeat(1.., (not(operator), any))
            .map(|()| ())
            .take()
            .map(Fragment::Text),
    ))
    .parse_next(input)
}

/// Splits brace-free text into atoms and operators. Atoms are trimmed and
/// empty ones dropped.
fn split_operators(text: &str, out: &mut Vec<QueryToken>) {
    let fragments: Vec<Fragment<'_>> = repeat(0.., fragment).parse(text).unwrap_or_default();
    for fragment in fragments {
        match fragment {
            Fragment::And => out.push(QueryToken::And),
            Fragment::Or => out.push(QueryToken::Or),
            Fragment::Text(atom) => {
                let atom = atom.trim();
                if !atom.is_empty() {
                    out.push(QueryToken::Atom(atom.to_string()));
                }
            }
        }
    }
}

/// Fails on the first `}` that closes nothing, or else on the outermost `{`
/// left open.
fn check_balance(text: &str) -> Result<(), CfgError> {
    let mut open = Vec::new();
    for (offset, c) in text.char_indices() {
        match c {
            '{' => open.push(offset),
            '}' if open.pop().is_none() => return Err(unbalanced(text, offset)),
            _ => {}
        }
    }
    match open.first() {
        Some(&offset) => Err(unbalanced(text, offset)),
        None => Ok(()),
    }
}

fn unbalanced(text: &str, offset: usize) -> CfgError {
    CfgError::UnbalancedBrackets {
        query: Arc::new(text.to_string()),
        span: (offset, 1).into(),
    }
}

/// Expands balanced text into a token tree, dropping redundant outer
/// groups.
pub(crate) fn expand(text: &str) -> Vec<QueryToken> {
    let mut stack: Vec<Vec<QueryToken>> = vec![Vec::new()];
    let mut start = 0;
    for (offset, c) in text.char_indices() {
        if c != '{' && c != '}' {
            continue;
        }
        if let Some(current) = stack.last_mut() {
            split_operators(&text[start..offset], current);
        }
        if c == '{' {
            stack.push(Vec::new());
        } else if stack.len() > 1 {
            close_group(&mut stack);
        }
        start = offset + 1;
    }
    if let Some(current) = stack.last_mut() {
        split_operators(&text[start..], current);
    }
    while stack.len() > 1 {
        close_group(&mut stack);
    }

    let mut tree = stack.pop().unwrap_or_default();
    while let [QueryToken::Group(_)] = tree.as_slice() {
        match tree.pop() {
            Some(QueryToken::Group(inner)) => tree = inner,
            _ => break,
        }
    }
    tree
}

fn close_group(stack: &mut Vec<Vec<QueryToken>>) {
    if let Some(group) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.push(QueryToken::Group(group));
        }
    }
}

struct Compiler {
    root_node: Option<(String, PathSegment)>,
}

impl Compiler {
    fn compile(&self, tokens: Vec<QueryToken>) -> Result<SearchQuery, CfgError> {
        let mut query = SearchQuery::new();
        let mut pending_or = false;
        for token in tokens {
            match token {
                QueryToken::And => pending_or = false,
                QueryToken::Or => pending_or = true,
                QueryToken::Atom(atom) => {
                    let term = self.term(&atom)?;
                    if pending_or {
                        query.or(term)?;
                    } else {
                        query.and(term)?;
                    }
                    pending_or = false;
                }
                QueryToken::Group(group) => {
                    let inner = self.compile(group)?;
                    if pending_or {
                        query.or(inner)?;
                    } else {
                        query.and(inner)?;
                    }
                    pending_or = false;
                }
            }
        }
        Ok(query)
    }

    fn term(&self, atom: &str) -> Result<SearchTerm, CfgError> {
        let mut term = SearchTerm::parse(atom)?;
        if let Some((root, segment)) = &self.root_node {
            let rooted = term
                .segments()
                .first()
                .map_or(false, |first| first.matches_type(root));
            if !rooted {
                term.prepend(segment.clone());
            }
        }
        Ok(term)
    }
}

impl SearchQuery {
    /// Compiles the textual query language.
    ///
    /// Terms are combined with `&&` and `||` and grouped with `{` `}`.
    /// Operators apply left to right with no precedence. An `||` makes
    /// everything before it the left side, and following `&&` operands
    /// extend the right side until the enclosing group closes, so
    /// `a || b && c` reads as `a || {b && c}`. Operands with no operator in
    /// between are ANDed.
    ///
    /// When `root_node` is given, every term whose first segment does not
    /// match it gets it prepended, so that `MODULE/name:X` can be written
    /// for `PART/MODULE/name:X`. Line breaks count as spaces.
    ///
    /// ```rust
    /// use ksp_confignode::SearchQuery;
    ///
    /// let query = SearchQuery::parse("MODULE/name:ModuleEngines && {RESOURCE/ || mass}", Some("PART"))?;
    /// assert_eq!(
    ///     query.to_string(),
    ///     "{PART/MODULE/name:ModuleEngines AND {{PART/RESOURCE/} OR {PART/mass}}}"
    /// );
    /// # Ok::<(), ksp_confignode::CfgError>(())
    /// ```
    pub fn parse(text: &str, root_node: Option<&str>) -> Result<SearchQuery, CfgError> {
        check_balance(text)?;
        let text = text.replace(['\r', '\n'], " ");
        let root_node = root_node
            .map(|root| PathSegment::parse(root).map(|segment| (root.to_string(), segment)))
            .transpose()?;
        Compiler { root_node }.compile(expand(text.trim()))
    }
}

impl FromStr for SearchQuery {
    type Err = CfgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchQuery::parse(s, None)
    }
}
