use std::{path::PathBuf, sync::Arc};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The toplevel `Error` type for this crate.
///
/// Parsing ConfigNode text never fails: malformed structure is tolerated
/// and dropped. This error is returned by the search language (malformed
/// terms, bad patterns, unbalanced braces) and by the fallible file
/// operations.
///
/// It implements [`miette::Diagnostic`], so query errors can be rendered
/// with the offending brace highlighted when using [`miette::Result`] and
/// the `"fancy"` feature flag for `miette`:
///
/// ```no_run
/// fn main() -> miette::Result<()> {
///     ksp_confignode::SearchQuery::parse("PART/name:foo && {MODULE/name", None)?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Error, Diagnostic)]
pub enum CfgError {
    /// A path segment carried more than one `:` separator.
    #[error("Incorrect node term format `{segment}`. Should be Node[:name].")]
    #[diagnostic(
        code(ksp_confignode::malformed_segment),
        help("Each `/`-separated segment is a node pattern optionally followed by a single `:name` pattern.")
    )]
    MalformedSegment {
        /// The offending segment text.
        segment: String,
    },

    /// A node, name or value pattern is not a valid regular expression.
    #[error("Invalid search pattern `{pattern}`.")]
    #[diagnostic(code(ksp_confignode::invalid_pattern))]
    InvalidPattern {
        /// The pattern as written in the term.
        pattern: String,
        /// Underlying regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// A query string has a `{` without a matching `}` or vice versa.
    #[error("Malformed query string: unbalanced brackets.")]
    #[diagnostic(
        code(ksp_confignode::unbalanced_brackets),
        help("Every `{{` opening a group must be closed by a `}}`.")
    )]
    UnbalancedBrackets {
        /// The query text as given to the compiler.
        #[source_code]
        query: Arc<String>,

        /// Location of the first brace that could not be paired.
        #[label("unmatched")]
        span: SourceSpan,
    },

    /// Reading or writing a file failed.
    #[error("Unable to access {}", .path.display())]
    #[diagnostic(code(ksp_confignode::io_error))]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl CfgError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CfgError::Io {
            path: path.into(),
            source,
        }
    }
}
