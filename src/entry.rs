use std::fmt::Display;

use crate::CfgValue;

/// A single `name = value` line of a ConfigNode, with an optional comment.
///
/// Comments are never read back from text: the parser strips everything
/// after `//`. They can be attached programmatically and are written out
/// after the value.
#[derive(Debug, Clone, PartialEq)]
pub struct CfgEntry {
    pub(crate) name: String,
    pub(crate) value: CfgValue,
    pub(crate) comment: String,
}

impl CfgEntry {
    /// Creates a new entry with an empty comment.
    pub fn new(name: impl Into<String>, value: impl Into<CfgValue>) -> Self {
        CfgEntry {
            name: name.into(),
            value: value.into(),
            comment: String::new(),
        }
    }

    /// Gets this entry's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the entry's value.
    pub fn value(&self) -> &CfgValue {
        &self.value
    }

    /// Gets a mutable reference to this entry's value.
    pub fn value_mut(&mut self) -> &mut CfgValue {
        &mut self.value
    }

    /// Sets the entry's value.
    pub fn set_value(&mut self, value: impl Into<CfgValue>) {
        self.value = value.into();
    }

    /// Gets the entry's comment. Empty when none was set.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Sets the entry's comment. It is written without the leading `//`.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Builder-style variant of [`Self::set_comment`].
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.set_comment(comment);
        self
    }
}

impl Display for CfgEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)?;
        if !self.comment.is_empty() {
            write!(f, " //{}", self.comment)?;
        }
        Ok(())
    }
}

impl<K, V> From<(K, V)> for CfgEntry
where
    K: Into<String>,
    V: Into<CfgValue>,
{
    fn from((name, value): (K, V)) -> Self {
        CfgEntry::new(name, value)
    }
}
