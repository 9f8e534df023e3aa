use std::fmt::Display;

/// A scalar stored against a name in a [`crate::ValueCollection`].
///
/// Text parsed from a `.cfg` file is always kept verbatim as
/// [`CfgValue::String`]. The other variants only appear when values are
/// set programmatically; they render the way KSP writes them.
///
/// Two values are equal when they render to the same text, so a typed
/// value equals the string it reads back as: `Float(0.5) == String("0.5")`.
#[derive(Debug, Clone)]
pub enum CfgValue {
    /// Verbatim text, as found after the `=` of a value line.
    String(String),

    /// A whole number.
    Integer(i64),

    /// A floating point number. Always rendered with a fractional part
    /// (e.g. `1.0`).
    Float(f64),

    /// A boolean, rendered as `True`/`False`.
    Bool(bool),
}

impl CfgValue {
    /// Returns `true` if the value is a [`CfgValue::String`].
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is a [`CfgValue::Integer`] or
    /// [`CfgValue::Float`].
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Integer(..) | Self::Float(..))
    }

    /// Returns `true` if the value is a [`CfgValue::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `Some(&str)` if the value is a [`CfgValue::String`],
    /// otherwise returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a float. Strings are parsed after trimming,
    /// integers are widened. Returns `None` when no numeric reading exists.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(i) => Some(*i as f64),
            Self::String(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Interprets the value as an integer. Strings are parsed after
    /// trimming; floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::String(s) => s.trim().parse().ok(),
            Self::Float(_) | Self::Bool(_) => None,
        }
    }

    /// Interprets the value as a boolean. Strings `true`/`false` are
    /// accepted in any letter case.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            Self::Integer(_) | Self::Float(_) => None,
        }
    }
}

impl Display for CfgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
        }
    }
}

impl PartialEq for CfgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Default for CfgValue {
    fn default() -> Self {
        CfgValue::String(String::new())
    }
}

impl From<i64> for CfgValue {
    fn from(value: i64) -> Self {
        CfgValue::Integer(value)
    }
}

impl From<i32> for CfgValue {
    fn from(value: i32) -> Self {
        CfgValue::Integer(value.into())
    }
}

impl From<u32> for CfgValue {
    fn from(value: u32) -> Self {
        CfgValue::Integer(value.into())
    }
}

impl From<f64> for CfgValue {
    fn from(value: f64) -> Self {
        CfgValue::Float(value)
    }
}

impl From<&str> for CfgValue {
    fn from(value: &str) -> Self {
        CfgValue::String(value.to_string())
    }
}

impl From<String> for CfgValue {
    fn from(value: String) -> Self {
        CfgValue::String(value)
    }
}

impl From<&String> for CfgValue {
    fn from(value: &String) -> Self {
        CfgValue::String(value.clone())
    }
}

impl From<bool> for CfgValue {
    fn from(value: bool) -> Self {
        CfgValue::Bool(value)
    }
}
