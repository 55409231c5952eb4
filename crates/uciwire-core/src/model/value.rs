// ── Option values ──
//
// A UCI option holds either one string (`option`) or an ordered list of
// strings (`list`). The tag is explicit so merge and serialization code can
// match on it instead of inspecting JSON at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of a single option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Scalar(String),
    List(Vec<String>),
}

impl OptionValue {
    /// `true` for `""` and for an empty list. Setting an empty value on an
    /// existing section means "unset".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }

    /// All values as a slice-like vector: a scalar becomes a one-element list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_owned())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}
