// ── Section references ──
//
// Callers address sections either by concrete id (`lan`, `cfg0a1b2c`) or by
// extended notation `@type[n]`. The notation is parsed once, at the API
// boundary; resolution works on the structured form.

use std::fmt;
use std::str::FromStr;

/// A reference to a section, as accepted by every overlay operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionRef {
    /// Concrete section id. Passed through unvalidated.
    Named(String),
    /// The `index`-th section of `section_type` in effective order;
    /// negative indices count from the end.
    Positional { section_type: String, index: i64 },
}

impl SectionRef {
    /// Parse `@type[n]`; anything else is a concrete id.
    pub fn parse(raw: &str) -> Self {
        parse_positional(raw).unwrap_or_else(|| Self::Named(raw.to_owned()))
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Positional { .. } => None,
        }
    }

    /// Pick an element of an already-ordered list, Python-slice style.
    pub(crate) fn pick<T>(index: i64, items: &[T]) -> Option<&T> {
        let len = i64::try_from(items.len()).ok()?;
        let pos = if index >= 0 { index } else { len + index };
        usize::try_from(pos).ok().and_then(|p| items.get(p))
    }
}

fn parse_positional(raw: &str) -> Option<SectionRef> {
    let body = raw.strip_prefix('@')?.strip_suffix(']')?;
    let (section_type, index) = body.split_once('[')?;

    let valid_type = !section_type.is_empty()
        && section_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let digits = index.strip_prefix('-').unwrap_or(index);
    if !valid_type || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(SectionRef::Positional {
        section_type: section_type.to_owned(),
        index: index.parse().ok()?,
    })
}

impl fmt::Display for SectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Positional {
                section_type,
                index,
            } => write!(f, "@{section_type}[{index}]"),
        }
    }
}

impl FromStr for SectionRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for SectionRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for SectionRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&String> for SectionRef {
    fn from(s: &String) -> Self {
        Self::parse(s)
    }
}

impl From<&SectionRef> for SectionRef {
    fn from(r: &SectionRef) -> Self {
        r.clone()
    }
}
