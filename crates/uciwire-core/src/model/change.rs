// ── Remote change records ──
//
// `uci changes` reports saved-but-uncommitted deltas as positional string
// arrays: `[operation, section, ...fields]`. See `convert::change_from_wire`.

use serde::Serialize;
use strum::{Display, EnumString};

/// Operation names as they appear in the first field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ChangeOp {
    Add,
    Set,
    Remove,
    Order,
    Rename,
    ListAdd,
    ListDel,
}

/// One pending change on the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum Change {
    /// Anonymous section created with the given type.
    Add {
        section: String,
        section_type: String,
    },
    /// Option value set; `option == None` means a named section was
    /// created (or re-typed) and `value` is its type.
    Set {
        section: String,
        option: Option<String>,
        value: String,
    },
    Remove {
        section: String,
        option: Option<String>,
    },
    Order {
        section: String,
        index: usize,
    },
    Rename {
        section: String,
        option: Option<String>,
        name: String,
    },
    ListAdd {
        section: String,
        option: String,
        value: String,
    },
    ListDel {
        section: String,
        option: String,
        value: String,
    },
    /// A record this client does not understand, kept verbatim.
    Unknown { fields: Vec<String> },
}

impl Change {
    pub fn section(&self) -> Option<&str> {
        match self {
            Self::Add { section, .. }
            | Self::Set { section, .. }
            | Self::Remove { section, .. }
            | Self::Order { section, .. }
            | Self::Rename { section, .. }
            | Self::ListAdd { section, .. }
            | Self::ListDel { section, .. } => Some(section),
            Self::Unknown { fields } => fields.get(1).map(String::as_str),
        }
    }

    pub fn op(&self) -> Option<ChangeOp> {
        match self {
            Self::Add { .. } => Some(ChangeOp::Add),
            Self::Set { .. } => Some(ChangeOp::Set),
            Self::Remove { .. } => Some(ChangeOp::Remove),
            Self::Order { .. } => Some(ChangeOp::Order),
            Self::Rename { .. } => Some(ChangeOp::Rename),
            Self::ListAdd { .. } => Some(ChangeOp::ListAdd),
            Self::ListDel { .. } => Some(ChangeOp::ListDel),
            Self::Unknown { .. } => None,
        }
    }
}
