// ── Wire → domain conversion ──
//
// Bridges the raw `uciwire-api` reply shapes and the overlay's domain types.
// rpcd only ever emits strings and string arrays for option values, but
// numbers and booleans are coerced rather than rejected so hand-rolled
// endpoints keep working.

use std::collections::BTreeMap;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use uciwire_api::UciSectionRecord;

use crate::model::{Change, ChangeOp, OptionValue, Section};

// ── Sections ─────────────────────────────────────────────────────────

/// Convert a single option value, dropping shapes UCI cannot hold.
pub(crate) fn option_from_wire(value: Value) -> Option<OptionValue> {
    match value {
        Value::String(s) => Some(OptionValue::Scalar(s)),
        Value::Array(items) => Some(OptionValue::List(
            items.into_iter().filter_map(scalar_string).collect(),
        )),
        Value::Number(_) | Value::Bool(_) => scalar_string(value).map(OptionValue::Scalar),
        Value::Null | Value::Object(_) => None,
    }
}

fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "1" } else { "0" }.to_owned()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert one wire record. `position` stands in for a missing `.index`.
pub(crate) fn section_from_wire(id: &str, record: UciSectionRecord, position: usize) -> Section {
    let name = if record.name.is_empty() {
        id.to_owned()
    } else {
        record.name
    };

    let mut options = IndexMap::with_capacity(record.options.len());
    for (key, value) in record.options {
        if key.starts_with('.') {
            continue;
        }
        match option_from_wire(value) {
            Some(v) => {
                options.insert(key, v);
            }
            None => trace!(section = %name, option = %key, "dropping non-string option value"),
        }
    }

    Section {
        name,
        section_type: record.section_type,
        anonymous: record.anonymous,
        index: record.index.unwrap_or(position),
        options,
    }
}

/// Convert a whole `uci get` reply, keyed by section id.
pub(crate) fn sections_from_wire(
    records: IndexMap<String, UciSectionRecord>,
) -> IndexMap<String, Section> {
    records
        .into_iter()
        .enumerate()
        .map(|(position, (id, record))| {
            let section = section_from_wire(&id, record, position);
            (section.name.clone(), section)
        })
        .collect()
}

/// Option map as sent in `uci add` / `uci set` payloads.
pub(crate) fn options_to_wire(options: &IndexMap<String, OptionValue>) -> Map<String, Value> {
    options
        .iter()
        .map(|(k, v)| {
            let value = match v {
                OptionValue::Scalar(s) => Value::String(s.clone()),
                OptionValue::List(items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
            };
            (k.clone(), value)
        })
        .collect()
}

// ── Change records ───────────────────────────────────────────────────

/// Convert one `[operation, section, ...]` record.
pub(crate) fn change_from_wire(fields: Vec<String>) -> Change {
    let Some(op) = fields.first().and_then(|f| ChangeOp::from_str(f).ok()) else {
        return Change::Unknown { fields };
    };

    let mut rest = fields.iter().skip(1).cloned();
    let Some(section) = rest.next() else {
        return Change::Unknown { fields };
    };
    let tail: Vec<String> = rest.collect();

    match (op, tail.as_slice()) {
        (ChangeOp::Add, [section_type]) => Change::Add {
            section,
            section_type: section_type.clone(),
        },
        (ChangeOp::Set, [value]) => Change::Set {
            section,
            option: None,
            value: value.clone(),
        },
        (ChangeOp::Set, [option, value]) => Change::Set {
            section,
            option: Some(option.clone()),
            value: value.clone(),
        },
        (ChangeOp::Remove, []) => Change::Remove {
            section,
            option: None,
        },
        (ChangeOp::Remove, [option]) => Change::Remove {
            section,
            option: Some(option.clone()),
        },
        (ChangeOp::Order, [index]) => match index.parse() {
            Ok(index) => Change::Order { section, index },
            Err(_) => Change::Unknown { fields },
        },
        (ChangeOp::Rename, [name]) => Change::Rename {
            section,
            option: None,
            name: name.clone(),
        },
        (ChangeOp::Rename, [option, name]) => Change::Rename {
            section,
            option: Some(option.clone()),
            name: name.clone(),
        },
        (ChangeOp::ListAdd, [option, value]) => Change::ListAdd {
            section,
            option: option.clone(),
            value: value.clone(),
        },
        (ChangeOp::ListDel, [option, value]) => Change::ListDel {
            section,
            option: option.clone(),
            value: value.clone(),
        },
        _ => Change::Unknown { fields },
    }
}

pub(crate) fn changes_from_wire(
    raw: BTreeMap<String, Vec<Vec<String>>>,
) -> BTreeMap<String, Vec<Change>> {
    raw.into_iter()
        .map(|(config, records)| {
            (
                config,
                records.into_iter().map(change_from_wire).collect(),
            )
        })
        .collect()
}
