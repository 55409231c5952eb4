// JSON-RPC frames and ubus reply shapes
//
// Every call is a JSON-RPC 2.0 `call` whose params are
// `[session, object, method, args]`. The reply's `result` is
// `[status]` or `[status, data]`. Fields use `#[serde(default)]` where
// rpcd omits them on older firmware.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Frames ───────────────────────────────────────────────────────────

/// Outgoing JSON-RPC request frame.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: (&'a str, &'a str, &'a str, &'a Value),
}

/// Incoming JSON-RPC reply frame.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcReply {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC `error` member.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

// ── session ──────────────────────────────────────────────────────────

/// Reply payload of `session.login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub ubus_rpc_session: String,
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub expires: u64,
    /// ACLs, user data, and anything newer rpcd versions add.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── uci ──────────────────────────────────────────────────────────────

/// One section as returned by `uci get`.
///
/// Metadata lives under dot-prefixed keys; every other key is an option
/// whose value is a string or an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UciSectionRecord {
    #[serde(rename = ".name")]
    pub name: String,
    #[serde(rename = ".type")]
    pub section_type: String,
    #[serde(rename = ".anonymous", default)]
    pub anonymous: bool,
    #[serde(rename = ".index", default)]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub options: serde_json::Map<String, Value>,
}

/// Reply payload of `uci get` for a whole package.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GetReply {
    #[serde(default)]
    pub values: IndexMap<String, UciSectionRecord>,
}

/// Reply payload of `uci add`.
#[derive(Debug, Deserialize)]
pub(crate) struct AddReply {
    #[serde(default)]
    pub section: String,
}

/// Reply payload of `uci changes`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChangesReply {
    #[serde(default)]
    pub changes: BTreeMap<String, Vec<Vec<String>>>,
}
