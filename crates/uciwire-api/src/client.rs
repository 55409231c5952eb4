// ubus JSON-RPC HTTP client
//
// Wraps `reqwest::Client` with request framing, id allocation, session
// handling, and reply unwrapping. Object-specific calls (uci, session)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ANONYMOUS_SESSION;
use crate::error::Error;
use crate::models::{RpcReply, RpcRequest};
use crate::status::UbusStatus;
use crate::transport::TransportConfig;

/// JSON-RPC error code rpcd uses for a missing or expired session.
const ACCESS_DENIED: i64 = -32002;

/// Unwrapped reply of a single ubus call: the status code plus the
/// optional data object.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReply {
    pub status: UbusStatus,
    pub data: Option<Value>,
}

impl CallReply {
    /// Fail with `Error::Status` unless the call succeeded.
    pub fn ensure_ok(self, object: &str, method: &str) -> Result<Self, Error> {
        if self.status.is_ok() {
            Ok(self)
        } else {
            Err(Error::Status {
                object: object.into(),
                method: method.into(),
                status: self.status,
            })
        }
    }

    /// Deserialize the data object, treating a missing one as `{}`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, Error> {
        let data = self
            .data
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: data.to_string(),
        })
    }
}

/// Raw client for a ubus JSON-RPC endpoint (`/ubus` on uhttpd,
/// `/cgi-bin/luci/admin/ubus` behind LuCI).
///
/// Every request carries the current session id. The anonymous session is
/// used until [`login`](Self::login) stores a real one.
pub struct UbusClient {
    http: reqwest::Client,
    endpoint: Url,
    session: RwLock<String>,
    next_id: AtomicU64,
    timeout_secs: u64,
}

impl UbusClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            session: RwLock::new(ANONYMOUS_SESSION.to_owned()),
            next_id: AtomicU64::new(1),
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// The RPC endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The session id sent with every call.
    pub fn session_id(&self) -> String {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the session id (e.g. one obtained out of band).
    pub fn set_session_id(&self, session: impl Into<String>) {
        debug!("storing ubus session id");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session.into();
    }

    /// Issue `object.method(args)` and unwrap the reply frame.
    ///
    /// A nonzero ubus status is NOT an error at this layer; callers decide
    /// via [`CallReply::ensure_ok`].
    pub async fn call(&self, object: &str, method: &str, args: &Value) -> Result<CallReply, Error> {
        let session = self.session_id();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method: "call",
            params: (&session, object, method, args),
        };

        debug!(id, object, method, "ubus call");
        trace!(%args, "ubus call arguments");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                object: object.into(),
                method: method.into(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        trace!(id, body = preview(&body, 512), "ubus reply");
        parse_reply(object, method, &body)
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Leading slice of a reply body for logs and error messages.
fn preview(body: &str, max: usize) -> &str {
    body.get(..body.len().min(max)).unwrap_or(body)
}

/// Verify the frame, surface JSON-RPC errors, and split `result`.
fn parse_reply(object: &str, method: &str, body: &str) -> Result<CallReply, Error> {
    let reply: RpcReply = serde_json::from_str(body).map_err(|e| {
        let preview = preview(body, 200);
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })?;

    if reply.jsonrpc.as_deref() != Some("2.0") {
        return Err(Error::InvalidFrame {
            object: object.into(),
            method: method.into(),
        });
    }

    if let Some(err) = reply.error {
        let message = err.message.unwrap_or_else(|| "?".into());
        return Err(if err.code == ACCESS_DENIED {
            Error::Authentication { message }
        } else {
            Error::Rpc {
                object: object.into(),
                method: method.into(),
                code: err.code,
                message,
            }
        });
    }

    let mut result = reply
        .result
        .ok_or_else(|| Error::InvalidFrame {
            object: object.into(),
            method: method.into(),
        })?
        .into_iter();

    let status = result
        .next()
        .and_then(|v| v.as_u64())
        .and_then(|code| u32::try_from(code).ok())
        .map_or(UbusStatus::UnknownError, UbusStatus::from_code);

    Ok(CallReply {
        status,
        data: result.next(),
    })
}
