// rpcd session authentication
//
// `session.login` trades a username/password for a session id, which is
// then sent as the first JSON-RPC param of every subsequent call.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::UbusClient;
use crate::error::Error;
use crate::models::LoginReply;

/// Session id rpcd accepts for unauthenticated calls.
pub const ANONYMOUS_SESSION: &str = "00000000000000000000000000000000";

impl UbusClient {
    /// Authenticate with rpcd using username/password.
    ///
    /// On success the returned `ubus_rpc_session` is stored and used for
    /// all subsequent calls.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginReply, Error> {
        debug!(username, "logging in via session.login");
        self.set_session_id(ANONYMOUS_SESSION);

        let args = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let reply = self.call("session", "login", &args).await?;

        if !reply.status.is_ok() {
            return Err(Error::Authentication {
                message: format!("login rejected: {}", reply.status),
            });
        }

        let login: LoginReply = reply.parse()?;
        self.set_session_id(login.ubus_rpc_session.clone());
        debug!(timeout = login.timeout, "login successful");
        Ok(login)
    }

    /// Destroy the current session and fall back to the anonymous one.
    ///
    /// The local session id is reset even if rpcd rejects the destroy.
    pub async fn logout(&self) -> Result<(), Error> {
        let session = self.session_id();
        if session == ANONYMOUS_SESSION {
            return Ok(());
        }

        debug!("destroying session");
        let reply = self
            .call("session", "destroy", &json!({ "ubus_rpc_session": session }))
            .await?;
        self.set_session_id(ANONYMOUS_SESSION);
        reply.ensure_ok("session", "destroy")?;
        Ok(())
    }
}
