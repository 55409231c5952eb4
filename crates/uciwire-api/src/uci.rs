// `uci` object endpoints
//
// Typed wrappers for the rpcd uci plugin: get, add, set, delete, order,
// apply, confirm, changes.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use strum::AsRefStr;
use tracing::debug;

use crate::client::UbusClient;
use crate::error::Error;
use crate::models::{AddReply, ChangesReply, GetReply, UciSectionRecord};
use crate::status::UbusStatus;

const OBJECT: &str = "uci";

/// Methods of the rpcd `uci` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum UciMethod {
    Get,
    Add,
    Set,
    Delete,
    Order,
    Apply,
    Confirm,
    Changes,
}

impl UbusClient {
    async fn uci(&self, method: UciMethod, args: &Value) -> Result<crate::CallReply, Error> {
        self.call(OBJECT, method.as_ref(), args).await
    }

    /// Fetch every section of a package.
    ///
    /// `uci get {config}`: a missing package yields an empty map rather
    /// than an error.
    pub async fn get_package(
        &self,
        config: &str,
    ) -> Result<IndexMap<String, UciSectionRecord>, Error> {
        debug!(config, "loading package");
        let reply = self.uci(UciMethod::Get, &json!({ "config": config })).await?;
        if reply.status == UbusStatus::NotFound {
            debug!(config, "package not found, treating as empty");
            return Ok(IndexMap::new());
        }
        let reply: GetReply = reply.ensure_ok(OBJECT, UciMethod::Get.as_ref())?.parse()?;
        Ok(reply.values)
    }

    /// Create a section and return the name the remote assigned.
    ///
    /// `uci add {config, type, name?, values}`
    pub async fn add_section(
        &self,
        config: &str,
        section_type: &str,
        name: Option<&str>,
        values: &Map<String, Value>,
    ) -> Result<String, Error> {
        let mut args = json!({
            "config": config,
            "type": section_type,
            "values": values,
        });
        if let Some(name) = name {
            args["name"] = Value::from(name);
        }
        debug!(config, section_type, ?name, "adding section");
        let reply: AddReply = self
            .uci(UciMethod::Add, &args)
            .await?
            .ensure_ok(OBJECT, UciMethod::Add.as_ref())?
            .parse()?;
        Ok(reply.section)
    }

    /// Set option values on an existing section.
    ///
    /// `uci set {config, section, values}`
    pub async fn set_options(
        &self,
        config: &str,
        section: &str,
        values: &Map<String, Value>,
    ) -> Result<(), Error> {
        debug!(config, section, count = values.len(), "setting options");
        self.uci(
            UciMethod::Set,
            &json!({ "config": config, "section": section, "values": values }),
        )
        .await?
        .ensure_ok(OBJECT, UciMethod::Set.as_ref())?;
        Ok(())
    }

    /// Delete a whole section (`options == None`) or the listed options.
    ///
    /// `uci delete {config, section, options?}`
    pub async fn delete(
        &self,
        config: &str,
        section: &str,
        options: Option<&[String]>,
    ) -> Result<(), Error> {
        let mut args = json!({ "config": config, "section": section });
        if let Some(options) = options {
            args["options"] = json!(options);
        }
        debug!(config, section, ?options, "deleting");
        self.uci(UciMethod::Delete, &args)
            .await?
            .ensure_ok(OBJECT, UciMethod::Delete.as_ref())?;
        Ok(())
    }

    /// Submit the complete section order of a package.
    ///
    /// `uci order {config, sections}`
    pub async fn order(&self, config: &str, sections: &[String]) -> Result<(), Error> {
        debug!(config, count = sections.len(), "reordering sections");
        self.uci(
            UciMethod::Order,
            &json!({ "config": config, "sections": sections }),
        )
        .await?
        .ensure_ok(OBJECT, UciMethod::Order.as_ref())?;
        Ok(())
    }

    /// Activate saved changes, optionally arming the rollback timer.
    ///
    /// `uci apply {timeout, rollback}`: returns the raw status; the
    /// caller decides what a nonzero status means.
    pub async fn apply(&self, timeout_secs: u64, rollback: bool) -> Result<UbusStatus, Error> {
        debug!(timeout_secs, rollback, "applying changes");
        let reply = self
            .uci(
                UciMethod::Apply,
                &json!({ "timeout": timeout_secs, "rollback": rollback }),
            )
            .await?;
        Ok(reply.status)
    }

    /// Confirm a pending rollback-armed apply.
    ///
    /// `uci confirm`: returns the raw status.
    pub async fn confirm(&self) -> Result<UbusStatus, Error> {
        let reply = self.uci(UciMethod::Confirm, &json!({})).await?;
        Ok(reply.status)
    }

    /// Pending (saved but not yet committed) changes of every package.
    ///
    /// `uci changes`: each record is `[operation, section, ...fields]`.
    pub async fn changes(&self) -> Result<BTreeMap<String, Vec<Vec<String>>>, Error> {
        debug!("fetching pending changes");
        let reply: ChangesReply = self
            .uci(UciMethod::Changes, &json!({}))
            .await?
            .ensure_ok(OBJECT, UciMethod::Changes.as_ref())?
            .parse()?;
        Ok(reply.changes)
    }
}
