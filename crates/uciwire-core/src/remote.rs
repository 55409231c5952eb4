// ── Remote config service ──
//
// The overlay talks to the router only through this trait. The production
// implementation wraps `UbusClient`; tests substitute an in-memory mock.

use std::collections::BTreeMap;
use std::future::Future;

use indexmap::IndexMap;
use uciwire_api::{UbusClient, UbusStatus};

use crate::convert::{changes_from_wire, options_to_wire, sections_from_wire};
use crate::error::CoreError;
use crate::model::{Change, OptionValue, Section};

/// Request/response operations the overlay needs from the remote store.
///
/// Mutations fail on any nonzero status. `apply` and `confirm` hand the raw
/// status back, since the apply protocol decides what a nonzero code means.
pub trait ConfigService: Send + Sync {
    /// All sections of `config`, keyed by id. A missing package is empty.
    fn get(
        &self,
        config: &str,
    ) -> impl Future<Output = Result<IndexMap<String, Section>, CoreError>> + Send;

    /// Create a section; returns the id the remote assigned.
    fn add(
        &self,
        config: &str,
        section_type: &str,
        name: Option<&str>,
        values: &IndexMap<String, OptionValue>,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    fn set(
        &self,
        config: &str,
        section: &str,
        values: &IndexMap<String, OptionValue>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Delete the whole section (`options == None`) or just the listed options.
    fn delete(
        &self,
        config: &str,
        section: &str,
        options: Option<&[String]>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn order(
        &self,
        config: &str,
        sections: &[String],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn apply(
        &self,
        timeout_secs: u64,
        rollback: bool,
    ) -> impl Future<Output = Result<UbusStatus, CoreError>> + Send;

    fn confirm(&self) -> impl Future<Output = Result<UbusStatus, CoreError>> + Send;

    /// Saved but uncommitted changes, per configuration.
    fn changes(
        &self,
    ) -> impl Future<Output = Result<BTreeMap<String, Vec<Change>>, CoreError>> + Send;
}

impl ConfigService for UbusClient {
    async fn get(&self, config: &str) -> Result<IndexMap<String, Section>, CoreError> {
        Ok(sections_from_wire(self.get_package(config).await?))
    }

    async fn add(
        &self,
        config: &str,
        section_type: &str,
        name: Option<&str>,
        values: &IndexMap<String, OptionValue>,
    ) -> Result<String, CoreError> {
        Ok(self
            .add_section(config, section_type, name, &options_to_wire(values))
            .await?)
    }

    async fn set(
        &self,
        config: &str,
        section: &str,
        values: &IndexMap<String, OptionValue>,
    ) -> Result<(), CoreError> {
        Ok(self
            .set_options(config, section, &options_to_wire(values))
            .await?)
    }

    async fn delete(
        &self,
        config: &str,
        section: &str,
        options: Option<&[String]>,
    ) -> Result<(), CoreError> {
        Ok(UbusClient::delete(self, config, section, options).await?)
    }

    async fn order(&self, config: &str, sections: &[String]) -> Result<(), CoreError> {
        Ok(UbusClient::order(self, config, sections).await?)
    }

    async fn apply(&self, timeout_secs: u64, rollback: bool) -> Result<UbusStatus, CoreError> {
        Ok(UbusClient::apply(self, timeout_secs, rollback).await?)
    }

    async fn confirm(&self) -> Result<UbusStatus, CoreError> {
        Ok(UbusClient::confirm(self).await?)
    }

    async fn changes(&self) -> Result<BTreeMap<String, Vec<Change>>, CoreError> {
        Ok(changes_from_wire(UbusClient::changes(self).await?))
    }
}
