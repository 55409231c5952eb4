// Shared test harness: an in-memory remote that records every call and
// applies mutations to its own copy of the data, so reloads after a save
// observe the "server" state.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use uciwire_api::UbusStatus;
use uciwire_core::{Change, ConfigService, CoreError, OptionValue, Section};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Add {
        config: String,
        section_type: String,
        name: Option<String>,
        values: IndexMap<String, OptionValue>,
    },
    Set {
        config: String,
        section: String,
        values: IndexMap<String, OptionValue>,
    },
    Delete {
        config: String,
        section: String,
        options: Option<Vec<String>>,
    },
    Order {
        config: String,
        sections: Vec<String>,
    },
    Apply {
        timeout_secs: u64,
        rollback: bool,
    },
    Confirm,
    Changes,
}

impl Call {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Get(_) => "get",
            Self::Add { .. } => "add",
            Self::Set { .. } => "set",
            Self::Delete { .. } => "delete",
            Self::Order { .. } => "order",
            Self::Apply { .. } => "apply",
            Self::Confirm => "confirm",
            Self::Changes => "changes",
        }
    }
}

#[derive(Default)]
pub struct MockService {
    remote: Mutex<BTreeMap<String, IndexMap<String, Section>>>,
    calls: Mutex<Vec<Call>>,
    next_anonymous: AtomicUsize,
    /// Call kind that fails with a remote rejection.
    fail_on: Mutex<Option<&'static str>>,
    /// Artificial latency for `get`, to hold loads in flight.
    get_delay: Mutex<Option<Duration>>,
    apply_status: Mutex<Option<UbusStatus>>,
    /// Scripted confirm answers; once exhausted `confirm_fallback` repeats.
    confirm_script: Mutex<VecDeque<UbusStatus>>,
    confirm_fallback: Mutex<Option<UbusStatus>>,
    remote_changes: Mutex<BTreeMap<String, Vec<Change>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a configuration. Indices follow insertion order.
    pub fn with_config(self, conf: &str, sections: Vec<Section>) -> Self {
        let mut map = IndexMap::new();
        for (index, mut section) in sections.into_iter().enumerate() {
            section.index = index;
            map.insert(section.name.clone(), section);
        }
        self.remote.lock().unwrap().insert(conf.to_owned(), map);
        self
    }

    pub fn fail_on(&self, kind: &'static str) {
        *self.fail_on.lock().unwrap() = Some(kind);
    }

    pub fn succeed(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    pub fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_apply_status(&self, status: UbusStatus) {
        *self.apply_status.lock().unwrap() = Some(status);
    }

    pub fn script_confirm(&self, answers: &[UbusStatus], then: UbusStatus) {
        self.confirm_script.lock().unwrap().extend(answers.iter().copied());
        *self.confirm_fallback.lock().unwrap() = Some(then);
    }

    pub fn set_remote_changes(&self, changes: BTreeMap<String, Vec<Change>>) {
        *self.remote_changes.lock().unwrap() = changes;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// The remote's current copy of `conf`.
    pub fn remote(&self, conf: &str) -> IndexMap<String, Section> {
        self.remote
            .lock()
            .unwrap()
            .get(conf)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) -> Result<(), CoreError> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        if *self.fail_on.lock().unwrap() == Some(kind) {
            return Err(CoreError::Rpc {
                message: format!("mock rejected {kind}"),
                status: Some(UbusStatus::InvalidArgument),
            });
        }
        Ok(())
    }
}

impl ConfigService for MockService {
    async fn get(&self, config: &str) -> Result<IndexMap<String, Section>, CoreError> {
        self.record(Call::Get(config.to_owned()))?;
        let delay = *self.get_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.remote(config))
    }

    async fn add(
        &self,
        config: &str,
        section_type: &str,
        name: Option<&str>,
        values: &IndexMap<String, OptionValue>,
    ) -> Result<String, CoreError> {
        self.record(Call::Add {
            config: config.to_owned(),
            section_type: section_type.to_owned(),
            name: name.map(str::to_owned),
            values: values.clone(),
        })?;

        let sid = name.map_or_else(
            || format!("cfg{:06x}", self.next_anonymous.fetch_add(1, Ordering::Relaxed) + 1),
            str::to_owned,
        );
        let mut remote = self.remote.lock().unwrap();
        let sections = remote.entry(config.to_owned()).or_default();
        let mut section = Section::new(sid.clone(), section_type, sections.len()).anonymous(name.is_none());
        section.options = values.clone();
        sections.insert(sid.clone(), section);
        Ok(sid)
    }

    async fn set(
        &self,
        config: &str,
        section: &str,
        values: &IndexMap<String, OptionValue>,
    ) -> Result<(), CoreError> {
        self.record(Call::Set {
            config: config.to_owned(),
            section: section.to_owned(),
            values: values.clone(),
        })?;
        let mut remote = self.remote.lock().unwrap();
        if let Some(target) = remote.get_mut(config).and_then(|s| s.get_mut(section)) {
            target.options.extend(values.clone());
        }
        Ok(())
    }

    async fn delete(
        &self,
        config: &str,
        section: &str,
        options: Option<&[String]>,
    ) -> Result<(), CoreError> {
        self.record(Call::Delete {
            config: config.to_owned(),
            section: section.to_owned(),
            options: options.map(<[String]>::to_vec),
        })?;
        let mut remote = self.remote.lock().unwrap();
        if let Some(sections) = remote.get_mut(config) {
            match options {
                None => {
                    sections.shift_remove(section);
                }
                Some(options) => {
                    if let Some(target) = sections.get_mut(section) {
                        target.options.retain(|k, _| !options.contains(k));
                    }
                }
            }
        }
        Ok(())
    }

    async fn order(&self, config: &str, sections: &[String]) -> Result<(), CoreError> {
        self.record(Call::Order {
            config: config.to_owned(),
            sections: sections.to_vec(),
        })?;
        let mut remote = self.remote.lock().unwrap();
        if let Some(existing) = remote.get_mut(config) {
            for (index, sid) in sections.iter().enumerate() {
                if let Some(section) = existing.get_mut(sid) {
                    section.index = index;
                }
            }
            existing.sort_by(|_, a, _, b| a.index.cmp(&b.index));
        }
        Ok(())
    }

    async fn apply(&self, timeout_secs: u64, rollback: bool) -> Result<UbusStatus, CoreError> {
        self.record(Call::Apply {
            timeout_secs,
            rollback,
        })?;
        Ok(self.apply_status.lock().unwrap().unwrap_or(UbusStatus::Ok))
    }

    async fn confirm(&self) -> Result<UbusStatus, CoreError> {
        self.record(Call::Confirm)?;
        let scripted = self.confirm_script.lock().unwrap().pop_front();
        Ok(scripted
            .or(*self.confirm_fallback.lock().unwrap())
            .unwrap_or(UbusStatus::Ok))
    }

    async fn changes(&self) -> Result<BTreeMap<String, Vec<Change>>, CoreError> {
        self.record(Call::Changes)?;
        Ok(self.remote_changes.lock().unwrap().clone())
    }
}

pub fn network() -> MockService {
    MockService::new().with_config(
        "network",
        vec![
            Section::new("loopback", "interface", 0)
                .with_option("proto", "static")
                .with_option("ipaddr", "127.0.0.1"),
            Section::new("lan", "interface", 0)
                .with_option("proto", "static")
                .with_option("ipaddr", "192.168.1.1"),
            Section::new("cfg030f15", "device", 0)
                .anonymous(true)
                .with_option("name", "br-lan")
                .with_option("ports", vec!["lan1", "lan2"]),
            Section::new("wan", "interface", 0).with_option("proto", "dhcp"),
        ],
    )
}
