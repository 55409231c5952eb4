// ── Overlay state ──
//
// One `PackageState` per configuration holds the base snapshot and all four
// pending logs. Everything in here is synchronous; the async overlay locks
// an `OverlayState`, calls into it, and releases the lock before awaiting.

mod mutate;
mod package;
mod query;

use std::borrow::Cow;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::{OptionValue, Section, SectionRef};

pub use package::{Deletion, PackageState, PendingLogs, PendingSection};
pub use query::is_truthy;

/// Synthetic index floor for pending creates, so they sort after every
/// section loaded from the remote.
pub const CREATE_INDEX_BASE: usize = 1000;

/// All configurations known to one overlay instance.
#[derive(Debug, Default)]
pub struct OverlayState {
    packages: HashMap<String, PackageState>,
    /// Counter behind the synthetic create index; shared across configs.
    next_create: usize,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(&self, conf: &str) -> Option<&PackageState> {
        self.packages.get(conf)
    }

    pub fn package_mut(&mut self, conf: &str) -> &mut PackageState {
        self.packages.entry(conf.to_owned()).or_default()
    }

    /// Install a freshly loaded snapshot. Pending logs are left alone.
    pub fn install(&mut self, conf: &str, values: IndexMap<String, Section>) {
        self.package_mut(conf).values = Some(values);
    }

    /// Drop the base snapshot of `conf` but keep its pending logs, so the
    /// next load fetches again.
    pub fn invalidate(&mut self, conf: &str) {
        if let Some(pkg) = self.packages.get_mut(conf) {
            pkg.values = None;
        }
    }

    /// Forget everything about `conf`, pending logs included.
    pub fn unload(&mut self, conf: &str) {
        self.packages.remove(conf);
    }

    pub fn is_loaded(&self, conf: &str) -> bool {
        self.package(conf).is_some_and(PackageState::is_loaded)
    }

    /// Configurations with anything waiting to be saved, sorted by name.
    pub fn pending_configs(&self) -> Vec<String> {
        let mut configs: Vec<String> = self
            .packages
            .iter()
            .filter(|(_, pkg)| pkg.has_pending())
            .map(|(name, _)| name.clone())
            .collect();
        configs.sort();
        configs
    }

    /// Take the pending logs of every touched configuration, leaving fresh
    /// empty logs behind.
    pub fn take_pending(&mut self) -> Vec<(String, PendingLogs)> {
        let mut taken: Vec<(String, PendingLogs)> = self
            .packages
            .iter_mut()
            .filter(|(_, pkg)| pkg.has_pending())
            .map(|(name, pkg)| (name.clone(), pkg.take_logs()))
            .collect();
        taken.sort_by(|a, b| a.0.cmp(&b.0));
        taken
    }

    /// Put logs taken by [`take_pending`](Self::take_pending) back after a
    /// failed save. Entries recorded since then win.
    pub fn restore_pending(&mut self, taken: Vec<(String, PendingLogs)>) {
        for (conf, logs) in taken {
            self.package_mut(&conf).restore_logs(logs);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sections(&self, conf: &str, section_type: Option<&str>) -> Vec<Section> {
        self.package(conf)
            .map(|pkg| pkg.sections(section_type))
            .unwrap_or_default()
    }

    pub fn resolve(&self, conf: &str, sid: &SectionRef) -> Option<String> {
        match self.package(conf) {
            Some(pkg) => pkg.resolve(sid).map(Cow::into_owned),
            None => sid.as_named().map(str::to_owned),
        }
    }

    pub fn get(&self, conf: &str, sid: &SectionRef, opt: &str) -> Option<OptionValue> {
        self.package(conf)?.get(sid, opt)
    }

    pub fn section(&self, conf: &str, sid: &SectionRef) -> Option<Section> {
        self.package(conf)?.section(sid)
    }

    pub fn first_section(&self, conf: &str, section_type: Option<&str>) -> Option<Section> {
        self.package(conf)?.first_section(section_type)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Record a pending create. `None` when `name` is already taken by a
    /// section loaded from the remote.
    pub fn add(&mut self, conf: &str, section_type: &str, name: Option<&str>) -> Option<String> {
        let index = CREATE_INDEX_BASE + self.next_create;
        let sid = self
            .package_mut(conf)
            .create(section_type, name, index, &mut rand::thread_rng())?;
        self.next_create += 1;
        Some(sid)
    }

    /// Create a new section seeded with the effective options of `src`,
    /// optionally placed right after it.
    pub fn clone_section(
        &mut self,
        conf: &str,
        section_type: &str,
        src: &SectionRef,
        put_next: bool,
        name: Option<&str>,
    ) -> Option<String> {
        let source = self.section(conf, src)?;
        let sid = self.add(conf, section_type, name)?;

        let pkg = self.package_mut(conf);
        for (opt, value) in source.options {
            pkg.set(&SectionRef::Named(sid.clone()), &opt, Some(value));
        }
        if put_next {
            pkg.move_section(
                &SectionRef::Named(sid.clone()),
                Some(&SectionRef::Named(source.name)),
                true,
            );
        }
        Some(sid)
    }

    pub fn remove(&mut self, conf: &str, sid: &SectionRef) {
        if let Some(pkg) = self.packages.get_mut(conf) {
            pkg.remove(sid);
        }
    }

    pub fn set(&mut self, conf: &str, sid: &SectionRef, opt: &str, value: Option<OptionValue>) {
        if let Some(pkg) = self.packages.get_mut(conf) {
            pkg.set(sid, opt, value);
        }
    }

    pub fn move_section(
        &mut self,
        conf: &str,
        sid1: &SectionRef,
        sid2: Option<&SectionRef>,
        after: bool,
    ) -> bool {
        self.packages
            .get_mut(conf)
            .is_some_and(|pkg| pkg.move_section(sid1, sid2, after))
    }
}
