// ── Per-configuration state ──

use indexmap::{IndexMap, IndexSet};

use crate::model::{OptionValue, Section};

/// A pending deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// The whole section goes away. Supersedes any pending change.
    Whole,
    /// Only these options go away.
    Options(IndexSet<String>),
}

/// A section added locally but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSection {
    /// Local record: id, type, synthetic index and the options set so far.
    pub section: Section,
    /// Name to request from the remote; `None` lets it pick one.
    pub requested_name: Option<String>,
}

/// The four pending logs of one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingLogs {
    pub creates: IndexMap<String, PendingSection>,
    pub changes: IndexMap<String, IndexMap<String, OptionValue>>,
    pub deletes: IndexMap<String, Deletion>,
    pub reorder: bool,
}

impl PendingLogs {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.changes.is_empty() && self.deletes.is_empty() && !self.reorder
    }
}

/// Base snapshot plus pending logs for one configuration.
#[derive(Debug, Clone, Default)]
pub struct PackageState {
    /// Last snapshot fetched from the remote; `None` until loaded.
    pub values: Option<IndexMap<String, Section>>,
    pub creates: IndexMap<String, PendingSection>,
    pub changes: IndexMap<String, IndexMap<String, OptionValue>>,
    pub deletes: IndexMap<String, Deletion>,
    pub reorder: bool,
}

impl PackageState {
    pub fn is_loaded(&self) -> bool {
        self.values.is_some()
    }

    pub fn has_pending(&self) -> bool {
        !self.creates.is_empty() || !self.changes.is_empty() || !self.deletes.is_empty() || self.reorder
    }

    /// Base section by id, if loaded.
    pub fn base(&self, sid: &str) -> Option<&Section> {
        self.values.as_ref()?.get(sid)
    }

    pub fn is_whole_deleted(&self, sid: &str) -> bool {
        matches!(self.deletes.get(sid), Some(Deletion::Whole))
    }

    /// Order to submit for this configuration: pending creates and base
    /// sections by local index, wholly deleted sections left out.
    pub fn submission_order(&self, logs: &PendingLogs) -> Vec<String> {
        let mut order: Vec<(&str, usize)> = logs
            .creates
            .values()
            .map(|p| (p.section.name.as_str(), p.section.index))
            .collect();
        if let Some(values) = &self.values {
            order.extend(
                values
                    .values()
                    .filter(|s| !matches!(logs.deletes.get(&s.name), Some(Deletion::Whole)))
                    .map(|s| (s.name.as_str(), s.index)),
            );
        }
        order.sort_by_key(|(_, index)| *index);
        order.into_iter().map(|(name, _)| name.to_owned()).collect()
    }

    pub fn take_logs(&mut self) -> PendingLogs {
        PendingLogs {
            creates: std::mem::take(&mut self.creates),
            changes: std::mem::take(&mut self.changes),
            deletes: std::mem::take(&mut self.deletes),
            reorder: std::mem::take(&mut self.reorder),
        }
    }

    /// Merge previously taken logs back underneath the current ones.
    pub fn restore_logs(&mut self, logs: PendingLogs) {
        let PendingLogs {
            mut creates,
            mut changes,
            mut deletes,
            reorder,
        } = logs;

        creates.extend(std::mem::take(&mut self.creates));
        self.creates = creates;

        for (sid, options) in std::mem::take(&mut self.changes) {
            changes.entry(sid).or_default().extend(options);
        }
        self.changes = changes;

        deletes.extend(std::mem::take(&mut self.deletes));
        self.deletes = deletes;
        for (sid, deletion) in &self.deletes {
            if *deletion == Deletion::Whole {
                self.changes.shift_remove(sid);
            }
        }

        self.reorder |= reorder;
    }
}
