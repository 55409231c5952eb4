// ── Mutation API ──
//
// Records intent in the pending logs. Unresolvable references and invalid
// arguments are silent no-ops; only `move_section` reports failure.

use std::borrow::Cow;

use indexmap::IndexSet;
use rand::Rng;

use super::package::{Deletion, PackageState, PendingSection};
use crate::model::{OptionValue, Section, SectionRef};

impl PackageState {
    /// Record a pending create and return its id.
    ///
    /// A requested `name` that is already a base section records nothing
    /// and yields `None`, even while that section is pending deletion.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        section_type: &str,
        name: Option<&str>,
        index: usize,
        rng: &mut R,
    ) -> Option<String> {
        let sid = match name {
            Some(name) => {
                if self.base(name).is_some() {
                    return None;
                }
                name.to_owned()
            }
            None => self.generate_id(rng),
        };

        let section = Section::new(sid.clone(), section_type, index).anonymous(name.is_none());
        self.creates.insert(
            sid.clone(),
            PendingSection {
                section,
                requested_name: name.map(str::to_owned),
            },
        );
        Some(sid)
    }

    /// `new` followed by six random hex digits, unique among creates and
    /// base sections.
    pub fn generate_id<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        loop {
            let sid = format!("new{:06x}", rng.gen_range(0..=0x00FF_FFFF_u32));
            if !self.creates.contains_key(&sid) && self.base(&sid).is_none() {
                return sid;
            }
        }
    }

    pub fn remove(&mut self, sid: &SectionRef) {
        let Some(sid) = self.resolve(sid).map(Cow::into_owned) else {
            return;
        };
        if self.creates.shift_remove(&sid).is_some() {
            return;
        }
        if self.base(&sid).is_none() {
            return;
        }
        self.changes.shift_remove(&sid);
        self.deletes.insert(sid, Deletion::Whole);
    }

    /// Set (`Some`, non-empty) or unset (`None` or empty) an option.
    pub fn set(&mut self, sid: &SectionRef, opt: &str, value: Option<OptionValue>) {
        let Some(sid) = self.resolve(sid).map(Cow::into_owned) else {
            return;
        };
        if opt.is_empty() || opt.starts_with('.') {
            return;
        }

        if let Some(pending) = self.creates.get_mut(&sid) {
            match value {
                Some(value) => {
                    pending.section.options.insert(opt.to_owned(), value);
                }
                None => {
                    pending.section.options.shift_remove(opt);
                }
            }
            return;
        }

        match value {
            Some(value) if !value.is_empty() => self.record_change(sid, opt, value),
            _ => self.record_unset(sid, opt),
        }
    }

    fn record_change(&mut self, sid: String, opt: &str, value: OptionValue) {
        if self.is_whole_deleted(&sid) || self.base(&sid).is_none() {
            return;
        }
        if let Some(Deletion::Options(opts)) = self.deletes.get_mut(&sid) {
            opts.shift_remove(opt);
            if opts.is_empty() {
                self.deletes.shift_remove(&sid);
            }
        }
        self.changes
            .entry(sid)
            .or_default()
            .insert(opt.to_owned(), value);
    }

    fn record_unset(&mut self, sid: String, opt: &str) {
        if let Some(changes) = self.changes.get_mut(&sid) {
            changes.shift_remove(opt);
            if changes.is_empty() {
                self.changes.shift_remove(&sid);
            }
        }

        if !self.base(&sid).is_some_and(|s| s.has_option(opt)) {
            return;
        }
        match self
            .deletes
            .entry(sid)
            .or_insert_with(|| Deletion::Options(IndexSet::new()))
        {
            Deletion::Whole => {}
            Deletion::Options(opts) => {
                opts.insert(opt.to_owned());
            }
        }
    }

    /// Move `sid1` before `sid2`, after it (`after`), or to the end
    /// (`sid2 == None`). Every section is renumbered to the new order.
    pub fn move_section(
        &mut self,
        sid1: &SectionRef,
        sid2: Option<&SectionRef>,
        after: bool,
    ) -> bool {
        let Some(sid1) = self.resolve(sid1).map(Cow::into_owned) else {
            return false;
        };
        let target = match sid2 {
            Some(sid2) => match self.resolve(sid2) {
                Some(sid2) => Some(sid2.into_owned()),
                None => return false,
            },
            None => None,
        };

        let mut order: Vec<String> = self.sections(None).into_iter().map(|s| s.name).collect();
        let Some(from) = order.iter().position(|name| *name == sid1) else {
            return false;
        };
        let moving = order.remove(from);

        match target {
            None => order.push(moving),
            Some(target) => {
                let Some(at) = order.iter().position(|name| *name == target) else {
                    return false;
                };
                order.insert(if after { at + 1 } else { at }, moving);
            }
        }

        for (index, name) in order.iter().enumerate() {
            self.set_index(name, index);
        }
        self.reorder = true;
        true
    }

    fn set_index(&mut self, sid: &str, index: usize) {
        if let Some(pending) = self.creates.get_mut(sid) {
            pending.section.index = index;
        } else if let Some(section) = self.values.as_mut().and_then(|v| v.get_mut(sid)) {
            section.index = index;
        }
    }
}
