// ── Query engine and section resolver ──
//
// Reads layer the logs over the base snapshot: changes are merged first,
// deletes are applied last. Nothing here mutates state.

use std::borrow::Cow;

use super::package::{Deletion, PackageState};
use crate::model::{OptionValue, Section, SectionRef};

/// UCI's boolean convention: `1`, `on`, `true`, `yes`, `enabled`
/// (any case) are true; everything else, including absence, is false.
pub fn is_truthy(value: Option<&OptionValue>) -> bool {
    let Some(OptionValue::Scalar(raw)) = value else {
        return false;
    };
    ["1", "on", "true", "yes", "enabled"]
        .iter()
        .any(|t| raw.eq_ignore_ascii_case(t))
}

impl PackageState {
    /// Effective section list: surviving base sections with changes merged
    /// and deleted options stripped, then pending creates, sorted by index
    /// and renumbered `0..N`. Empty while the configuration is not loaded.
    pub fn sections(&self, section_type: Option<&str>) -> Vec<Section> {
        let Some(values) = &self.values else {
            return Vec::new();
        };
        let wanted = |s: &Section| section_type.is_none_or(|t| s.section_type == t);

        let mut list: Vec<Section> = values
            .values()
            .filter(|s| !self.is_whole_deleted(&s.name) && wanted(s))
            .map(|s| self.merged(s))
            .chain(
                self.creates
                    .values()
                    .filter(|p| wanted(&p.section))
                    .map(|p| p.section.clone()),
            )
            .collect();

        list.sort_by_key(|s| s.index);
        for (index, section) in list.iter_mut().enumerate() {
            section.index = index;
        }
        list
    }

    /// Concrete id for `sid`. Positional references are looked up in the
    /// effective order of their type; named ids pass through unchecked.
    pub fn resolve<'a>(&self, sid: &'a SectionRef) -> Option<Cow<'a, str>> {
        match sid {
            SectionRef::Named(name) => Some(Cow::Borrowed(name)),
            SectionRef::Positional {
                section_type,
                index,
            } => {
                let list = self.sections(Some(section_type));
                SectionRef::pick(*index, &list).map(|s| Cow::Owned(s.name.clone()))
            }
        }
    }

    /// Effective value of one option.
    pub fn get(&self, sid: &SectionRef, opt: &str) -> Option<OptionValue> {
        let sid = self.resolve(sid)?;

        if let Some(pending) = self.creates.get(sid.as_ref()) {
            return pending.section.get(opt).cloned();
        }

        match self.deletes.get(sid.as_ref()) {
            Some(Deletion::Whole) => return None,
            Some(Deletion::Options(opts)) if opts.contains(opt) => return None,
            _ => {}
        }

        if let Some(changed) = self.changes.get(sid.as_ref()).and_then(|c| c.get(opt)) {
            return Some(changed.clone());
        }

        self.base(&sid)?.get(opt).cloned()
    }

    /// Effective copy of a whole section. Pending creates are returned as
    /// recorded; base sections are merged and stripped of deleted options.
    pub fn section(&self, sid: &SectionRef) -> Option<Section> {
        let sid = self.resolve(sid)?;

        if let Some(pending) = self.creates.get(sid.as_ref()) {
            return Some(pending.section.clone());
        }
        if self.is_whole_deleted(&sid) {
            return None;
        }
        self.base(&sid).map(|s| self.merged(s))
    }

    pub fn first_section(&self, section_type: Option<&str>) -> Option<Section> {
        self.sections(section_type).into_iter().next()
    }

    fn merged(&self, base: &Section) -> Section {
        let mut section = base.clone();
        if let Some(changes) = self.changes.get(&base.name) {
            for (opt, value) in changes {
                section.options.insert(opt.clone(), value.clone());
            }
        }
        if let Some(Deletion::Options(opts)) = self.deletes.get(&base.name) {
            section.options.retain(|opt, _| !opts.contains(opt));
        }
        section
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::{IndexMap, IndexSet};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::PendingSection;

    fn network() -> PackageState {
        let mut values = IndexMap::new();
        for section in [
            Section::new("loopback", "interface", 0).with_option("proto", "static"),
            Section::new("lan", "interface", 1)
                .with_option("proto", "static")
                .with_option("ipaddr", "192.168.1.1"),
            Section::new("cfg030f15", "device", 2)
                .anonymous(true)
                .with_option("name", "br-lan"),
            Section::new("wan", "interface", 3).with_option("proto", "dhcp"),
        ] {
            values.insert(section.name.clone(), section);
        }
        PackageState {
            values: Some(values),
            ..PackageState::default()
        }
    }

    fn names(list: &[Section]) -> Vec<&str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn unloaded_configuration_has_no_sections() {
        let mut pkg = PackageState::default();
        pkg.creates.insert(
            "new000001".into(),
            PendingSection {
                section: Section::new("new000001", "host", 1000),
                requested_name: None,
            },
        );
        assert!(pkg.sections(None).is_empty());
    }

    #[test]
    fn sections_filter_by_type_and_renumber() {
        let pkg = network();
        let list = pkg.sections(Some("interface"));
        assert_eq!(names(&list), vec!["loopback", "lan", "wan"]);
        assert_eq!(list.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn whole_delete_beats_pending_change() {
        let mut pkg = network();
        pkg.changes
            .entry("lan".into())
            .or_default()
            .insert("proto".into(), OptionValue::from("dhcp"));
        pkg.deletes.insert("lan".into(), Deletion::Whole);

        let lan = SectionRef::from("lan");
        assert_eq!(pkg.get(&lan, "proto"), None);
        assert_eq!(pkg.get(&lan, "ipaddr"), None);
        assert_eq!(pkg.section(&lan), None);
        assert_eq!(names(&pkg.sections(None)), vec!["loopback", "cfg030f15", "wan"]);
    }

    #[test]
    fn option_delete_beats_pending_change() {
        let mut pkg = network();
        pkg.changes
            .entry("lan".into())
            .or_default()
            .insert("ipaddr".into(), OptionValue::from("10.0.0.1"));
        pkg.deletes.insert(
            "lan".into(),
            Deletion::Options(IndexSet::from(["ipaddr".to_owned()])),
        );

        let lan = SectionRef::from("lan");
        assert_eq!(pkg.get(&lan, "ipaddr"), None);
        assert_eq!(pkg.get(&lan, "proto"), Some(OptionValue::from("static")));
        let section = pkg.section(&lan).unwrap();
        assert!(!section.has_option("ipaddr"));
        assert!(section.has_option("proto"));
    }

    #[test]
    fn pending_change_shadows_base_value() {
        let mut pkg = network();
        pkg.changes
            .entry("wan".into())
            .or_default()
            .insert("proto".into(), OptionValue::from("pppoe"));
        assert_eq!(
            pkg.get(&SectionRef::from("wan"), "proto"),
            Some(OptionValue::from("pppoe"))
        );
        assert_eq!(
            pkg.get(&SectionRef::from("wan"), "mtu"),
            None
        );
    }

    #[test]
    fn positional_references_follow_effective_order() {
        let mut pkg = network();
        let first = SectionRef::from("@interface[0]");
        let last = SectionRef::from("@interface[-1]");
        let beyond = SectionRef::from("@interface[3]");
        let before_start = SectionRef::from("@interface[-4]");

        assert_eq!(pkg.resolve(&first).as_deref(), Some("loopback"));
        assert_eq!(pkg.resolve(&last).as_deref(), Some("wan"));
        assert_eq!(pkg.resolve(&beyond), None);
        assert_eq!(pkg.resolve(&before_start), None);

        pkg.deletes.insert("loopback".into(), Deletion::Whole);
        assert_eq!(pkg.resolve(&first).as_deref(), Some("lan"));
    }

    #[test]
    fn named_references_pass_through_unchecked() {
        let pkg = network();
        assert_eq!(
            pkg.resolve(&SectionRef::from("nonexistent")).as_deref(),
            Some("nonexistent")
        );
        assert_eq!(pkg.get(&SectionRef::from("nonexistent"), "proto"), None);
    }

    #[test]
    fn truthy_table() {
        for raw in ["1", "on", "TRUE", "Yes", "enabled"] {
            assert!(is_truthy(Some(&OptionValue::from(raw))), "{raw}");
        }
        for raw in ["0", "off", "false", "no", "disabled", "", "random"] {
            assert!(!is_truthy(Some(&OptionValue::from(raw))), "{raw}");
        }
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&OptionValue::from(vec!["1"]))));
    }
}
