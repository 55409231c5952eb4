use indexmap::IndexMap;
use serde::Serialize;

use super::value::OptionValue;

/// A typed, ordered record within a configuration.
///
/// `index` orders sections for display and for the `order` call. Values
/// from the remote are `0..N`; pending creates start at 1000 so they sort
/// after every pre-existing section until moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    #[serde(rename = "type")]
    pub section_type: String,
    pub anonymous: bool,
    pub index: usize,
    pub options: IndexMap<String, OptionValue>,
}

impl Section {
    pub fn new(name: impl Into<String>, section_type: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            section_type: section_type.into(),
            anonymous: false,
            index,
            options: IndexMap::new(),
        }
    }

    /// Builder-style option insertion, mostly for tests and fixtures.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    pub fn get(&self, option: &str) -> Option<&OptionValue> {
        self.options.get(option)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.contains_key(option)
    }
}
