// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser configuration.

/// Name of the group opened before the first line
pub const DEFAULT_GROUP_NAME: &str = "default";

/// What to do with a record whose numbers or structure are malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole parse
    #[default]
    Abort,
    /// Log a warning and drop the record.
    ///
    /// Dropped faces shift every later primitive id down by one relative
    /// to the file's own face order.
    Skip,
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Name group opened before parsing starts; `None` disables it
    pub default_group: Option<String>,
    /// Pre-reserve index buffer capacity when a run of vertex lines ends
    pub reserve_index_capacity: bool,
    /// Handling of malformed records
    pub on_malformed: MalformedPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_group: Some(DEFAULT_GROUP_NAME.to_string()),
            reserve_index_capacity: true,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_group(mut self, name: impl Into<String>) -> Self {
        self.default_group = Some(name.into());
        self
    }

    pub fn without_default_group(mut self) -> Self {
        self.default_group = None;
        self
    }

    pub fn with_index_reservation(mut self, enabled: bool) -> Self {
        self.reserve_index_capacity = enabled;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Permissive preset: skip malformed records instead of aborting
    pub fn lenient() -> Self {
        Self::default().with_malformed_policy(MalformedPolicy::Skip)
    }
}
