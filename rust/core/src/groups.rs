// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group tracker
//!
//! Keeps the set of currently open groups. Every grouping statement closes
//! the whole set and replaces it; ranges are closed at the current size of
//! the entity directory.

use smallvec::SmallVec;
use tracing::debug;

use crate::document::ObjDocument;
use crate::entity::{Group, GroupId, GroupKey};

/// Currently open groups, usually one or two
pub type OpenGroups = SmallVec<[GroupId; 4]>;

#[derive(Debug, Default)]
pub struct GroupTracker {
    open: OpenGroups,
}

impl GroupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the open groups, in declaration order
    #[inline]
    pub fn open_groups(&self) -> &[GroupId] {
        &self.open
    }

    /// Close every open group's range at the current directory size
    pub fn close_all(&mut self, document: &mut ObjDocument) {
        let end = document.entity_count();
        for id in self.open.drain(..) {
            if let Some(group) = document.group_mut(id) {
                group.close_range(end);
                debug!(group = %group.key(), end, "Closed group range");
            }
        }
    }

    /// Open a group by identity, creating it on first sight
    pub fn open(&mut self, document: &mut ObjDocument, key: GroupKey) -> GroupId {
        self.open_group(document, Group::new(key))
    }

    /// Open a prepared group (e.g. carrying a merge resolution).
    /// An existing group with the same identity is reused instead; a
    /// re-declared `mg` group takes the latest resolution.
    pub fn open_group(&mut self, document: &mut ObjDocument, group: Group) -> GroupId {
        let start = document.entity_count();
        let resolution = group.resolution();
        let (id, created) = document.insert_group(group);

        if let (false, Some(resolution), Some(existing)) =
            (created, resolution, document.group_mut(id))
        {
            if existing.resolution() != Some(resolution) {
                debug!(
                    group = %existing.key(),
                    old = ?existing.resolution(),
                    new = resolution,
                    "Merge resolution changed"
                );
                existing.set_resolution(resolution);
            }
        }

        // `g a a` names the same group twice
        if self.open.contains(&id) {
            return id;
        }

        if let Some(group) = document.group_mut(id) {
            group.open_range(start);
            debug!(group = %group.key(), start, created, "Opened group range");
        }
        self.open.push(id);
        id
    }

    /// Close all remaining ranges at end of input
    pub fn finish(mut self, document: &mut ObjDocument) {
        self.close_all(document);
    }
}
