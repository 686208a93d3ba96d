// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ Document - vertex store, index buffer and entity directory
//!
//! Every cross reference is an index resolved at lookup time, never a
//! captured reference, so buffers may reallocate during parsing without
//! invalidating anything. Out-of-range lookups return `None`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, EntityRef, Group, GroupId, GroupKey, Primitive, PrimitiveId, PrimitiveKind, Vertex,
    VertexChannel,
};

/// Group identity → group id
pub type GroupIndex = FxHashMap<GroupKey, GroupId>;

/// Vertex of a primitive tuple, with the channel it was read from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleVertex<'a> {
    pub channel: VertexChannel,
    /// 0-based offset in the channel
    pub index: usize,
    pub vertex: &'a Vertex,
}

/// Document statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DocumentStats {
    pub position_count: usize,
    pub texture_count: usize,
    pub normal_count: usize,
    pub parameter_count: usize,
    pub index_count: usize,
    pub point_count: usize,
    pub line_count: usize,
    pub face_count: usize,
    pub triangle_count: usize,
    pub quad_count: usize,
    /// Faces with more than four vertices
    pub polygon_count: usize,
    pub group_count: usize,
}

/// Parsed OBJ document
#[derive(Debug, Clone, Default)]
pub struct ObjDocument {
    /// One buffer per [`VertexChannel`]
    channels: [Vec<Vertex>; 4],
    /// Resolved 0-based vertex offsets
    indices: Vec<usize>,
    /// Entity directory: primitive id == position
    primitives: Vec<Primitive>,
    groups: Vec<Group>,
    group_index: GroupIndex,
}

impl ObjDocument {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Insertion

    /// Append a vertex to its channel, returning its 0-based offset
    pub(crate) fn insert_vertex(&mut self, channel: VertexChannel, vertex: Vertex) -> usize {
        let buffer = &mut self.channels[channel.slot()];
        buffer.push(vertex);
        buffer.len() - 1
    }

    /// Append resolved offsets to the index buffer, returning the start position
    pub(crate) fn extend_indices(&mut self, resolved: &[usize]) -> usize {
        let start = self.indices.len();
        self.indices.extend_from_slice(resolved);
        start
    }

    /// Register a primitive in the entity directory
    pub(crate) fn insert_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    /// Insert a group unless one with the same identity already exists.
    ///
    /// Returns the group id and whether it was newly created.
    pub(crate) fn insert_group(&mut self, group: Group) -> (GroupId, bool) {
        if let Some(&id) = self.group_index.get(group.key()) {
            return (id, false);
        }
        let id = self.groups.len();
        self.group_index.insert(group.key().clone(), id);
        self.groups.push(group);
        (id, true)
    }

    #[inline]
    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    /// Pre-allocate index capacity for the next wave of primitives
    pub(crate) fn reserve_index_capacity(&mut self) {
        let hint: usize = self.channels.iter().map(Vec::len).sum();
        self.indices.reserve(hint);
    }

    // ---------------------------------------------------------------------
    // Lookup

    /// Vertex at `index` in `channel`
    #[inline]
    pub fn vertex(&self, channel: VertexChannel, index: usize) -> Option<&Vertex> {
        self.channels[channel.slot()].get(index)
    }

    /// Primitive by directory id
    #[inline]
    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id)
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Group id by identity
    #[inline]
    pub fn find_group(&self, key: &GroupKey) -> Option<GroupId> {
        self.group_index.get(key).copied()
    }

    /// Name group (`g`) id by name
    pub fn find_named_group(&self, name: &str) -> Option<GroupId> {
        self.find_group(&GroupKey::Name(name.to_string()))
    }

    /// Resolve any entity handle
    pub fn entity(&self, entity: EntityRef) -> Option<Entity<'_>> {
        match entity {
            EntityRef::Vertex(channel, index) => self.vertex(channel, index).map(Entity::Vertex),
            EntityRef::Primitive(id) => self.primitive(id).map(Entity::Primitive),
            EntityRef::Group(id) => self.group(id).map(Entity::Group),
        }
    }

    /// Raw resolved indices of a primitive
    #[inline]
    pub fn indices_of(&self, primitive: &Primitive) -> Option<&[usize]> {
        self.indices.get(primitive.index_range())
    }

    /// Vertices of a primitive as one flat list in tuple order
    ///
    /// Channels cycle per the primitive's layout, one full cycle per tuple
    /// (e.g. position, normal, position, normal, ... for `v//vn`), so the
    /// list holds `tuple_count() * layout.arity()` entries. Use
    /// [`tuples_for`](Self::tuples_for) for one entry per tuple.
    /// Returns `None` if any index falls outside its channel.
    pub fn vertices_for(&self, primitive: &Primitive) -> Option<Vec<TupleVertex<'_>>> {
        let indices = self.indices_of(primitive)?;
        let channels = primitive.layout.channels();

        indices
            .iter()
            .zip(channels.iter().cycle())
            .map(|(&index, &channel)| {
                self.vertex(channel, index).map(|vertex| TupleVertex {
                    channel,
                    index,
                    vertex,
                })
            })
            .collect()
    }

    /// Vertices of a primitive grouped per tuple, `tuple_count()` entries
    pub fn tuples_for(&self, primitive: &Primitive) -> Option<Vec<SmallVec<[TupleVertex<'_>; 3]>>> {
        let vertices = self.vertices_for(primitive)?;
        Some(
            vertices
                .chunks(primitive.layout.arity())
                .map(SmallVec::from_slice)
                .collect(),
        )
    }

    /// Position vertices of a primitive, one per tuple
    pub fn positions_for(&self, primitive: &Primitive) -> Option<Vec<&Vertex>> {
        let indices = self.indices_of(primitive)?;
        indices
            .iter()
            .step_by(primitive.layout.arity())
            .map(|&index| self.vertex(VertexChannel::Position, index))
            .collect()
    }

    /// Directory ids covered by a group, range order then insertion order.
    /// Range bounds past the directory are clipped.
    pub fn entity_ids_in_group<'a>(
        &'a self,
        group: &'a Group,
    ) -> impl Iterator<Item = PrimitiveId> + 'a {
        let len = self.primitives.len();
        group
            .ranges()
            .iter()
            .flat_map(move |range| range.start.min(len)..range.end.min(len))
    }

    /// Entities covered by a group, range order then insertion order
    pub fn entities_in_group(&self, group: &Group) -> Vec<&Primitive> {
        self.entity_ids_in_group(group)
            .filter_map(|id| self.primitives.get(id))
            .collect()
    }

    /// Groups whose ranges contain a primitive
    pub fn groups_of(&self, id: PrimitiveId) -> impl Iterator<Item = (GroupId, &Group)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter(move |(_, g)| g.ranges().iter().any(|r| r.contains(&id)))
    }

    // ---------------------------------------------------------------------
    // Collections

    #[inline]
    pub fn channel(&self, channel: VertexChannel) -> &[Vertex] {
        &self.channels[channel.slot()]
    }

    #[inline]
    pub fn channel_len(&self, channel: VertexChannel) -> usize {
        self.channels[channel.slot()].len()
    }

    #[inline]
    pub fn positions(&self) -> &[Vertex] {
        self.channel(VertexChannel::Position)
    }

    #[inline]
    pub fn texture_coords(&self) -> &[Vertex] {
        self.channel(VertexChannel::Texture)
    }

    #[inline]
    pub fn normals(&self) -> &[Vertex] {
        self.channel(VertexChannel::Normal)
    }

    #[inline]
    pub fn parameter_vertices(&self) -> &[Vertex] {
        self.channel(VertexChannel::Parameter)
    }

    /// The index buffer
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[cfg(test)]
    pub(crate) fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// All directory entries in id order
    #[inline]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Size of the entity directory
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.primitives.len()
    }

    /// Directory entries as `(id, primitive)` pairs
    pub fn entities(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives.iter().enumerate()
    }

    pub fn faces(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.of_kind(PrimitiveKind::Face)
    }

    pub fn lines(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.of_kind(PrimitiveKind::Line)
    }

    pub fn points(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.of_kind(PrimitiveKind::Point)
    }

    fn of_kind(&self, kind: PrimitiveKind) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.entities().filter(move |(_, p)| p.kind == kind)
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.channels.iter().all(Vec::is_empty)
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            position_count: self.channel_len(VertexChannel::Position),
            texture_count: self.channel_len(VertexChannel::Texture),
            normal_count: self.channel_len(VertexChannel::Normal),
            parameter_count: self.channel_len(VertexChannel::Parameter),
            index_count: self.indices.len(),
            group_count: self.groups.len(),
            ..Default::default()
        };

        for primitive in &self.primitives {
            match primitive.kind {
                PrimitiveKind::Point => stats.point_count += 1,
                PrimitiveKind::Line => stats.line_count += 1,
                PrimitiveKind::Face => {
                    stats.face_count += 1;
                    match primitive.tuple_count() {
                        3 => stats.triangle_count += 1,
                        4 => stats.quad_count += 1,
                        n if n > 4 => stats.polygon_count += 1,
                        _ => {}
                    }
                }
            }
        }

        stats
    }
}
