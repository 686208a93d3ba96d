// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ entities
//!
//! Plain data records stored by [`ObjDocument`](crate::ObjDocument). Nothing
//! here holds a reference into another buffer: primitives address the index
//! buffer by `[start, start + count)` and groups address the entity directory
//! by id ranges, so storage can grow freely while parsing.

use std::fmt;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Directory-wide id of a point set, polyline or face
pub type PrimitiveId = usize;

/// Id of a group in the document's group table
pub type GroupId = usize;

/// Four component vertex record shared by every vertex channel
///
/// Texture and normal records reuse the same shape positionally
/// (`u, v, w` and `i, j, k`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Weight for rational curves and surfaces
    pub w: f32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Build a vertex from up to four positional components.
    /// Missing trailing components keep their defaults (z = 0, w = 1).
    pub fn from_components(components: &[f32]) -> Self {
        let mut vertex = Self::default();
        let slots = [&mut vertex.x, &mut vertex.y, &mut vertex.z, &mut vertex.w];
        for (slot, value) in slots.into_iter().zip(components) {
            *slot = *value;
        }
        vertex
    }

    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// Vertex attribute channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VertexChannel {
    /// `v`
    Position,
    /// `vt`
    Texture,
    /// `vn`
    Normal,
    /// `vp`
    Parameter,
}

impl VertexChannel {
    pub const ALL: [VertexChannel; 4] = [
        VertexChannel::Position,
        VertexChannel::Texture,
        VertexChannel::Normal,
        VertexChannel::Parameter,
    ];

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            VertexChannel::Position => 0,
            VertexChannel::Texture => 1,
            VertexChannel::Normal => 2,
            VertexChannel::Parameter => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VertexChannel::Position => "position",
            VertexChannel::Texture => "texture",
            VertexChannel::Normal => "normal",
            VertexChannel::Parameter => "parameter",
        }
    }
}

impl fmt::Display for VertexChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channels a vertex tuple references, inferred from its slash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexLayout {
    /// `v`
    Geometry,
    /// `v/vt`
    GeometryTexture,
    /// `v//vn`
    GeometryNormal,
    /// `v/vt/vn`
    GeometryTextureNormal,
}

impl IndexLayout {
    /// Channels addressed by one tuple, in source order
    pub fn channels(self) -> &'static [VertexChannel] {
        use VertexChannel::*;
        match self {
            IndexLayout::Geometry => &[Position],
            IndexLayout::GeometryTexture => &[Position, Texture],
            IndexLayout::GeometryNormal => &[Position, Normal],
            IndexLayout::GeometryTextureNormal => &[Position, Texture, Normal],
        }
    }

    /// Number of indices per tuple
    #[inline]
    pub fn arity(self) -> usize {
        self.channels().len()
    }

    #[inline]
    pub fn has_texture(self) -> bool {
        matches!(
            self,
            IndexLayout::GeometryTexture | IndexLayout::GeometryTextureNormal
        )
    }

    #[inline]
    pub fn has_normal(self) -> bool {
        matches!(
            self,
            IndexLayout::GeometryNormal | IndexLayout::GeometryTextureNormal
        )
    }
}

/// Vertex-based element kinds kept in the entity directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimitiveKind {
    /// `p`
    Point,
    /// `l`
    Line,
    /// `f`
    Face,
}

impl PrimitiveKind {
    /// Minimum number of vertex tuples a record needs
    pub fn min_tuples(self) -> usize {
        match self {
            PrimitiveKind::Point => 1,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Face => 3,
        }
    }

    /// Whether a tuple layout is legal for this kind
    pub fn accepts(self, layout: IndexLayout) -> bool {
        match self {
            PrimitiveKind::Point => layout == IndexLayout::Geometry,
            PrimitiveKind::Line => !layout.has_normal(),
            PrimitiveKind::Face => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Point => "point",
            PrimitiveKind::Line => "line",
            PrimitiveKind::Face => "face",
        }
    }
}

/// Point set, polyline or face: a range of the index buffer plus its layout
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Primitive {
    pub kind: PrimitiveKind,
    /// First index in the index buffer
    pub start: usize,
    /// Number of indices (tuples * layout arity)
    pub count: usize,
    pub layout: IndexLayout,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, start: usize, count: usize, layout: IndexLayout) -> Self {
        Self {
            kind,
            start,
            count,
            layout,
        }
    }

    /// Index buffer range covered by this primitive
    #[inline]
    pub fn index_range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }

    /// Number of vertex tuples
    #[inline]
    pub fn tuple_count(&self) -> usize {
        self.count / self.layout.arity()
    }

    #[inline]
    pub fn is_face(&self) -> bool {
        self.kind == PrimitiveKind::Face
    }

    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.is_face() && self.tuple_count() == 3
    }

    #[inline]
    pub fn is_quad(&self) -> bool {
        self.is_face() && self.tuple_count() == 4
    }

    #[inline]
    pub fn has_texture(&self) -> bool {
        self.layout.has_texture()
    }

    #[inline]
    pub fn has_normal(&self) -> bool {
        self.layout.has_normal()
    }
}

/// Group kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroupKind {
    /// `g`
    Name,
    /// `o`
    Object,
    /// `s`
    Smoothing,
    /// `mg`
    Merging,
}

/// Group identity. Two declarations with equal keys denote the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroupKey {
    Name(String),
    Object(String),
    Smoothing(u32),
    Merging(u32),
}

impl GroupKey {
    pub fn kind(&self) -> GroupKind {
        match self {
            GroupKey::Name(_) => GroupKind::Name,
            GroupKey::Object(_) => GroupKind::Object,
            GroupKey::Smoothing(_) => GroupKind::Smoothing,
            GroupKey::Merging(_) => GroupKind::Merging,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Name(name) => write!(f, "g {}", name),
            GroupKey::Object(name) => write!(f, "o {}", name),
            GroupKey::Smoothing(number) => write!(f, "s {}", number),
            GroupKey::Merging(number) => write!(f, "mg {}", number),
        }
    }
}

/// Named or numbered grouping of directory entities
///
/// Membership is a list of `[start, end)` ranges of primitive ids. A group
/// that is closed and later re-declared gets a new range appended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    key: GroupKey,
    /// Merge resolution, `mg` only
    resolution: Option<u32>,
    ranges: Vec<Range<usize>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pending: Option<usize>,
}

impl Group {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            resolution: None,
            ranges: Vec::new(),
            pending: None,
        }
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        if self.key.kind() == GroupKind::Merging {
            self.resolution = Some(resolution);
        }
        self
    }

    #[inline]
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> GroupKind {
        self.key.kind()
    }

    /// Name of a `g` or `o` group
    pub fn name(&self) -> Option<&str> {
        match &self.key {
            GroupKey::Name(name) | GroupKey::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Number of an `s` or `mg` group
    pub fn number(&self) -> Option<u32> {
        match self.key {
            GroupKey::Smoothing(number) | GroupKey::Merging(number) => Some(number),
            _ => None,
        }
    }

    #[inline]
    pub fn resolution(&self) -> Option<u32> {
        self.resolution
    }

    /// Closed membership ranges, in the order they were opened
    #[inline]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether a range is currently open
    #[inline]
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Total number of member entities over all ranges
    pub fn member_count(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    /// Replace the merge resolution of an `mg` group
    pub(crate) fn set_resolution(&mut self, resolution: u32) {
        if self.kind() == GroupKind::Merging {
            self.resolution = Some(resolution);
        }
    }

    pub(crate) fn open_range(&mut self, start: usize) {
        if self.pending.is_none() {
            self.pending = Some(start);
        }
    }

    pub(crate) fn close_range(&mut self, end: usize) {
        if let Some(start) = self.pending.take() {
            self.ranges.push(start..end.max(start));
        }
    }
}

/// Typed handle to any stored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityRef {
    Vertex(VertexChannel, usize),
    Primitive(PrimitiveId),
    Group(GroupId),
}

/// Borrowed entity resolved from an [`EntityRef`]
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Vertex(&'a Vertex),
    Primitive(&'a Primitive),
    Group(&'a Group),
}

impl<'a> Entity<'a> {
    pub fn as_vertex(&self) -> Option<&'a Vertex> {
        match self {
            Entity::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&'a Primitive> {
        match self {
            Entity::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&'a Group> {
        match self {
            Entity::Group(g) => Some(g),
            _ => None,
        }
    }
}
