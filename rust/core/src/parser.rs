// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ document parser
//!
//! Single pass over logical lines. Each line is classified, then handed to
//! the vertex, primitive or grouping builder. Relative face indices are
//! resolved against the channel sizes at the moment the line is read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};

use crate::config::{MalformedPolicy, ParserConfig, DEFAULT_GROUP_NAME};
use crate::document::ObjDocument;
use crate::entity::{
    Group, GroupId, GroupKey, Primitive, PrimitiveKind, Vertex, VertexChannel,
};
use crate::error::{Error, Result};
use crate::groups::GroupTracker;
use crate::lexer::{self, ElementKind, LineClass};

/// Parse an OBJ file with the default configuration
pub fn parse_file(path: impl AsRef<Path>) -> Result<ObjDocument> {
    parse_file_with_config(path, ParserConfig::default())
}

/// Parse an OBJ file
///
/// The file is opened and checked before any parser state exists, so a
/// missing or unreadable file fails with [`Error::FileAccess`] up front.
pub fn parse_file_with_config(path: impl AsRef<Path>, config: ParserConfig) -> Result<ObjDocument> {
    let path = path.as_ref();
    let file_error = |source: std::io::Error| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(file_error)?;
    let metadata = file.metadata().map_err(file_error)?;
    if !metadata.is_file() {
        return Err(file_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    info!(path = %path.display(), size = metadata.len(), "Starting OBJ parsing");
    parse_reader_with_config(BufReader::new(file), config)
}

/// Parse OBJ text held in memory
pub fn parse_str(content: &str) -> Result<ObjDocument> {
    parse_str_with_config(content, ParserConfig::default())
}

pub fn parse_str_with_config(content: &str, config: ParserConfig) -> Result<ObjDocument> {
    parse_reader_with_config(content.as_bytes(), config)
}

pub fn parse_reader<R: BufRead>(reader: R) -> Result<ObjDocument> {
    parse_reader_with_config(reader, ParserConfig::default())
}

/// Parse OBJ text from any buffered reader
pub fn parse_reader_with_config<R: BufRead>(reader: R, config: ParserConfig) -> Result<ObjDocument> {
    let started = Instant::now();

    let mut parser = ObjParser::with_config(config);
    let mut lines = LogicalLines::new(reader);
    while let Some((line, text)) = lines.next_line()? {
        parser.parse_line(line, text)?;
    }
    let document = parser.finish();

    let stats = document.stats();
    info!(
        lines = lines.physical_lines(),
        vertices = stats.position_count,
        faces = stats.face_count,
        groups = stats.group_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "OBJ parsing complete"
    );
    Ok(document)
}

/// Joins physical lines ending in `\` into one logical line
///
/// Lines are read as raw bytes and decoded lossily, so stray Latin-1 bytes
/// in comments or names become U+FFFD instead of failing the read.
pub struct LogicalLines<R> {
    reader: R,
    raw: Vec<u8>,
    buffer: String,
    line: usize,
}

impl<R: BufRead> LogicalLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            raw: Vec::with_capacity(256),
            buffer: String::with_capacity(1024),
            line: 0,
        }
    }

    /// Next logical line and the number of its first physical line
    ///
    /// The continuation marker is replaced by a blank. A marker on the
    /// last line of input is kept as a blank too.
    pub fn next_line(&mut self) -> Result<Option<(usize, &str)>> {
        self.buffer.clear();
        let first_line = self.line + 1;
        let mut consumed = false;

        loop {
            self.raw.clear();
            if self.reader.read_until(b'\n', &mut self.raw)? == 0 {
                break;
            }
            consumed = true;
            self.line += 1;
            self.buffer.push_str(&String::from_utf8_lossy(&self.raw));

            let content_len = self.buffer.trim_end().len();
            self.buffer.truncate(content_len);
            if !self.buffer.ends_with('\\') {
                break;
            }
            self.buffer.pop();
            self.buffer.push(' ');
        }

        Ok(consumed.then_some((first_line, self.buffer.as_str())))
    }

    /// Physical lines read so far
    pub fn physical_lines(&self) -> usize {
        self.line
    }
}

/// Incremental OBJ parser
///
/// Owns the document under construction plus the little rolling state the
/// grammar needs: the previous element kind and the open groups. Feed it
/// logical lines with [`parse_line`](Self::parse_line), then call
/// [`finish`](Self::finish).
pub struct ObjParser {
    config: ParserConfig,
    document: ObjDocument,
    groups: GroupTracker,
    last_kind: Option<ElementKind>,
}

impl Default for ObjParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let mut document = ObjDocument::new();
        let mut groups = GroupTracker::new();

        if let Some(name) = &config.default_group {
            groups.open(&mut document, GroupKey::Name(name.clone()));
        }

        Self {
            config,
            document,
            groups,
            last_kind: None,
        }
    }

    /// Document built so far
    #[inline]
    pub fn document(&self) -> &ObjDocument {
        &self.document
    }

    #[inline]
    pub fn open_groups(&self) -> &[GroupId] {
        self.groups.open_groups()
    }

    /// Close any open group ranges and hand over the finished document
    pub fn finish(mut self) -> ObjDocument {
        self.groups.finish(&mut self.document);
        self.document
    }

    /// Parse one logical line (continuations already joined)
    pub fn parse_line(&mut self, line: usize, text: &str) -> Result<()> {
        let (kind, args) = match lexer::classify(text) {
            LineClass::Blank | LineClass::Comment => return Ok(()),
            LineClass::Unknown(keyword) => {
                trace!(line, keyword, "Unknown keyword skipped");
                return Ok(());
            }
            LineClass::Element(kind, args) => (kind, args),
        };

        self.track_transition(kind);

        match self.dispatch(line, kind, args) {
            Err(error)
                if error.is_recoverable() && self.config.on_malformed == MalformedPolicy::Skip =>
            {
                warn!(line, keyword = kind.keyword(), %error, "Skipping malformed record");
                Ok(())
            }
            result => result,
        }
    }

    /// Reserve index capacity when a run of vertex statements ends
    fn track_transition(&mut self, kind: ElementKind) {
        if let Some(last) = self.last_kind {
            if self.config.reserve_index_capacity && last.is_vertex() && !kind.is_vertex() {
                self.document.reserve_index_capacity();
            }
        }
        self.last_kind = Some(kind);
    }

    fn dispatch(&mut self, line: usize, kind: ElementKind, args: &str) -> Result<()> {
        if let Some(channel) = kind.vertex_channel() {
            return self.parse_vertex(line, kind, channel, args);
        }
        if let Some(primitive) = kind.primitive_kind() {
            return self.parse_primitive(line, kind, primitive, args);
        }
        if kind.is_grouping() {
            return self.parse_grouping(line, kind, args);
        }

        debug!(line, keyword = kind.keyword(), "Unsupported statement skipped");
        Ok(())
    }

    /// `v x y [z [w]]`, `vt u [v [w]]`, `vn i j [k]`, `vp u [v [w]]`
    fn parse_vertex(
        &mut self,
        line: usize,
        kind: ElementKind,
        channel: VertexChannel,
        args: &str,
    ) -> Result<()> {
        let required = match channel {
            VertexChannel::Position | VertexChannel::Normal => 2,
            VertexChannel::Texture | VertexChannel::Parameter => 1,
        };

        // Values past the fourth (e.g. per-vertex colors) are ignored
        let mut components: SmallVec<[f32; 4]> = SmallVec::new();
        for token in lexer::fields(args).take(4) {
            let value = lexer::parse_float(token).ok_or_else(|| Error::InvalidNumber {
                line,
                token: token.to_string(),
            })?;
            components.push(value);
        }

        if components.len() < required {
            return Err(Error::MissingField {
                line,
                keyword: kind.keyword(),
                expected: required,
                found: components.len(),
            });
        }

        let index = self
            .document
            .insert_vertex(channel, Vertex::from_components(&components));
        trace!(line, %channel, index, "Vertex");
        Ok(())
    }

    /// `p`, `l` and `f` records
    fn parse_primitive(
        &mut self,
        line: usize,
        kind: ElementKind,
        primitive: PrimitiveKind,
        args: &str,
    ) -> Result<()> {
        let mut tuples = lexer::fields(args).peekable();
        let first = match tuples.peek() {
            Some(first) => *first,
            None => {
                return Err(Error::MissingField {
                    line,
                    keyword: kind.keyword(),
                    expected: primitive.min_tuples(),
                    found: 0,
                })
            }
        };

        // The first tuple fixes the layout for the whole record
        let layout = lexer::index_layout(first)
            .filter(|layout| primitive.accepts(*layout))
            .ok_or_else(|| Error::UnsupportedIndexLayout {
                line,
                tuple: first.to_string(),
            })?;
        let channels = layout.channels();

        let mut resolved: SmallVec<[usize; 16]> = SmallVec::new();
        let mut tuple_count = 0;
        for tuple in tuples {
            if lexer::index_layout(tuple) != Some(layout) {
                return Err(Error::structure(
                    line,
                    format!("vertex tuple {:?} does not match layout of {:?}", tuple, first),
                ));
            }

            let tokens: SmallVec<[&str; 3]> = lexer::index_tokens(tuple).collect();
            if tokens.len() != channels.len() {
                return Err(Error::structure(
                    line,
                    format!("incomplete vertex tuple {:?}", tuple),
                ));
            }

            for (token, &channel) in tokens.iter().zip(channels) {
                let value = lexer::parse_int(token).ok_or_else(|| Error::InvalidNumber {
                    line,
                    token: token.to_string(),
                })?;
                resolved.push(self.resolve_index(line, channel, value)?);
            }
            tuple_count += 1;
        }

        if tuple_count < primitive.min_tuples() {
            return Err(Error::MissingField {
                line,
                keyword: kind.keyword(),
                expected: primitive.min_tuples(),
                found: tuple_count,
            });
        }

        let start = self.document.extend_indices(&resolved);
        let id = self
            .document
            .insert_primitive(Primitive::new(primitive, start, resolved.len(), layout));
        trace!(line, id, kind = primitive.as_str(), tuples = tuple_count, ?layout, "Primitive");
        Ok(())
    }

    /// Turn a source index into a 0-based channel offset
    ///
    /// Positive values are 1-based; negative values count back from the
    /// channel's current end (`-1` is the most recent vertex). Zero and
    /// anything outside the channel as it stands now are errors.
    fn resolve_index(&self, line: usize, channel: VertexChannel, value: i64) -> Result<usize> {
        let size = self.document.channel_len(channel);
        let resolved = match value {
            v if v > 0 => v - 1,
            v if v < 0 => size as i64 + v,
            _ => -1,
        };

        usize::try_from(resolved)
            .ok()
            .filter(|&index| index < size)
            .ok_or(Error::IndexOutOfBounds {
                line,
                channel,
                index: value,
                size,
            })
    }

    /// `g`, `o`, `s` and `mg` records
    ///
    /// Arguments are validated first; only then is the open set closed and
    /// replaced, so a rejected line leaves the groups untouched.
    fn parse_grouping(&mut self, line: usize, kind: ElementKind, args: &str) -> Result<()> {
        let mut opened: SmallVec<[Group; 4]> = SmallVec::new();

        match kind {
            ElementKind::Group => {
                opened.extend(
                    lexer::fields(args).map(|name| Group::new(GroupKey::Name(name.to_string()))),
                );
                if opened.is_empty() {
                    let name = self
                        .config
                        .default_group
                        .clone()
                        .unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string());
                    opened.push(Group::new(GroupKey::Name(name)));
                }
            }
            ElementKind::Object => {
                if args.is_empty() {
                    return Err(Error::MissingField {
                        line,
                        keyword: kind.keyword(),
                        expected: 1,
                        found: 0,
                    });
                }
                opened.push(Group::new(GroupKey::Object(args.to_string())));
            }
            ElementKind::Smoothing => {
                if let Some(number) = group_number(line, kind, lexer::fields(args).next())? {
                    opened.push(Group::new(GroupKey::Smoothing(number)));
                }
            }
            ElementKind::Merging => {
                let mut fields = lexer::fields(args);
                if let Some(number) = group_number(line, kind, fields.next())? {
                    let resolution = match fields.next() {
                        Some(token) => lexer::parse_uint(token).ok_or_else(|| {
                            Error::InvalidNumber {
                                line,
                                token: token.to_string(),
                            }
                        })?,
                        None => 0,
                    };
                    opened.push(Group::new(GroupKey::Merging(number)).with_resolution(resolution));
                }
            }
            _ => return Ok(()),
        }

        self.groups.close_all(&mut self.document);
        for group in opened {
            self.groups.open_group(&mut self.document, group);
        }
        Ok(())
    }
}

/// Group number of an `s`/`mg` record; `None` for `off` and `0`
fn group_number(line: usize, kind: ElementKind, token: Option<&str>) -> Result<Option<u32>> {
    let token = token.ok_or(Error::MissingField {
        line,
        keyword: kind.keyword(),
        expected: 1,
        found: 0,
    })?;
    if token == "off" {
        return Ok(None);
    }

    match lexer::parse_uint(token) {
        Some(0) => Ok(None),
        Some(number) => Ok(Some(number)),
        None => Err(Error::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GroupKind, IndexLayout};
    use approx::assert_relative_eq;

    fn parse(content: &str) -> ObjDocument {
        parse_str(content).unwrap()
    }

    #[test]
    fn test_vertex_components() {
        let doc = parse("v 1.5 -2 3.25\nv 1 2\nv 1 2 3 0.5\nvt 0.25\nvn 0 0 1\nvp 0.5 0.5\n");

        assert_eq!(doc.positions().len(), 3);
        let v = doc.positions()[0];
        assert_relative_eq!(v.x, 1.5);
        assert_relative_eq!(v.y, -2.0);
        assert_relative_eq!(v.z, 3.25);
        assert_relative_eq!(v.w, 1.0);

        assert_eq!(doc.positions()[1].to_array(), [1.0, 2.0, 0.0, 1.0]);
        assert_relative_eq!(doc.positions()[2].w, 0.5);
        assert_eq!(doc.texture_coords()[0].to_array(), [0.25, 0.0, 0.0, 1.0]);
        assert_relative_eq!(doc.normals()[0].z, 1.0);
        assert_eq!(doc.parameter_vertices().len(), 1);
    }

    #[test]
    fn test_vertex_colors_ignored() {
        let doc = parse("v 1 2 3 0.1 0.2 0.3\n");
        assert_eq!(doc.positions()[0].to_array(), [1.0, 2.0, 3.0, 0.1]);
    }

    #[test]
    fn test_malformed_vertex_is_fatal() {
        let err = parse_str("v 1 2 3\nv 1.0 abc 2\n").unwrap_err();
        match err {
            Error::InvalidNumber { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse_str("v 1\n").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                line: 1,
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_face_layouts() {
        let content = "\
v 0 0 0
v 1 0 0
v 1 1 0
vt 0 0
vt 1 0
vt 1 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
f 1 2 3
f 1/1 2/2 3/3
f 1//1 2//2 3//3
f 1/1/1 2/2/2 3/3/3
";
        let doc = parse(content);
        let layouts: Vec<IndexLayout> = doc.faces().map(|(_, f)| f.layout).collect();
        assert_eq!(
            layouts,
            vec![
                IndexLayout::Geometry,
                IndexLayout::GeometryTexture,
                IndexLayout::GeometryNormal,
                IndexLayout::GeometryTextureNormal,
            ]
        );
        assert!(doc.faces().all(|(_, f)| f.is_triangle()));
        assert_eq!(doc.index_count(), 3 + 6 + 6 + 9);
        assert_eq!(&doc.indices()[..3], &[0, 1, 2]);
    }

    #[test]
    fn test_triangle_and_quad() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 2 3 4\n");
        let faces: Vec<&Primitive> = doc.faces().map(|(_, f)| f).collect();
        assert!(faces[0].is_triangle());
        assert!(!faces[1].is_triangle());
        assert!(faces[1].is_quad());
        assert_eq!(faces[1].tuple_count(), 4);
    }

    #[test]
    fn test_relative_indices_use_current_size() {
        // -1 refers to the latest vertex at the time the face is read,
        // not at the end of the file
        let content = "\
v 0 0 0
v 1 0 0
v 2 0 0
f -3 -2 -1
v 3 0 0
v 4 0 0
f -3 -2 -1
";
        let doc = parse(content);
        let faces: Vec<&Primitive> = doc.faces().map(|(_, f)| f).collect();
        assert_eq!(doc.indices_of(faces[0]).unwrap(), &[0, 1, 2]);
        assert_eq!(doc.indices_of(faces[1]).unwrap(), &[2, 3, 4]);
    }

    #[test]
    fn test_relative_indices_per_channel() {
        let content = "\
v 0 0 0
v 1 0 0
v 2 0 0
vt 0 0
vt 0.5 0
vt 1 0
vn 1 0 0
vn 0 1 0
vn 0 0 1
f 1/1/1 2/2/2 -1/-1/-1
";
        let doc = parse(content);
        let (_, face) = doc.faces().next().unwrap();
        assert_eq!(doc.indices_of(face).unwrap(), &[0, 0, 0, 1, 1, 1, 2, 2, 2]);

        let verts = doc.vertices_for(face).unwrap();
        assert_eq!(verts.len(), 9);
        assert_relative_eq!(verts[6].vertex.x, 2.0);
        assert_eq!(verts[7].channel, VertexChannel::Texture);
        assert_relative_eq!(verts[7].vertex.x, 1.0);
        assert_eq!(verts[8].channel, VertexChannel::Normal);
        assert_relative_eq!(verts[8].vertex.z, 1.0);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let err = parse_str("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfBounds {
                line: 3,
                channel: VertexChannel::Position,
                index: 3,
                size: 2
            }
        ));

        let err = parse_str("v 0 0 0\nf -2 1 1\n").unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: -2, .. }));

        let err = parse_str("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 0, .. }));

        // Texture channel is empty
        let err = parse_str("v 0 0 0\nf 1/1 1/1 1/1\n").unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfBounds {
                channel: VertexChannel::Texture,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_face_structure() {
        let tri = "v 0 0 0\nv 1 0 0\nv 1 1 0\n";

        let err = parse_str(&format!("{}f 1/1/1/1 2 3\n", tri)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedIndexLayout { line: 4, .. }));

        let err = parse_str(&format!("{}f 1 2/2 3\n", tri)).unwrap_err();
        assert!(matches!(err, Error::Structure { line: 4, .. }));

        let err = parse_str(&format!("{}f 1 2\n", tri)).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                expected: 3,
                found: 2,
                ..
            }
        ));

        let err = parse_str(&format!("{}f 1 x 3\n", tri)).unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { .. }));
    }

    #[test]
    fn test_points_and_lines() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1 1\np 1 2 3\nl 1/1 2/2\n");
        assert_eq!(doc.points().count(), 1);
        assert_eq!(doc.lines().count(), 1);

        let (_, line) = doc.lines().next().unwrap();
        assert_eq!(line.layout, IndexLayout::GeometryTexture);
        assert_eq!(line.tuple_count(), 2);

        // Points carry geometry only, lines never carry normals
        assert!(parse_str("v 0 0 0\nvt 0 0\np 1/1\n").is_err());
        assert!(parse_str("v 0 0 0\nvn 0 0 1\nl 1//1 1//1\n").is_err());
    }

    #[test]
    fn test_default_group_holds_faces() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\nf 3 2 1\n");
        assert_eq!(doc.group_count(), 1);
        let group = doc.group(0).unwrap();
        assert_eq!(group.name(), Some("default"));
        assert_eq!(group.ranges(), &[0..2]);
        assert_eq!(doc.entities_in_group(group).len(), 2);
    }

    #[test]
    fn test_no_default_group() {
        let config = ParserConfig::new().without_default_group();
        let doc = parse_str_with_config("v 0 0 0\np 1\n", config).unwrap();
        assert_eq!(doc.group_count(), 0);
        assert_eq!(doc.entity_count(), 1);
    }

    #[test]
    fn test_group_reopen_reuses_entity() {
        let content = "\
v 0 0 0
v 1 0 0
v 1 1 0
g A B
f 1 2 3
f 1 2 3
g C
f 1 2 3
g A
f 1 2 3
";
        let doc = parse(content);
        // default, A, B, C
        assert_eq!(doc.group_count(), 4);

        let a = doc.find_named_group("A").unwrap();
        let b = doc.find_named_group("B").unwrap();
        let c = doc.find_named_group("C").unwrap();
        assert_eq!(doc.group(a).unwrap().ranges(), &[0..2, 3..4]);
        assert_eq!(doc.group(b).unwrap().ranges(), &[0..2]);
        assert_eq!(doc.group(c).unwrap().ranges(), &[2..3]);
        assert_eq!(doc.group(0).unwrap().ranges(), &[0..0]);

        let ids: Vec<usize> = doc.entity_ids_in_group(doc.group(a).unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 3]);
    }

    #[test]
    fn test_smoothing_and_merging() {
        let content = "\
v 0 0 0
v 1 0 0
v 1 1 0
s 1
f 1 2 3
s off
f 1 2 3
s 1
f 1 2 3
mg 2 5
f 1 2 3
mg 0
f 1 2 3
s 0
";
        let doc = parse(content);
        let s1 = doc.find_group(&GroupKey::Smoothing(1)).unwrap();
        let smoothing = doc.group(s1).unwrap();
        assert_eq!(smoothing.kind(), GroupKind::Smoothing);
        assert_eq!(smoothing.ranges(), &[0..1, 2..3]);

        let mg = doc.group(doc.find_group(&GroupKey::Merging(2)).unwrap()).unwrap();
        assert_eq!(mg.resolution(), Some(5));
        assert_eq!(mg.ranges(), &[3..4]);

        // Faces after `s off` and `mg 0` belong to no group
        assert_eq!(doc.groups_of(1).count(), 0);
        assert_eq!(doc.groups_of(4).count(), 0);
    }

    #[test]
    fn test_merging_default_resolution() {
        let doc = parse("mg 3\n");
        let mg = doc.group(doc.find_group(&GroupKey::Merging(3)).unwrap()).unwrap();
        assert_eq!(mg.resolution(), Some(0));
    }

    #[test]
    fn test_object_name() {
        let doc = parse("o my object\nv 0 0 0\np 1\n");
        let id = doc
            .find_group(&GroupKey::Object("my object".to_string()))
            .unwrap();
        assert_eq!(doc.group(id).unwrap().ranges(), &[0..1]);
    }

    #[test]
    fn test_bare_group_reopens_default() {
        let doc = parse("v 0 0 0\np 1\ng a\np 1\ng\np 1\n");
        assert_eq!(doc.group(0).unwrap().ranges(), &[0..1, 2..3]);
    }

    #[test]
    fn test_bad_group_line_keeps_open_set() {
        let mut parser = ObjParser::new();
        parser.parse_line(1, "g A").unwrap();
        let before = parser.open_groups().to_vec();
        assert!(parser.parse_line(2, "s abc").is_err());
        assert_eq!(parser.open_groups(), before.as_slice());
    }

    #[test]
    fn test_unknown_and_unsupported_skipped() {
        let content = "\
# comment
mtllib scene.mtl
usemtl red
foo bar baz
lod 2
cstype bspline
deg 3
curv 0 1 1 2
end
v 0 0 0
";
        let doc = parse(content);
        assert_eq!(doc.positions().len(), 1);
        assert_eq!(doc.entity_count(), 0);
    }

    #[test]
    fn test_line_continuation() {
        let content = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 \\\n 3 \\\n4\nv 5 5 5\n";
        let doc = parse(content);
        let (_, face) = doc.faces().next().unwrap();
        assert!(face.is_quad());
        assert_eq!(doc.positions().len(), 5);
    }

    #[test]
    fn test_logical_line_numbers() {
        let mut lines = LogicalLines::new("a \\\nb\r\n\nc\\".as_bytes());
        let (n, text) = lines.next_line().unwrap().unwrap();
        assert_eq!((n, text), (1, "a  b"));
        let (n, text) = lines.next_line().unwrap().unwrap();
        assert_eq!((n, text), (3, ""));
        let (n, text) = lines.next_line().unwrap().unwrap();
        assert_eq!((n, text), (4, "c "));
        assert!(lines.next_line().unwrap().is_none());
        assert_eq!(lines.physical_lines(), 4);
    }

    #[test]
    fn test_error_line_after_continuation() {
        let err = parse_str("v 0 \\\n0 0\nv x 0 0\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_skip_policy() {
        let content = "\
v 0 0 0
v 1 0 0
v 1 1 0
f 1 2 9
v bad 0 0
f 1 2 3
s nope
";
        let doc = parse_str_with_config(content, ParserConfig::lenient()).unwrap();
        assert_eq!(doc.positions().len(), 3);
        assert_eq!(doc.entity_count(), 1);
        assert_eq!(doc.index_count(), 3);
        assert_eq!(doc.indices_of(doc.primitive(0).unwrap()).unwrap(), &[0, 1, 2]);
        assert_eq!(doc.group(0).unwrap().ranges(), &[0..1]);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
        assert!(!err.is_recoverable());

        let err = parse_file(std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_index_reservation_after_vertices() {
        let mut parser = ObjParser::new();
        for n in 0..5 {
            parser.parse_line(n + 1, "v 0 0 0").unwrap();
        }
        parser.parse_line(6, "vt 0 0").unwrap();
        // Still inside the vertex run
        assert_eq!(parser.document().index_capacity(), 0);

        parser.parse_line(7, "g a").unwrap();
        assert!(parser.document().index_capacity() >= 6);

        parser.parse_line(8, "p 1 2").unwrap();
        let doc = parser.finish();
        assert_eq!(doc.indices(), &[0, 1]);
    }

    #[test]
    fn test_index_reservation_disabled() {
        let config = ParserConfig::new().with_index_reservation(false);
        let mut parser = ObjParser::with_config(config);
        for n in 0..5 {
            parser.parse_line(n + 1, "v 0 0 0").unwrap();
        }
        parser.parse_line(6, "g a").unwrap();
        assert_eq!(parser.document().index_capacity(), 0);
    }

    #[test]
    fn test_invalid_utf8_in_comment() {
        let content: &[u8] = b"v 0 0 0\nv 1 0 0\nv 1 1 0\n# caf\xE9\nf 1 2 3\n";
        let doc = parse_reader(content).unwrap();
        assert_eq!(doc.faces().count(), 1);

        let doc = parse_reader_with_config(content, ParserConfig::lenient()).unwrap();
        assert_eq!(doc.faces().count(), 1);
    }

    #[test]
    fn test_latin1_group_name() {
        let content: &[u8] = b"v 0 0 0\ng caf\xE9\np 1\n";
        let doc = parse_reader(content).unwrap();
        let id = doc.find_named_group("caf\u{FFFD}").unwrap();
        assert_eq!(doc.group(id).unwrap().ranges(), &[0..1]);
    }

    #[test]
    fn test_merging_resolution_updated_on_reuse() {
        let doc = parse("v 0 0 0\nmg 1 4\np 1\nmg 1 8\np 1\n");
        let mg = doc.group(doc.find_group(&GroupKey::Merging(1)).unwrap()).unwrap();
        assert_eq!(mg.resolution(), Some(8));
        assert_eq!(mg.ranges(), &[0..1, 1..2]);

        // A bare `mg 1` re-declaration resets to the default resolution
        let doc = parse("mg 1 4\nmg 1\n");
        let mg = doc.group(doc.find_group(&GroupKey::Merging(1)).unwrap()).unwrap();
        assert_eq!(mg.resolution(), Some(0));
    }
}
