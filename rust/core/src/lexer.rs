// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ line classifier
//!
//! Maps a logical line to its element kind and argument text, and provides
//! the small field-level helpers the parser needs (blank splitting, number
//! parsing, tuple layout detection).

use nom::{
    bytes::complete::take_till1, character::complete::space0, sequence::terminated, IResult,
};

use crate::entity::{IndexLayout, PrimitiveKind, VertexChannel};

/// Element kinds, one per OBJ keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    // Vertex data
    Vertex,
    TextureVertex,
    Normal,
    ParameterVertex,

    // Free-form curve/surface attributes
    Degree,
    BasisMatrix,
    StepSize,
    CurveType,

    // Elements
    Point,
    Line,
    Face,
    Curve,
    Curve2d,
    Surface,

    // Free-form curve/surface body statements
    Parameter,
    Trim,
    Hole,
    SpecialCurve,
    SpecialPoint,
    End,

    // Connectivity
    Connect,

    // Grouping
    Group,
    Smoothing,
    Merging,
    Object,

    // Display/render attributes
    Bevel,
    ColorInterpolation,
    DissolveInterpolation,
    LevelOfDetail,
    UseMaterial,
    MaterialLibrary,
    ShadowObject,
    TraceObject,
    CurveTechnique,
    SurfaceTechnique,
}

impl ElementKind {
    /// Look up a keyword in the fixed keyword table
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        use ElementKind::*;
        let kind = match keyword {
            "v" => Vertex,
            "vt" => TextureVertex,
            "vn" => Normal,
            "vp" => ParameterVertex,
            "deg" => Degree,
            "bmat" => BasisMatrix,
            "step" => StepSize,
            "cstype" => CurveType,
            "p" => Point,
            "l" => Line,
            // As of version 2.11 `fo` (face outline) is a synonym of `f`
            "f" | "fo" => Face,
            "curv" => Curve,
            "curv2" => Curve2d,
            "surf" => Surface,
            "parm" => Parameter,
            "trim" => Trim,
            "hole" => Hole,
            "scrv" => SpecialCurve,
            "sp" => SpecialPoint,
            "end" => End,
            "con" => Connect,
            "g" => Group,
            "s" => Smoothing,
            "mg" => Merging,
            "o" => Object,
            "bevel" => Bevel,
            "c_interp" => ColorInterpolation,
            "d_interp" => DissolveInterpolation,
            "lod" => LevelOfDetail,
            "usemtl" => UseMaterial,
            "mtllib" => MaterialLibrary,
            "shadow_obj" => ShadowObject,
            "trace_obj" => TraceObject,
            "ctech" => CurveTechnique,
            "stech" => SurfaceTechnique,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical keyword
    pub fn keyword(self) -> &'static str {
        use ElementKind::*;
        match self {
            Vertex => "v",
            TextureVertex => "vt",
            Normal => "vn",
            ParameterVertex => "vp",
            Degree => "deg",
            BasisMatrix => "bmat",
            StepSize => "step",
            CurveType => "cstype",
            Point => "p",
            Line => "l",
            Face => "f",
            Curve => "curv",
            Curve2d => "curv2",
            Surface => "surf",
            Parameter => "parm",
            Trim => "trim",
            Hole => "hole",
            SpecialCurve => "scrv",
            SpecialPoint => "sp",
            End => "end",
            Connect => "con",
            Group => "g",
            Smoothing => "s",
            Merging => "mg",
            Object => "o",
            Bevel => "bevel",
            ColorInterpolation => "c_interp",
            DissolveInterpolation => "d_interp",
            LevelOfDetail => "lod",
            UseMaterial => "usemtl",
            MaterialLibrary => "mtllib",
            ShadowObject => "shadow_obj",
            TraceObject => "trace_obj",
            CurveTechnique => "ctech",
            SurfaceTechnique => "stech",
        }
    }

    /// Channel a vertex statement feeds
    pub fn vertex_channel(self) -> Option<VertexChannel> {
        match self {
            ElementKind::Vertex => Some(VertexChannel::Position),
            ElementKind::TextureVertex => Some(VertexChannel::Texture),
            ElementKind::Normal => Some(VertexChannel::Normal),
            ElementKind::ParameterVertex => Some(VertexChannel::Parameter),
            _ => None,
        }
    }

    #[inline]
    pub fn is_vertex(self) -> bool {
        self.vertex_channel().is_some()
    }

    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        match self {
            ElementKind::Point => Some(PrimitiveKind::Point),
            ElementKind::Line => Some(PrimitiveKind::Line),
            ElementKind::Face => Some(PrimitiveKind::Face),
            _ => None,
        }
    }

    #[inline]
    pub fn is_grouping(self) -> bool {
        matches!(
            self,
            ElementKind::Group | ElementKind::Smoothing | ElementKind::Merging | ElementKind::Object
        )
    }
}

/// Classified logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    Blank,
    Comment,
    /// Keyword not in the table
    Unknown(&'a str),
    /// Known keyword and its blank-trimmed arguments
    Element(ElementKind, &'a str),
}

/// Space or tab
#[inline(always)]
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Remove surrounding whitespace, including stray `\r`
#[inline]
pub fn trim_blanks(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Blank separated fields
#[inline]
pub fn fields(args: &str) -> impl Iterator<Item = &str> {
    args.split(is_blank).filter(|s| !s.is_empty())
}

/// Leading keyword up to the first blank, plus trailing blanks
fn keyword(input: &str) -> IResult<&str, &str> {
    terminated(take_till1(is_blank), space0)(input)
}

/// Classify one logical line
pub fn classify(line: &str) -> LineClass<'_> {
    let line = trim_blanks(line);
    if line.is_empty() {
        return LineClass::Blank;
    }
    if line.starts_with('#') {
        return LineClass::Comment;
    }

    let Ok((rest, word)) = keyword(line) else {
        return LineClass::Blank;
    };

    match ElementKind::from_keyword(word) {
        Some(kind) => LineClass::Element(kind, trim_blanks(rest)),
        None => LineClass::Unknown(word),
    }
}

/// Infer the index layout from the slash pattern of one vertex tuple
///
/// `v` → geometry, `v/vt` → +texture, `v//vn` → +normal, `v/vt/vn` → all.
/// Anything else yields `None`.
pub fn index_layout(tuple: &str) -> Option<IndexLayout> {
    let bytes = tuple.as_bytes();
    if memchr::memmem::find(bytes, b"//").is_some() {
        // Only `a//b` is meaningful; `a//b/c` or `a///b` are not
        return (memchr::memchr_iter(b'/', bytes).count() == 2)
            .then_some(IndexLayout::GeometryNormal);
    }
    match memchr::memchr_iter(b'/', bytes).count() {
        0 => Some(IndexLayout::Geometry),
        1 => Some(IndexLayout::GeometryTexture),
        2 => Some(IndexLayout::GeometryTextureNormal),
        _ => None,
    }
}

/// Integer tokens of a tuple list, split on `/` and blanks
#[inline]
pub fn index_tokens(args: &str) -> impl Iterator<Item = &str> {
    args.split(|c: char| c == '/' || is_blank(c))
        .filter(|s| !s.is_empty())
}

/// Parse a float field in full
#[inline]
pub fn parse_float(token: &str) -> Option<f32> {
    fast_float::parse::<f32, _>(token).ok()
}

/// Parse a signed integer field in full
#[inline]
pub fn parse_int(token: &str) -> Option<i64> {
    lexical_core::parse::<i64>(token.as_bytes()).ok()
}

/// Parse an unsigned integer field in full
#[inline]
pub fn parse_uint(token: &str) -> Option<u32> {
    lexical_core::parse::<u32>(token.as_bytes()).ok()
}
