// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # OBJ-Lite Core Parser
//!
//! Incremental Wavefront OBJ parser built with [nom](https://docs.rs/nom).
//! Reads a document line by line and builds an in-memory model of vertex
//! attributes, resolved indices, primitives and groups.
//!
//! ## Overview
//!
//! - **Line classification**: keyword lookup over the fixed OBJ keyword table
//! - **Vertex store**: one buffer per channel (`v`, `vt`, `vn`, `vp`)
//! - **Index buffer**: 1-based and relative indices resolved to 0-based offsets
//! - **Entity directory**: points, lines and faces addressed by a stable id
//! - **Groups**: `g`, `o`, `s` and `mg` memberships as ranges over the directory
//!
//! ## Quick Start
//!
//! ```rust
//! use obj_lite_core::{parse_str, GroupKey};
//!
//! let content = "\
//! v 0 0 0
//! v 1 0 0
//! v 1 1 0
//! g triangle
//! f -3 -2 -1
//! ";
//!
//! let doc = parse_str(content).unwrap();
//! assert_eq!(doc.positions().len(), 3);
//!
//! let (_, face) = doc.faces().next().unwrap();
//! assert!(face.is_triangle());
//! assert_eq!(doc.indices_of(face).unwrap(), &[0, 1, 2]);
//!
//! let id = doc.find_group(&GroupKey::Name("triangle".into())).unwrap();
//! assert_eq!(doc.group(id).unwrap().member_count(), 1);
//! ```
//!
//! ## Line-by-line Parsing
//!
//! ```rust,ignore
//! use obj_lite_core::{ObjParser, ParserConfig};
//!
//! let mut parser = ObjParser::with_config(ParserConfig::lenient());
//! for (n, line) in source.lines().enumerate() {
//!     parser.parse_line(n + 1, line)?;
//! }
//! let doc = parser.finish();
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for parsed data

pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod groups;
pub mod lexer;
pub mod parser;

pub use config::{MalformedPolicy, ParserConfig, DEFAULT_GROUP_NAME};
pub use document::{DocumentStats, ObjDocument, TupleVertex};
pub use entity::{
    Entity, EntityRef, Group, GroupId, GroupKey, GroupKind, IndexLayout, Primitive, PrimitiveId,
    PrimitiveKind, Vertex, VertexChannel,
};
pub use error::{Error, Result};
pub use groups::GroupTracker;
pub use lexer::{classify, ElementKind, LineClass};
pub use parser::{
    parse_file, parse_file_with_config, parse_reader, parse_reader_with_config, parse_str,
    parse_str_with_config, LogicalLines, ObjParser,
};
