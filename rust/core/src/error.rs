// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::VertexChannel;

/// Result type for OBJ parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing an OBJ document
///
/// Line numbers are 1-based and point at the first physical line of the
/// logical record (continuation lines are folded into it).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot open OBJ file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("Line {line}: '{keyword}' expects at least {expected} value(s), found {found}")]
    MissingField {
        line: usize,
        keyword: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: unsupported vertex index layout {tuple:?}")]
    UnsupportedIndexLayout { line: usize, tuple: String },

    #[error("Line {line}: index {index} out of bounds for {channel} channel of size {size}")]
    IndexOutOfBounds {
        line: usize,
        channel: VertexChannel,
        index: i64,
        size: usize,
    },

    #[error("Line {line}: {message}")]
    Structure { line: usize, message: String },
}

impl Error {
    pub fn structure(line: usize, message: impl Into<String>) -> Self {
        Error::Structure {
            line,
            message: message.into(),
        }
    }

    /// Whether the error concerns a single record and may be skipped
    /// under a permissive parse policy.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::FileAccess { .. } | Error::Io(_))
    }

    /// Source line the error was raised at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::InvalidNumber { line, .. }
            | Error::MissingField { line, .. }
            | Error::UnsupportedIndexLayout { line, .. }
            | Error::IndexOutOfBounds { line, .. }
            | Error::Structure { line, .. } => Some(*line),
            Error::FileAccess { .. } | Error::Io(_) => None,
        }
    }
}
