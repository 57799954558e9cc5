//! Error taxonomy for model, material and texture loading
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Which attribute stream a face corner referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Uv,
    Normal,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Position => write!(f, "position"),
            Attribute::Uv => write!(f, "uv"),
            Attribute::Normal => write!(f, "normal"),
        }
    }
}

/// Failure to load one model, material or texture file.
///
/// Every variant is fatal to the file it names and to nothing else.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed texture header in {}: {reason}", path.display())]
    MalformedHeader { path: PathBuf, reason: String },
    #[error("{}:{line}: cannot parse token {token:?}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{}: {kind} index {index} out of range (stream holds {len})", path.display())]
    IndexOutOfRange {
        path: PathBuf,
        kind: Attribute,
        index: usize,
        len: usize,
    },
    #[error("{}: {source}", path.display())]
    Geometry {
        path: PathBuf,
        #[source]
        source: InconsistentGeometry,
    },
}

/// Geometry whose arrays disagree in length or whose indices run past the
/// vertex count
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inconsistent geometry: {positions} positions, {normals} normals, {uvs} uvs, {indices} indices (max index {max_index:?})")]
pub struct InconsistentGeometry {
    pub positions: usize,
    pub normals: usize,
    pub uvs: usize,
    pub indices: usize,
    pub max_index: Option<u32>,
}

impl LoadError {
    pub(crate) fn not_found(path: &Path, source: io::Error) -> Self {
        LoadError::FileNotFound {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn header(path: &Path, reason: impl Into<String>) -> Self {
        LoadError::MalformedHeader {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(path: &Path, line: usize, token: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            line,
            token: token.into(),
        }
    }

    /// The file this error is about
    pub fn path(&self) -> &Path {
        match self {
            LoadError::FileNotFound { path, .. }
            | LoadError::MalformedHeader { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::IndexOutOfRange { path, .. }
            | LoadError::Geometry { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_token_and_file() {
        let e = LoadError::parse(Path::new("data/cube.obj"), 7, "1.2.3");
        let msg = e.to_string();
        assert!(msg.contains("data/cube.obj"));
        assert!(msg.contains(":7:"));
        assert!(msg.contains("\"1.2.3\""));
    }

    #[test]
    fn test_not_found_keeps_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e = LoadError::not_found(Path::new("a.mtl"), io_err);
        assert!(matches!(e, LoadError::FileNotFound { .. }));
        assert!(e.to_string().contains("file missing"));
        assert_eq!(e.path(), Path::new("a.mtl"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let e = LoadError::IndexOutOfRange {
            path: PathBuf::from("m.obj"),
            kind: Attribute::Normal,
            index: 9,
            len: 4,
        };
        assert_eq!(
            e.to_string(),
            "m.obj: normal index 9 out of range (stream holds 4)"
        );
    }
}
