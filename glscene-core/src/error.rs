/// Error types for model parsing and asset loading
use thiserror::Error;

/// Attribute table a face component is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Position,
    Texcoord,
    Normal,
    Color,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Table::Position => "position",
            Table::Texcoord => "texcoord",
            Table::Normal => "normal",
            Table::Color => "color",
        };
        f.write_str(name)
    }
}

/// A structural problem in an OBJ or MTL document.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: `{keyword}` has invalid index `{token}`")]
    InvalidIndex {
        line: usize,
        keyword: String,
        token: String,
    },

    #[error("line {line}: `{keyword}` references {table} {index}, table has {len} entries")]
    IndexOutOfRange {
        line: usize,
        keyword: String,
        table: Table,
        index: i64,
        len: usize,
    },

    #[error("line {line}: face has {count} vertices, need at least 3")]
    DegenerateFace { line: usize, count: usize },

    #[error("line {line}: `{keyword}` appears before any `newmtl`")]
    NoActiveMaterial { line: usize, keyword: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidIndex { line, .. }
            | ParseError::IndexOutOfRange { line, .. }
            | ParseError::DegenerateFace { line, .. }
            | ParseError::NoActiveMaterial { line, .. } => *line,
        }
    }
}

/// Failure to read an asset from its source
#[derive(Debug, Error)]
#[error("failed to load `{location}`: {cause}")]
pub struct AssetLoadError {
    pub location: String,
    #[source]
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl AssetLoadError {
    pub fn new(
        location: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            location: location.into(),
            cause: cause.into(),
        }
    }
}

/// Error produced while loading a model and its material libraries
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Asset(#[from] AssetLoadError),

    #[error("failed to parse `{location}`: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },
}
