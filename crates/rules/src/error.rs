//! Error types for configuration decoding and rule parsing.

use vigil_promql::rulefmt::RuleFileError;
use vigil_promql::ParseError;

/// Errors produced while parsing a rules configuration.
///
/// Any error aborts the whole configuration: there is no partial result.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The configuration carries a format version outside V1/V2.
    #[error("unknown rule format version {0}")]
    InvalidFormatVersion(u8),

    /// A rule file could not be parsed by its grammar.
    #[error("error parsing {file}: {source}")]
    FileParse {
        file: String,
        #[source]
        source: FileError,
    },

    /// An expression failed to parse. Carries no file context.
    #[error(transparent)]
    Expression(#[from] ParseError),

    /// The legacy grammar produced a statement that is neither an alert nor a record.
    #[error("unrecognized statement type in {file}")]
    UnrecognizedStatement { file: String },
}

impl RulesError {
    pub(crate) fn file_parse(file: &str, source: impl Into<FileError>) -> Self {
        Self::FileParse {
            file: file.to_string(),
            source: source.into(),
        }
    }
}

/// The grammar-level cause of a [`RulesError::FileParse`].
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// First structural error of a YAML group file.
    #[error(transparent)]
    Groups(#[from] RuleFileError),

    /// Syntax error in a legacy statement file.
    #[error(transparent)]
    Statements(#[from] ParseError),
}

/// Wire encoding failures of [`crate::RuleFormatVersion`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatVersionError {
    /// The in-memory value is not a known version.
    #[error("unknown rule format version {0}")]
    Encode(u8),

    /// The token is not `"1"` or `"2"`. Echoes the raw input.
    #[error("unknown rule format version {0:?}")]
    Decode(String),
}

/// Result alias for rules operations.
pub type Result<T> = std::result::Result<T, RulesError>;
