use thiserror::Error;

/// Every way a decode or encode call can fail.
///
/// Positional variants carry the 1-based line and 0-based column of the
/// offending token plus a source excerpt with a caret pointer. Unknown
/// tags are deliberately not an error; the decoder skips them so newer
/// documents keep working against older schemas.
#[derive(Debug, Error)]
pub enum PureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode target must be a mutable group value")]
    InvalidRoot,

    #[error("missing value for property {tag} at line {line}, column {column}")]
    MissingValue {
        tag: String,
        line: usize,
        column: usize,
    },

    #[error("unterminated array at line {line}, column {column}\n{excerpt}")]
    UnterminatedArray {
        line: usize,
        column: usize,
        excerpt: String,
    },

    #[error("cannot coerce {literal} into {expected} at line {line}, column {column}\n{excerpt}")]
    TypeCoercion {
        literal: String,
        expected: &'static str,
        line: usize,
        column: usize,
        excerpt: String,
    },

    #[error("unresolved reference {path} at line {line}, column {column}")]
    UnresolvedReference {
        path: String,
        line: usize,
        column: usize,
    },

    #[error("duplicate mapping key {key} at line {line}, column {column}")]
    DuplicateKey {
        key: String,
        line: usize,
        column: usize,
    },

    #[error("couldn't include file {path}: {reason}")]
    IncludeRead { path: String, reason: String },
}
