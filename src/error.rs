use std::io;
use std::net::AddrParseError;
use std::num::ParseIntError;

use crate::field::{Field, FieldKind};

/// Everything that can go wrong while turning a service file into a [`ServiceGroup`].
///
/// [`ServiceGroup`]: crate::ServiceGroup
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read data")]
    ReadFailure {
        #[from]
        source: io::Error,
    },

    #[error("invalid syntax")]
    Syntax(#[from] ParseError),

    #[error("unrecognized service key: {key:?}")]
    UnrecognizedKey { key: String },

    #[error("invalid integer for {field}: {value:?}")]
    MalformedInteger {
        field: Field,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("no value provided for boolean {field}")]
    MissingBoolean { field: Field },

    #[error("invalid network address for {field}: {value:?}")]
    MalformedAddress {
        field: Field,
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("{kind} value cannot be assigned to {field}")]
    UnsupportedFieldType { field: Field, kind: FieldKind },

    #[error("a service named {name:?} already exists")]
    DuplicateService { name: String },
}

/// Malformed INI text. Line numbers start at 1.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no sections found")]
    NoSections,

    #[error("line {line}: text is not valid UTF-8")]
    InvalidUtf8 { line: usize },

    #[error("line {line}: section name cannot be empty")]
    SectionNameEmpty { line: usize },

    #[error("line {line}: section name is missing a closing ']'")]
    UnterminatedSectionName { line: usize },

    #[error("line {line}: unexpected character: {c:?}")]
    UnexpectedCharacter { line: usize, c: char },

    #[error("line {line}: expected `key = value`")]
    MissingEquals { line: usize },

    #[error("line {line}: key cannot be empty")]
    KeyEmpty { line: usize },

    #[error("line {line}: entry appears before any section")]
    EntryOutsideSection { line: usize },
}
