//! Parse error types for message templates.

use std::fmt;

use thiserror::Error;

/// The kind of sub-message construct an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Plural,
    Select,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Plural => f.write_str("plural"),
            Construct::Select => f.write_str("select"),
        }
    }
}

/// An error that occurred while parsing a message template.
///
/// Every variant carries the byte offset into the template where the
/// offending brace, construct or selector starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `{` without a well-formed construct and matching `}`.
    #[error("unmatched '{{' at byte {offset}")]
    UnmatchedOpen { offset: usize },

    /// A `}` that closes nothing.
    #[error("unmatched '}}' at byte {offset}")]
    UnmatchedClose { offset: usize },

    /// A balanced `{...}` whose contents are not a valid argument.
    #[error("malformed construct at byte {offset}")]
    MalformedConstruct { offset: usize },

    /// A plural or select construct without an `other` case.
    #[error("{construct} at byte {offset} has no 'other' case")]
    MissingOther { construct: Construct, offset: usize },

    /// A construct keyword other than `plural` or `select`.
    #[error("unknown construct keyword '{keyword}' at byte {offset}")]
    UnknownKeyword { keyword: String, offset: usize },

    /// A case selector that is not valid for its construct.
    #[error("invalid {construct} selector '{selector}' at byte {offset}")]
    InvalidSelector {
        construct: Construct,
        selector: String,
        offset: usize,
    },

    /// The same selector appears twice in one construct.
    #[error("duplicate selector '{selector}' at byte {offset}")]
    DuplicateSelector { selector: String, offset: usize },

    /// `offset:` is malformed or used outside a plural construct.
    #[error("invalid offset '{value}' at byte {offset}")]
    InvalidOffset { value: String, offset: usize },

    /// Sub-messages nest deeper than the parser allows.
    #[error("sub-messages nest deeper than {max} levels at byte {offset}")]
    NestingTooDeep { max: usize, offset: usize },
}

impl ParseError {
    /// Byte offset into the template where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnmatchedOpen { offset }
            | ParseError::UnmatchedClose { offset }
            | ParseError::MalformedConstruct { offset }
            | ParseError::MissingOther { offset, .. }
            | ParseError::UnknownKeyword { offset, .. }
            | ParseError::InvalidSelector { offset, .. }
            | ParseError::DuplicateSelector { offset, .. }
            | ParseError::InvalidOffset { offset, .. }
            | ParseError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}
