//! Miette diagnostic wrapper for template parse errors.
//!
//! The `unused_assignments` expectation is needed because miette's derive
//! reads struct fields in generated code that rustc cannot track.
#![expect(unused_assignments)]

use arbl::parser::ParseError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into a message template.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid template: {message}")]
#[diagnostic(code(arbl::template))]
pub struct TemplateDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl TemplateDiagnostic {
    /// Create a diagnostic from a ParseError. `name` labels the source,
    /// usually `locale/key`.
    pub fn from_parse_error(name: &str, template: &str, err: &ParseError) -> Self {
        // Clamp to the template so miette never gets an out-of-bounds span
        let offset = err.offset().min(template.len());
        let len = usize::from(offset < template.len());

        let help = match err {
            ParseError::MissingOther { .. } => {
                Some("every plural and select needs an 'other' case".to_string())
            }
            ParseError::UnmatchedOpen { .. } | ParseError::UnmatchedClose { .. } => {
                Some("quote a literal brace as '{' or '}'".to_string())
            }
            ParseError::MalformedConstruct { .. } => Some(
                "expected {name}, {name, plural, ...} or {name, select, ...}".to_string(),
            ),
            _ => None,
        };

        TemplateDiagnostic {
            src: NamedSource::new(name, template.to_string()),
            span: (offset, len).into(),
            message: err.to_string(),
            help,
        }
    }
}
