//! ICU-style message template parser.
//!
//! This module parses the message strings stored in ARB bundles. The parser
//! produces an AST that can be rendered, linted, or inspected by external
//! tooling.

pub mod ast;
pub mod error;
mod message;

pub use ast::*;
pub use error::{Construct, ParseError};
pub use message::{MAX_NESTING, parse_message};
