//! Message template parser using winnow.
//!
//! Parsing runs in two passes. The winnow pass recognizes the ICU-style
//! syntax and records where each construct starts; the lowering pass
//! validates selectors and required cases and builds the public AST.
//! Supported syntax:
//! - Literal text, with `'` quoting (`'{'`, `'}'`, `'#'`, `''`)
//! - Placeholders: `{name}`
//! - `{arg, plural, offset:N? =N{...} one{...} other{...}}`
//! - `{arg, select, key{...} other{...}}`
//! - `#` inside plural bodies (inherited by nested select bodies)

use std::cell::Cell;
use std::collections::BTreeMap;

use super::ast::{Message, Node, PluralSelector};
use super::error::{Construct, ParseError};
use crate::types::PluralCategory;
use winnow::combinator::{alt, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Deepest sub-message nesting the parser accepts.
pub const MAX_NESTING: usize = 32;

/// Parse a message template into an AST.
///
/// # Example
///
/// ```
/// use arbl::{Node, parse_message};
///
/// let message = parse_message("Hello, {name}!").unwrap();
/// assert_eq!(message.nodes[1], Node::Placeholder("name".to_string()));
/// ```
pub fn parse_message(input: &str) -> Result<Message, ParseError> {
    let furthest = Furthest::default();
    let mut remaining = input;
    let parts = match message(&mut remaining, false, 0, &furthest) {
        Ok(parts) if remaining.is_empty() => parts,
        _ => return Err(syntax_error(input, remaining, &furthest)),
    };
    lower(parts, input.len())
}

/// Classify the brace where the syntax pass stopped.
///
/// A `{` with no matching `}` is unmatched. A balanced construct that still
/// failed is reported at the token where parsing gave up.
fn syntax_error(input: &str, remaining: &str, furthest: &Furthest) -> ParseError {
    let offset = input.len() - remaining.len();
    if remaining.starts_with('}') {
        return ParseError::UnmatchedClose { offset };
    }
    let closed = remaining
        .get(1..)
        .is_some_and(|mut rest| skip_balanced(&mut rest).is_ok());
    match furthest.0.get() {
        Some(at) if closed => ParseError::MalformedConstruct {
            offset: input.len() - at,
        },
        _ => ParseError::UnmatchedOpen { offset },
    }
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

// =========================================================================
// Syntax pass
// =========================================================================

// Positions are recorded as the remaining input length at the start of a
// construct; lowering converts them to byte offsets.

/// Smallest remaining length at which a required token inside `{...}` was
/// missing.
#[derive(Debug, Default)]
struct Furthest(Cell<Option<usize>>);

impl Furthest {
    /// Run `parser`, remembering the position if it fails.
    fn expect<'i, O>(
        &self,
        input: &mut &'i str,
        mut parser: impl Parser<&'i str, O, ErrMode<ContextError>>,
    ) -> ModalResult<O> {
        let remaining = input.len();
        parser.parse_next(input).inspect_err(|_| {
            let at = self.0.get().map_or(remaining, |seen| seen.min(remaining));
            self.0.set(Some(at));
        })
    }
}

#[derive(Debug)]
enum RawPart<'i> {
    Text(String),
    Pound,
    Argument(RawArgument<'i>),
}

#[derive(Debug)]
struct RawArgument<'i> {
    at: usize,
    name: &'i str,
    form: RawForm<'i>,
}

#[derive(Debug)]
enum RawForm<'i> {
    Simple,
    Complex {
        construct: Construct,
        offset: Option<(&'i str, usize)>,
        cases: Vec<RawCase<'i>>,
    },
    Unsupported {
        keyword: &'i str,
        at: usize,
    },
    TooDeep,
}

#[derive(Debug)]
struct RawCase<'i> {
    at: usize,
    selector: &'i str,
    body: Vec<RawPart<'i>>,
}

/// Parse a run of message parts until a brace that closes the enclosing
/// construct (or an unparseable one).
fn message<'i>(
    input: &mut &'i str,
    in_plural: bool,
    depth: usize,
    furthest: &Furthest,
) -> ModalResult<Vec<RawPart<'i>>> {
    let parts: Vec<RawPart<'i>> = repeat(
        0..,
        alt((
            |i: &mut &'i str| quoted_literal(i, in_plural),
            |i: &mut &'i str| literal_run(i, in_plural),
            |i: &mut &'i str| pound(i, in_plural),
            |i: &mut &'i str| argument(i, in_plural, depth, furthest).map(RawPart::Argument),
        )),
    )
    .parse_next(input)?;
    Ok(merge_text(parts))
}

/// Merge adjacent text parts into single parts.
fn merge_text(parts: Vec<RawPart<'_>>) -> Vec<RawPart<'_>> {
    let mut result = Vec::with_capacity(parts.len());

    for part in parts {
        match part {
            RawPart::Text(text) => {
                if let Some(RawPart::Text(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(RawPart::Text(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse apostrophe quoting.
///
/// `''` is a literal apostrophe. An apostrophe followed by a syntax
/// character starts quoted text that runs to the next lone apostrophe (or
/// the end of input). Any other apostrophe is literal.
fn quoted_literal<'i>(input: &mut &'i str, in_plural: bool) -> ModalResult<RawPart<'i>> {
    let source: &'i str = *input;
    let Some(rest) = source.strip_prefix('\'') else {
        return Err(backtrack());
    };
    if let Some(after) = rest.strip_prefix('\'') {
        *input = after;
        return Ok(RawPart::Text("'".to_string()));
    }
    let starts_quote =
        rest.starts_with(['{', '}']) || (in_plural && rest.starts_with('#'));
    if !starts_quote {
        *input = rest;
        return Ok(RawPart::Text("'".to_string()));
    }

    let mut text = String::new();
    let mut end = rest.len();
    let mut chars = rest.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        if c == '\'' {
            if chars.peek().is_some_and(|&(_, next)| next == '\'') {
                chars.next();
                text.push('\'');
                continue;
            }
            end = index + 1;
            break;
        }
        text.push(c);
    }
    *input = &rest[end..];
    Ok(RawPart::Text(text))
}

/// Parse a run of ordinary characters.
fn literal_run<'i>(input: &mut &'i str, in_plural: bool) -> ModalResult<RawPart<'i>> {
    take_while(1.., |c: char| {
        !matches!(c, '{' | '}' | '\'') && !(in_plural && c == '#')
    })
    .map(|text: &str| RawPart::Text(text.to_string()))
    .parse_next(input)
}

fn pound<'i>(input: &mut &'i str, in_plural: bool) -> ModalResult<RawPart<'i>> {
    if !in_plural {
        return Err(backtrack());
    }
    '#'.map(|_| RawPart::Pound).parse_next(input)
}

/// Parse `{name}`, `{name, plural, ...}`, `{name, select, ...}` or any
/// other `{name, keyword, ...}` form (rejected during lowering).
fn argument<'i>(
    input: &mut &'i str,
    in_plural: bool,
    depth: usize,
    furthest: &Furthest,
) -> ModalResult<RawArgument<'i>> {
    let at = input.len();
    '{'.parse_next(input)?;
    if depth >= MAX_NESTING {
        skip_balanced(input)?;
        return Ok(RawArgument {
            at,
            name: "",
            form: RawForm::TooDeep,
        });
    }

    ws(input)?;
    let name = furthest.expect(input, identifier)?;
    ws(input)?;
    if opt('}').parse_next(input)?.is_some() {
        return Ok(RawArgument {
            at,
            name,
            form: RawForm::Simple,
        });
    }

    furthest.expect(input, ',')?;
    ws(input)?;
    let keyword_at = input.len();
    let keyword = furthest.expect(input, identifier)?;
    ws(input)?;
    let construct = match keyword {
        "plural" => Some(Construct::Plural),
        "select" => Some(Construct::Select),
        _ => None,
    };

    let form = match construct {
        Some(construct) => {
            let body_in_plural = construct == Construct::Plural || in_plural;
            furthest.expect(input, ',')?;
            ws(input)?;
            let offset = opt(plural_offset).parse_next(input)?;
            let cases: Vec<RawCase<'i>> =
                repeat(0.., |i: &mut &'i str| {
                    case(i, body_in_plural, depth + 1, furthest)
                })
                    .parse_next(input)?;
            RawForm::Complex {
                construct,
                offset,
                cases,
            }
        }
        None => {
            take_while(0.., |c: char| c != '{' && c != '}')
                .void()
                .parse_next(input)?;
            RawForm::Unsupported {
                keyword,
                at: keyword_at,
            }
        }
    };

    furthest.expect(input, '}')?;
    Ok(RawArgument { at, name, form })
}

/// Parse `offset:N`, returning the raw value and its position.
fn plural_offset<'i>(input: &mut &'i str) -> ModalResult<(&'i str, usize)> {
    let at = input.len();
    let value = preceded(("offset", ws, ':', ws), selector_token).parse_next(input)?;
    ws(input)?;
    Ok((value, at))
}

/// Parse `selector{body}` and trailing whitespace.
fn case<'i>(
    input: &mut &'i str,
    in_plural: bool,
    depth: usize,
    furthest: &Furthest,
) -> ModalResult<RawCase<'i>> {
    let at = input.len();
    let selector = selector_token(input)?;
    ws(input)?;
    '{'.parse_next(input)?;
    let body = message(input, in_plural, depth, furthest)?;
    '}'.parse_next(input)?;
    ws(input)?;
    Ok(RawCase { at, selector, body })
}

/// Consume everything up to and including the brace matching an already
/// consumed `{`.
fn skip_balanced(input: &mut &str) -> ModalResult<()> {
    let source: &str = *input;
    let mut depth = 1usize;
    for (index, c) in source.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    *input = &source[index + 1..];
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    Err(backtrack())
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

/// Parse an argument name or construct keyword.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

/// Parse a case selector or offset value: anything up to whitespace or a
/// brace. Validation happens during lowering.
fn selector_token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '{' && c != '}').parse_next(input)
}

// =========================================================================
// Lowering
// =========================================================================

fn lower(parts: Vec<RawPart<'_>>, len: usize) -> Result<Message, ParseError> {
    let nodes = parts
        .into_iter()
        .map(|part| match part {
            RawPart::Text(text) => Ok(Node::Literal(text)),
            RawPart::Pound => Ok(Node::PluralValue),
            RawPart::Argument(argument) => lower_argument(argument, len),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Message { nodes })
}

fn lower_argument(argument: RawArgument<'_>, len: usize) -> Result<Node, ParseError> {
    let offset = len - argument.at;
    let arg = argument.name.to_string();
    match argument.form {
        RawForm::Simple => Ok(Node::Placeholder(arg)),
        RawForm::TooDeep => Err(ParseError::NestingTooDeep {
            max: MAX_NESTING,
            offset,
        }),
        RawForm::Unsupported { keyword, at } => Err(ParseError::UnknownKeyword {
            keyword: keyword.to_string(),
            offset: len - at,
        }),
        RawForm::Complex {
            construct: Construct::Plural,
            offset: plural_offset,
            cases,
        } => {
            let plural_offset = match plural_offset {
                None => 0,
                Some((value, at)) => value
                    .parse::<i64>()
                    .ok()
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| ParseError::InvalidOffset {
                        value: value.to_string(),
                        offset: len - at,
                    })?,
            };
            let mut lowered = BTreeMap::new();
            for case in cases {
                let selector =
                    plural_selector(case.selector).ok_or_else(|| ParseError::InvalidSelector {
                        construct: Construct::Plural,
                        selector: case.selector.to_string(),
                        offset: len - case.at,
                    })?;
                let body = lower(case.body, len)?;
                if lowered.insert(selector, body).is_some() {
                    return Err(ParseError::DuplicateSelector {
                        selector: case.selector.to_string(),
                        offset: len - case.at,
                    });
                }
            }
            if !lowered.contains_key(&PluralSelector::OTHER) {
                return Err(ParseError::MissingOther {
                    construct: Construct::Plural,
                    offset,
                });
            }
            Ok(Node::Plural {
                arg,
                offset: plural_offset,
                cases: lowered,
            })
        }
        RawForm::Complex {
            construct: Construct::Select,
            offset: select_offset,
            cases,
        } => {
            if let Some((value, at)) = select_offset {
                return Err(ParseError::InvalidOffset {
                    value: value.to_string(),
                    offset: len - at,
                });
            }
            let mut lowered = BTreeMap::new();
            for case in cases {
                if !is_select_key(case.selector) {
                    return Err(ParseError::InvalidSelector {
                        construct: Construct::Select,
                        selector: case.selector.to_string(),
                        offset: len - case.at,
                    });
                }
                let body = lower(case.body, len)?;
                if lowered.insert(case.selector.to_string(), body).is_some() {
                    return Err(ParseError::DuplicateSelector {
                        selector: case.selector.to_string(),
                        offset: len - case.at,
                    });
                }
            }
            if !lowered.contains_key("other") {
                return Err(ParseError::MissingOther {
                    construct: Construct::Select,
                    offset,
                });
            }
            Ok(Node::Select {
                arg,
                cases: lowered,
            })
        }
    }
}

fn plural_selector(token: &str) -> Option<PluralSelector> {
    match token.strip_prefix('=') {
        Some(number) => number.parse::<i64>().ok().map(PluralSelector::Exact),
        None => token
            .parse::<PluralCategory>()
            .ok()
            .map(PluralSelector::Category),
    }
}

fn is_select_key(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
