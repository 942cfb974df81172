//! Message rendering.
//!
//! Walks a parsed [`Message`] left to right, substituting arguments and
//! choosing plural and select cases. The AST is never mutated, so a cached
//! message can be rendered concurrently.

use std::collections::BTreeMap;

use crate::interpreter::plural::plural_category;
use crate::interpreter::{RenderContext, RenderError};
use crate::parser::ast::{Message, Node, PluralSelector};
use crate::types::Value;

/// Render a message with the arguments and locale in `ctx`.
///
/// # Errors
///
/// Returns an error if:
/// - A referenced argument is missing
/// - A plural argument is not numeric
/// - Sub-messages nest deeper than the context allows
pub fn render(message: &Message, ctx: &mut RenderContext<'_>) -> Result<String, RenderError> {
    let mut output = String::new();
    render_into(message, ctx, &mut output)?;
    Ok(output)
}

fn render_into(
    message: &Message,
    ctx: &mut RenderContext<'_>,
    output: &mut String,
) -> Result<(), RenderError> {
    for node in &message.nodes {
        match node {
            Node::Literal(text) => output.push_str(text),
            Node::Placeholder(name) => output.push_str(&ctx.arg(name)?.to_string()),
            Node::PluralValue => match ctx.plural_value() {
                Some(value) => output.push_str(&value.to_string()),
                None => output.push('#'),
            },
            Node::Plural { arg, offset, cases } => {
                let value = ctx.arg(arg)?;
                let adjusted = offset_value(value, *offset).ok_or_else(|| {
                    RenderError::NotANumber {
                        name: arg.clone(),
                        key: ctx.key().to_string(),
                        value: value.to_string(),
                    }
                })?;
                if let Some(body) = select_plural_case(cases, value, &adjusted, ctx) {
                    ctx.push_case(Some(adjusted))?;
                    let result = render_into(body, ctx, output);
                    ctx.pop_case(true);
                    result?;
                }
            }
            Node::Select { arg, cases } => {
                let text = ctx.arg(arg)?.to_string();
                if let Some(body) = cases.get(&text).or_else(|| cases.get("other")) {
                    ctx.push_case(None)?;
                    let result = render_into(body, ctx, output);
                    ctx.pop_case(false);
                    result?;
                }
            }
        }
    }
    Ok(())
}

/// Subtract a plural offset, preserving integer values where possible.
///
/// Returns `None` for non-numeric values.
fn offset_value(value: &Value, offset: i64) -> Option<Value> {
    match value {
        Value::Number(n) => Some(
            n.checked_sub(offset)
                .map_or_else(|| Value::Float(*n as f64 - offset as f64), Value::Number),
        ),
        Value::Float(f) => Some(Value::Float(f - offset as f64)),
        Value::String(_) | Value::Bool(_) => None,
    }
}

/// Choose the case for a plural construct.
///
/// Exact `=N` selectors are compared against the argument before the offset
/// is applied and always win over categories. Categories use the
/// offset-adjusted value.
fn select_plural_case<'m>(
    cases: &'m BTreeMap<PluralSelector, Message>,
    value: &Value,
    adjusted: &Value,
    ctx: &RenderContext<'_>,
) -> Option<&'m Message> {
    let exact = exact_integer(value).and_then(|n| cases.get(&PluralSelector::Exact(n)));
    if exact.is_some() {
        return exact;
    }
    let n = adjusted.as_float()?;
    let category = plural_category(ctx.locale().as_str(), n);
    cases
        .get(&PluralSelector::Category(category))
        .or_else(|| cases.get(&PluralSelector::OTHER))
}

fn exact_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
        Value::Float(_) | Value::String(_) | Value::Bool(_) => None,
    }
}
