//! Render context for tracking state during recursive rendering.

use crate::interpreter::RenderError;
use crate::types::{Args, LocaleId, Value};

/// Render context carrying state through nested sub-messages.
///
/// The context tracks:
/// - Arguments available during rendering
/// - The key and locale being rendered, for error reporting and plural rules
/// - The values `#` stands for, innermost plural last
/// - Nesting depth
pub struct RenderContext<'a> {
    args: &'a Args,
    key: &'a str,
    locale: &'a LocaleId,
    plural_values: Vec<Value>,
    depth: usize,
    max_depth: usize,
}

impl<'a> RenderContext<'a> {
    /// Create a new context.
    pub fn new(args: &'a Args, key: &'a str, locale: &'a LocaleId) -> Self {
        Self::with_max_depth(args, key, locale, 64)
    }

    /// Create a context with a custom nesting limit.
    pub fn with_max_depth(
        args: &'a Args,
        key: &'a str,
        locale: &'a LocaleId,
        max_depth: usize,
    ) -> Self {
        Self {
            args,
            key,
            locale,
            plural_values: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Look up an argument, failing with [`RenderError::MissingArgument`].
    pub fn arg(&self, name: &str) -> Result<&'a Value, RenderError> {
        self.args
            .get(name)
            .ok_or_else(|| RenderError::MissingArgument {
                name: name.to_string(),
                key: self.key.to_string(),
            })
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn locale(&self) -> &'a LocaleId {
        self.locale
    }

    /// Enter a sub-message.
    pub fn push_case(&mut self, plural_value: Option<Value>) -> Result<(), RenderError> {
        if self.depth >= self.max_depth {
            return Err(RenderError::NestingTooDeep {
                key: self.key.to_string(),
            });
        }
        self.depth += 1;
        if let Some(value) = plural_value {
            self.plural_values.push(value);
        }
        Ok(())
    }

    /// Leave a sub-message entered with [`RenderContext::push_case`].
    pub fn pop_case(&mut self, had_plural_value: bool) {
        if had_plural_value {
            self.plural_values.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// The value of `#` in the current position, if inside a plural.
    pub fn plural_value(&self) -> Option<&Value> {
        self.plural_values.last()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
