//! Rewrites literal copies of known values into symbolic references.
//!
//! Matching compares the rendered text of an attribute's expression with a
//! recorded value. Expressions are never evaluated, so only literal copies
//! are caught and anything already symbolic is left alone.

use hcl_edit::expr::Expression;
use hcl_edit::structure::{Attribute, Block, Body};
use hcl_edit::Decorate;
use serde::{Deserialize, Serialize};

use crate::document::body::{expression_text, for_each_attribute_mut, parse_expression};
use crate::document::Address;

/// A rewrite rule: attributes whose expression text equals `value` get
/// `expression` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub value: String,
    pub expression: String,
}

impl Reference {
    /// Creates a rule matching raw expression text.
    pub fn new(value: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expression: expression.into(),
        }
    }

    /// Creates a rule matching a string literal with the given contents.
    pub fn literal(value: &str, expression: impl Into<String>) -> Self {
        Self::new(quote(value), expression)
    }

    /// Creates a rule pointing copies of `value` at `address.anchor`.
    pub fn anchor(value: &str, address: &Address, anchor: &str) -> Self {
        Self::literal(value, format!("{}.{}", address, anchor))
    }

    /// Returns true if the expression text is a copy of this rule's value.
    pub fn matches(&self, expression_text: &str) -> bool {
        expression_text.trim() == self.value.trim()
    }
}

/// Renders `value` as an HCL quoted string.
fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace("${", "$${")
        .replace("%{", "%%{");
    format!("\"{}\"", escaped)
}

fn compile(references: &[Reference]) -> Vec<(&Reference, Expression)> {
    references
        .iter()
        .filter_map(|reference| match parse_expression(&reference.expression) {
            Ok(expr) => Some((reference, expr)),
            Err(e) => {
                log::warn!("Ignoring reference {:?}: {}", reference.expression, e);
                None
            }
        })
        .collect()
}

/// Rewrites matching attributes anywhere in `body`, nested blocks included.
/// Returns the number of attributes rewritten.
pub fn rewrite_body(body: &mut Body, references: &[Reference]) -> usize {
    let compiled = compile(references);
    if compiled.is_empty() {
        return 0;
    }

    let mut rewrites = 0;
    for_each_attribute_mut(body, &mut |attr: &mut Attribute| {
        let text = expression_text(&attr.value);
        if let Some((reference, expr)) = compiled.iter().find(|(r, _)| r.matches(&text)) {
            let mut value = expr.clone();
            *value.decor_mut() = attr.value.decor().clone();
            attr.value = value;
            rewrites += 1;
            log::debug!("{} = {} -> {}", attr.key.as_str(), text, reference.expression);
        }
    });
    rewrites
}

/// Rewrites matching attributes of `block` and returns the same block.
pub fn inject_references<'a>(block: &'a mut Block, references: &[Reference]) -> &'a mut Block {
    rewrite_body(&mut block.body, references);
    block
}
