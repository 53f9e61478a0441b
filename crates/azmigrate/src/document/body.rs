//! Structural accessors over a block body.
//!
//! Attributes are identified by name. Child blocks are grouped by their
//! identifier and keep their relative order inside a group, which is what
//! positional pairing relies on.

use hcl_edit::expr::Expression;
use hcl_edit::parser;
use hcl_edit::structure::{Attribute, Block, Body, Structure};
use hcl_edit::Decorate;

use super::error::{DocumentError, Result};

/// Names of all attributes in the body, in order of appearance.
pub fn attribute_names(body: &Body) -> Vec<String> {
    body.iter()
        .filter_map(|s| match s {
            Structure::Attribute(attr) => Some(attr.key.as_str().to_string()),
            Structure::Block(_) => None,
        })
        .collect()
}

/// Returns the attribute with the given name.
pub fn attribute<'a>(body: &'a Body, name: &str) -> Option<&'a Attribute> {
    body.iter().find_map(|s| match s {
        Structure::Attribute(attr) if attr.key.as_str() == name => Some(attr),
        _ => None,
    })
}

/// Rendered text of an expression with surrounding whitespace trimmed.
pub fn expression_text(expr: &Expression) -> String {
    expr.to_string().trim().to_string()
}

/// Rendered text of an attribute's value.
pub fn attribute_text(body: &Body, name: &str) -> Option<String> {
    attribute(body, name).map(|attr| expression_text(&attr.value))
}

/// Parses raw expression text.
pub fn parse_expression(text: &str) -> Result<Expression> {
    parser::parse_expr(text).map_err(|e| DocumentError::Expression {
        expression: text.to_string(),
        message: e.to_string(),
    })
}

fn attribute_position(body: &Body, name: &str) -> Option<usize> {
    body.iter()
        .position(|s| matches!(s, Structure::Attribute(attr) if attr.key.as_str() == name))
}

/// Adopts `source` in `body`.
///
/// An existing attribute of the same name keeps its key and position and
/// only takes the new value; otherwise `source` is inserted after the last
/// attribute, ahead of any nested blocks that follow it.
pub fn set_attribute(body: &mut Body, source: &Attribute) {
    match attribute_position(body, source.key.as_str()) {
        Some(pos) => match body.remove(pos) {
            Structure::Attribute(mut attr) => {
                attr.value = source.value.clone();
                body.insert(pos, attr);
            }
            other => body.insert(pos, other),
        },
        None => {
            let pos = body
                .iter()
                .enumerate()
                .filter(|(_, s)| matches!(s, Structure::Attribute(_)))
                .map(|(i, _)| i + 1)
                .last()
                .unwrap_or(0);
            body.insert(pos, source.clone());
        }
    }
}

/// Replaces the value of an attribute, keeping the whitespace and comments
/// around the old value. Returns false when there is no such attribute.
pub fn replace_expression(body: &mut Body, name: &str, mut value: Expression) -> bool {
    let Some(pos) = attribute_position(body, name) else {
        return false;
    };

    match body.remove(pos) {
        Structure::Attribute(mut attr) => {
            *value.decor_mut() = attr.value.decor().clone();
            attr.value = value;
            body.insert(pos, attr);
            true
        }
        other => {
            body.insert(pos, other);
            false
        }
    }
}

/// Removes an attribute. Returns whether it was present.
pub fn remove_attribute(body: &mut Body, name: &str) -> bool {
    match attribute_position(body, name) {
        Some(pos) => {
            body.remove(pos);
            true
        }
        None => false,
    }
}

/// Identifiers of all child blocks, each listed once in first-seen order.
pub fn block_types(body: &Body) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for structure in body.iter() {
        if let Structure::Block(block) = structure {
            let ident = block.ident.as_str();
            if !types.iter().any(|t| t == ident) {
                types.push(ident.to_string());
            }
        }
    }
    types
}

/// Child blocks with the given identifier, in order.
pub fn children<'a>(body: &'a Body, block_type: &str) -> Vec<&'a Block> {
    body.iter()
        .filter_map(|s| match s {
            Structure::Block(block) if block.ident.as_str() == block_type => Some(block),
            _ => None,
        })
        .collect()
}

fn child_positions(body: &Body, block_type: &str) -> Vec<usize> {
    body.iter()
        .enumerate()
        .filter_map(|(i, s)| {
            matches!(s, Structure::Block(block) if block.ident.as_str() == block_type).then_some(i)
        })
        .collect()
}

/// Removes every child block with the given identifier. Returns how many
/// were removed.
pub fn remove_children(body: &mut Body, block_type: &str) -> usize {
    let positions = child_positions(body, block_type);
    for pos in positions.iter().rev() {
        body.remove(*pos);
    }
    positions.len()
}

/// Appends blocks at the end of the body.
pub fn append_children<I>(body: &mut Body, blocks: I)
where
    I: IntoIterator<Item = Block>,
{
    for block in blocks {
        body.push(block);
    }
}

/// Calls `f` with the index within the group and a mutable reference to
/// each child block of the given type. Stops at the first error; every
/// block stays in place either way.
pub fn update_children<E, F>(body: &mut Body, block_type: &str, mut f: F) -> std::result::Result<(), E>
where
    F: FnMut(usize, &mut Block) -> std::result::Result<(), E>,
{
    for (index, pos) in child_positions(body, block_type).into_iter().enumerate() {
        let mut block = match body.remove(pos) {
            Structure::Block(block) => block,
            other => {
                body.insert(pos, other);
                continue;
            }
        };
        let result = f(index, &mut block);
        body.insert(pos, block);
        result?;
    }
    Ok(())
}

/// Calls `f` on every attribute of the body, recursing into child blocks.
pub fn for_each_attribute_mut<F>(body: &mut Body, f: &mut F)
where
    F: FnMut(&mut Attribute),
{
    for pos in 0..body.len() {
        match body.remove(pos) {
            Structure::Attribute(mut attr) => {
                f(&mut attr);
                body.insert(pos, attr);
            }
            Structure::Block(mut block) => {
                for_each_attribute_mut(&mut block.body, f);
                body.insert(pos, block);
            }
        }
    }
}
