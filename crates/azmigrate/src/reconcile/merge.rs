//! Merges a freshly generated block into an existing one.
//!
//! The existing block was written by hand and may use variables, references
//! and its own layout. The candidate block was generated for the target
//! resource. Which parts to take from the candidate is decided by comparing
//! the planner's before and after values, never the text: whatever the
//! planner reports as unchanged keeps its original expression.

use hcl_edit::structure::{Block, Body};

use crate::document::body::{
    append_children, attribute, attribute_names, block_types, children, remove_attribute,
    remove_children, set_attribute, update_children,
};
use crate::error::MergeError;
use crate::snapshot::Snapshot;

/// Merges `candidate` into `existing` in place.
///
/// For every attribute whose before and after values differ, `existing`
/// takes the candidate's expression, or loses the attribute when the
/// candidate has none. Nested blocks are compared per block type:
///
/// - only the candidate has blocks of the type: they are appended
/// - only `existing` has them: they are removed
/// - both have the same number: blocks are paired by position and merged
///   recursively with the matching elements of the before/after sequences
/// - the numbers differ: all of `existing`'s are replaced by the candidate's
///
/// Pairing requires the before and after sequences to have exactly as many
/// elements as there are blocks. Otherwise the plan no longer describes the
/// files and [`MergeError::StructuralDivergence`] is returned. `existing`
/// may be partially merged at that point and must not be written.
pub fn merge(
    existing: &mut Block,
    candidate: &Block,
    before: &Snapshot,
    after: &Snapshot,
) -> Result<(), MergeError> {
    merge_body(&mut existing.body, &candidate.body, before, after)
}

fn merge_body(
    existing: &mut Body,
    candidate: &Body,
    before: &Snapshot,
    after: &Snapshot,
) -> Result<(), MergeError> {
    merge_attributes(existing, candidate, before, after);
    merge_blocks(existing, candidate, before, after)
}

fn union(mut left: Vec<String>, right: Vec<String>) -> Vec<String> {
    for name in right {
        if !left.contains(&name) {
            left.push(name);
        }
    }
    left
}

fn merge_attributes(existing: &mut Body, candidate: &Body, before: &Snapshot, after: &Snapshot) {
    let names = union(attribute_names(existing), attribute_names(candidate));

    for name in names {
        if before.get(&name) == after.get(&name) {
            continue;
        }

        match attribute(candidate, &name) {
            Some(attr) => set_attribute(existing, attr),
            None => {
                remove_attribute(existing, &name);
            }
        }
    }
}

/// Returns true when both groups already hold the same blocks.
fn same_blocks(existing: &[&Block], candidate: &[Block]) -> bool {
    existing.len() == candidate.len()
        && existing.iter().zip(candidate).all(|(a, b)| {
            a.labels.iter().map(|l| l.as_str()).eq(b.labels.iter().map(|l| l.as_str()))
                && a.body.to_string().trim() == b.body.to_string().trim()
        })
}

fn merge_blocks(
    existing: &mut Body,
    candidate: &Body,
    before: &Snapshot,
    after: &Snapshot,
) -> Result<(), MergeError> {
    let block_types = union(block_types(existing), block_types(candidate));

    for block_type in block_types {
        let before_value = before.get(&block_type);
        let after_value = after.get(&block_type);
        if before_value == after_value {
            continue;
        }

        let candidates: Vec<Block> = children(candidate, &block_type)
            .into_iter()
            .cloned()
            .collect();
        let existing_count = children(existing, &block_type).len();

        if existing_count == 0 {
            append_children(existing, candidates);
            continue;
        }
        if candidates.is_empty() {
            remove_children(existing, &block_type);
            continue;
        }
        if existing_count != candidates.len() {
            remove_children(existing, &block_type);
            append_children(existing, candidates);
            continue;
        }
        if same_blocks(&children(existing, &block_type), &candidates) {
            continue;
        }

        let before_items = before_value.map(Snapshot::elements).unwrap_or(&[]);
        let after_items = after_value.map(Snapshot::elements).unwrap_or(&[]);
        if before_items.len() != existing_count || after_items.len() != existing_count {
            return Err(MergeError::StructuralDivergence {
                block_type,
                blocks: existing_count,
                before: before_items.len(),
                after: after_items.len(),
            });
        }

        update_children(existing, &block_type, |i, block| {
            merge_body(
                &mut block.body,
                &candidates[i].body,
                &before_items[i],
                &after_items[i],
            )
        })?;
    }

    Ok(())
}
