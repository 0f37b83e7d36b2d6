//! Evaluate query criteria against JSON documents
//!
//! Operands arrive as strings and are interpreted according to the stored
//! value they are compared with:
//!
//! - numbers compare numerically, a non-numeric operand never matches
//! - booleans accept `true` and `false`
//! - strings compare lexicographically
//! - arrays match when any element matches
//! - `null`, objects and missing fields never match
//!
//! Dotted field names walk into nested objects, fanning out over arrays.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::QuerySpec;
use crate::repository::{FilterCondition, FilterOperator};

/// Whether `doc` satisfies every criterion of `spec`
pub fn document_matches(doc: &Value, spec: &QuerySpec) -> bool {
    spec.criteria().all(|condition| condition_matches(doc, condition))
}

/// Whether `doc` satisfies a single condition
pub fn condition_matches(doc: &Value, condition: &FilterCondition) -> bool {
    let path: Vec<&str> = condition.path().collect();
    let mut leaves = Vec::new();
    collect_leaves(doc, &path, &mut leaves);

    leaves
        .into_iter()
        .any(|leaf| leaf_matches(leaf, condition.operator, &condition.value))
}

fn collect_leaves<'a>(value: &'a Value, path: &[&str], out: &mut Vec<&'a Value>) {
    match (path.split_first(), value) {
        (None, Value::Array(items)) => out.extend(items.iter()),
        (None, leaf) => out.push(leaf),
        (Some((head, rest)), Value::Object(fields)) => {
            if let Some(child) = fields.get(*head) {
                collect_leaves(child, rest, out);
            }
        }
        (Some(_), Value::Array(items)) => {
            for item in items {
                collect_leaves(item, path, out);
            }
        }
        (Some(_), _) => {}
    }
}

fn leaf_matches(leaf: &Value, operator: FilterOperator, operand: &str) -> bool {
    if operator == FilterOperator::Contains {
        return leaf
            .as_str()
            .is_some_and(|s| s.to_lowercase().contains(&operand.to_lowercase()));
    }

    compare(leaf, operand).is_some_and(|ordering| operator.accepts(ordering))
}

fn compare(leaf: &Value, operand: &str) -> Option<Ordering> {
    match leaf {
        Value::Number(n) => {
            let stored = n.as_f64()?;
            let wanted = operand.trim().parse::<f64>().ok()?;
            stored.partial_cmp(&wanted)
        }
        Value::Bool(b) => operand.parse::<bool>().ok().map(|wanted| b.cmp(&wanted)),
        Value::String(s) => Some(s.as_str().cmp(operand)),
        _ => None,
    }
}
