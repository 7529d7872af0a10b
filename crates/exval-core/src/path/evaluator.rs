//! Query evaluation.
//!
//! Segments are applied left to right to a node list that starts as the
//! root. Output order follows RFC 9535: selectors in union order, array
//! elements in index order, object members in map iteration order, and
//! descendants in pre-order.

use serde_json::Value;

use super::ast::{Segment, Selector};
use super::normalized::{NormalizedPath, PathElement};
use super::Match;

/// Evaluate compiled segments against `root`.
pub fn evaluate<'a>(segments: &[Segment], root: &'a Value) -> Vec<Match<'a>> {
    let mut nodes = vec![Match {
        value: root,
        path: NormalizedPath::root(),
    }];

    for segment in segments {
        let mut next = Vec::new();
        match segment {
            Segment::Child(selectors) => {
                for node in &nodes {
                    select_all(selectors, node, &mut next);
                }
            }
            Segment::Descendant(selectors) => {
                for node in &nodes {
                    for descendant in descendants_and_self(node) {
                        select_all(selectors, &descendant, &mut next);
                    }
                }
            }
        }
        nodes = next;
    }

    nodes
}

fn select_all<'a>(selectors: &[Selector], node: &Match<'a>, out: &mut Vec<Match<'a>>) {
    for selector in selectors {
        select(selector, node, out);
    }
}

fn select<'a>(selector: &Selector, node: &Match<'a>, out: &mut Vec<Match<'a>>) {
    match (selector, node.value) {
        (Selector::Name(name), Value::Object(map)) => {
            if let Some(value) = map.get(name) {
                out.push(Match {
                    value,
                    path: node.path.child(PathElement::Name(name.clone())),
                });
            }
        }
        (Selector::Wildcard, _) => out.extend(children(node)),
        (Selector::Index(index), Value::Array(items)) => {
            if let Some(position) = normalize_index(*index, items.len()) {
                out.push(Match {
                    value: &items[position],
                    path: node.path.child(PathElement::Index(position)),
                });
            }
        }
        (Selector::Slice { start, end, step }, Value::Array(items)) => {
            for position in slice_positions(*start, *end, *step, items.len()) {
                out.push(Match {
                    value: &items[position],
                    path: node.path.child(PathElement::Index(position)),
                });
            }
        }
        _ => {}
    }
}

/// Direct children in document order.
fn children<'a>(node: &Match<'a>) -> Vec<Match<'a>> {
    match node.value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| Match {
                value,
                path: node.path.child(PathElement::Name(key.clone())),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(position, value)| Match {
                value,
                path: node.path.child(PathElement::Index(position)),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The node followed by all of its descendants, pre-order.
fn descendants_and_self<'a>(node: &Match<'a>) -> Vec<Match<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![node.clone()];
    while let Some(current) = stack.pop() {
        let mut kids = children(&current);
        kids.reverse();
        out.push(current);
        stack.extend(kids);
    }
    out
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).ok()
    } else {
        None
    }
}

fn slice_positions(
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
    len: usize,
) -> Vec<usize> {
    let Ok(len) = i64::try_from(len) else {
        return Vec::new();
    };
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }

    let normalize = |i: i64| if i >= 0 { i } else { len + i };
    let mut positions = Vec::new();

    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            positions.push(i);
            let Some(next) = i.checked_add(step) else {
                break;
            };
            i = next;
        }
    } else {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = normalize(end.unwrap_or(-len - 1)).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            positions.push(i);
            let Some(next) = i.checked_add(step) else {
                break;
            };
            i = next;
        }
    }

    positions
        .into_iter()
        .filter_map(|i| usize::try_from(i).ok())
        .collect()
}
