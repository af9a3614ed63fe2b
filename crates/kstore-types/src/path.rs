//! Nested-path reads and writes on structured JSON.
//!
//! Paths are dot-separated property names. A segment made only of ASCII
//! digits addresses an array position. Writes create missing intermediate
//! containers: an array when the following segment is an index, an object
//! otherwise. An intermediate that holds a scalar is replaced by a fresh
//! container.

use serde_json::{Map, Value as Json};

/// Resolve `path` inside `root`. Returns `None` when any segment is missing.
pub fn get_path<'a>(root: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.').try_fold(root, |node, segment| match node {
        Json::Object(map) => map.get(segment),
        Json::Array(items) => parse_index(segment).and_then(move |i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path` inside `root`, creating intermediates as needed.
///
/// `root` must already be an object or array; writes into a scalar root are
/// ignored.
pub fn set_path(root: &mut Json, path: &str, value: Json) {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, path),
    };

    let mut cursor = root;
    if let Some(parents) = parents {
        let segments: Vec<&str> = parents.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            let next = segments.get(i + 1).copied().unwrap_or(last);
            cursor = match child_container(cursor, segment, is_index(next)) {
                Some(child) => child,
                None => return,
            };
        }
    }

    match cursor {
        Json::Object(map) => {
            map.insert(last.to_string(), value);
        }
        Json::Array(items) => {
            if let Some(i) = parse_index(last) {
                if items.len() <= i {
                    items.resize(i + 1, Json::Null);
                }
                items[i] = value;
            }
        }
        _ => {}
    }
}

/// Remove the property at `path`. Returns `true` if something was removed.
///
/// Removing an array position leaves a `null` hole rather than shifting the
/// remaining elements.
pub fn unset_path(root: &mut Json, path: &str) -> bool {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (get_path_mut(root, parents), last),
        None => (Some(root), path),
    };

    match parent {
        Some(Json::Object(map)) => map.remove(last).is_some(),
        Some(Json::Array(items)) => match parse_index(last).and_then(move |i| items.get_mut(i)) {
            Some(slot) => {
                *slot = Json::Null;
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn get_path_mut<'a>(root: &'a mut Json, path: &str) -> Option<&'a mut Json> {
    path.split('.').try_fold(root, |node, segment| match node {
        Json::Object(map) => map.get_mut(segment),
        Json::Array(items) => parse_index(segment).and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

/// Step into `segment`, replacing a missing or scalar child with a container.
fn child_container<'a>(node: &'a mut Json, segment: &str, index_next: bool) -> Option<&'a mut Json> {
    let slot = match node {
        Json::Object(map) => map.entry(segment.to_string()).or_insert(Json::Null),
        Json::Array(items) => {
            let i = parse_index(segment)?;
            if items.len() <= i {
                items.resize(i + 1, Json::Null);
            }
            &mut items[i]
        }
        _ => return None,
    };
    if !is_container(slot) {
        *slot = if index_next {
            Json::Array(Vec::new())
        } else {
            Json::Object(Map::new())
        };
    }
    Some(slot)
}

fn is_container(node: &Json) -> bool {
    matches!(node, Json::Object(_) | Json::Array(_))
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(segment: &str) -> Option<usize> {
    if is_index(segment) {
        segment.parse().ok()
    } else {
        None
    }
}
