//! Dot-notation property paths
//!
//! `spec.resources.limits.cpu` addresses nested mapping keys; a purely
//! numeric segment such as the `0` in `spec.env.0.value` addresses an array
//! element. There is no escaping, so keys containing a literal `.` cannot be
//! addressed.

use crate::error::{OverrideError, Result};
use crate::value::{is_empty_object, kind_name};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A single step of a property path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Segment {
    /// Mapping key
    Key(String),
    /// Array index
    Index(usize),
}

impl Segment {
    /// The mapping key this segment selects when applied to an object
    #[must_use]
    #[inline]
    pub fn as_key(&self) -> String {
        match self {
            Self::Key(key) => key.clone(),
            Self::Index(index) => index.to_string(),
        }
    }

    fn parse(raw: &str, path: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(OverrideError::path(format!(
                "Empty segment in property path '{path}'"
            )));
        }

        if !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Ok(Self::Key(raw.to_owned()));
        }

        if raw.len() > 1 && raw.starts_with('0') {
            return Err(OverrideError::path(format!(
                "Malformed array index '{raw}' in property path '{path}': leading zeros are not allowed"
            )));
        }

        raw.parse::<usize>().map(Self::Index).map_err(|e| {
            OverrideError::path(format!(
                "Malformed array index '{raw}' in property path '{path}': {e}"
            ))
        })
    }
}

impl fmt::Display for Segment {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Ordered sequence of segments addressing a value inside a document
///
/// The empty path addresses the document root and displays as `""`.
///
/// Display and parsing are not exact inverses: a key such as `0` displays as
/// `0` and parses back as an index (which still selects the `"0"` key of an
/// object), and a key containing `.` parses back as several keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    /// The path of the document root
    #[must_use]
    #[inline]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a dot-delimited path string
    ///
    /// # Errors
    ///
    /// Returns a path error if:
    /// - The path is empty or contains an empty segment
    /// - A numeric segment has leading zeros or does not fit in `usize`
    #[inline]
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(OverrideError::path("Property path cannot be empty"));
        }

        let segments = path
            .split('.')
            .map(|raw| Segment::parse(raw, path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Segments of this path, outermost first
    #[must_use]
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this path addresses the document root
    #[must_use]
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path extended by a mapping key
    #[must_use]
    #[inline]
    pub fn key(&self, key: &str) -> Self {
        self.child(Segment::Key(key.to_owned()))
    }

    /// A new path extended by an array index
    #[must_use]
    #[inline]
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    fn prefix(&self, depth: usize) -> Self {
        Self {
            segments: self.segments.iter().take(depth).cloned().collect(),
        }
    }
}

impl fmt::Display for PropertyPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = OverrideError;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PropertyPath {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Self::root());
        }
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn incompatible(path: &PropertyPath, depth: usize, found: &Value) -> OverrideError {
    let at = path.prefix(depth);
    let location = if at.is_root() {
        "the document root".to_owned()
    } else {
        format!("'{at}'")
    };
    let expected = match path.segments.get(depth) {
        Some(Segment::Index(_)) => "an object or array",
        _ => "an object",
    };

    OverrideError::path(format!(
        "Cannot traverse '{path}': {location} is {} but {expected} is required",
        kind_name(found)
    ))
}

/// Look up the value at `path`
///
/// Returns `Ok(None)` when a key is missing or an index is past the end of an
/// array.
///
/// # Errors
///
/// Returns a path error if a segment meets a value it cannot traverse, such
/// as a key applied to an array or any segment applied to a string.
#[inline]
pub fn get<'v>(root: &'v Value, path: &PropertyPath) -> Result<Option<&'v Value>> {
    let mut current = root;

    for (depth, segment) in path.segments.iter().enumerate() {
        let next = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key),
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
            (Value::Array(items), Segment::Index(index)) => items.get(*index),
            (
                found @ (Value::Array(_)
                | Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)),
                _,
            ) => return Err(incompatible(path, depth, found)),
        };

        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

/// Return a copy of `root` with `value` placed at `path`
///
/// Missing intermediate keys are created as empty objects, never arrays. An
/// index equal to an array's length appends to it.
///
/// # Errors
///
/// Returns a path error if:
/// - The path is the document root
/// - A segment meets a value it cannot traverse
/// - An array index is past the end of the array
#[inline]
pub fn set(root: &Value, path: &PropertyPath, value: Value) -> Result<Value> {
    let Some((last, parents)) = path.segments.split_last() else {
        return Err(OverrideError::path(
            "Cannot set a value at the document root",
        ));
    };

    let mut updated = root.clone();
    let mut current = &mut updated;
    for (depth, segment) in parents.iter().enumerate() {
        current = descend_or_create(current, segment, path, depth)?;
    }

    match (current, last) {
        (Value::Object(map), segment) => {
            map.insert(segment.as_key(), value);
        }
        (Value::Array(items), Segment::Index(index)) => {
            if let Some(slot) = items.get_mut(*index) {
                *slot = value;
            } else if *index == items.len() {
                items.push(value);
            } else {
                return Err(out_of_bounds(path, *index, items.len()));
            }
        }
        (
            found @ (Value::Array(_)
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)),
            _,
        ) => return Err(incompatible(path, parents.len(), found)),
    }

    Ok(updated)
}

fn descend_or_create<'v>(
    node: &'v mut Value,
    segment: &Segment,
    path: &PropertyPath,
    depth: usize,
) -> Result<&'v mut Value> {
    match (node, segment) {
        (Value::Object(map), segment) => Ok(map
            .entry(segment.as_key())
            .or_insert_with(|| Value::Object(Map::new()))),
        (Value::Array(items), Segment::Index(index)) => {
            let len = items.len();
            items
                .get_mut(*index)
                .ok_or_else(|| out_of_bounds(path, *index, len))
        }
        (
            found @ (Value::Array(_)
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)),
            _,
        ) => Err(incompatible(path, depth, found)),
    }
}

fn out_of_bounds(path: &PropertyPath, index: usize, len: usize) -> OverrideError {
    OverrideError::path(format!(
        "Cannot traverse '{path}': index {index} is out of bounds for an array of length {len}"
    ))
}

/// Return a copy of `root` with the value at `path` removed
///
/// Every object on the way to the removed value that is left empty is
/// removed as well, up to (but not including) the root. A path that does not
/// exist, or that runs into a value it cannot traverse, leaves the copy
/// unchanged.
#[must_use]
#[inline]
pub fn delete(root: &Value, path: &PropertyPath) -> Value {
    let mut updated = root.clone();
    remove_at(&mut updated, &path.segments);
    updated
}

/// Remove the value addressed by `segments` below `node`, pruning emptied objects.
/// Returns whether anything was removed.
fn remove_at(node: &mut Value, segments: &[Segment]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };

    match (node, first) {
        (Value::Object(map), segment) => {
            let key = segment.as_key();
            if rest.is_empty() {
                return map.shift_remove(&key).is_some();
            }

            let Some(child) = map.get_mut(&key) else {
                return false;
            };
            let removed = remove_at(child, rest);
            if removed && is_empty_object(child) {
                map.shift_remove(&key);
            }
            removed
        }
        (Value::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                return false;
            }
            if rest.is_empty() {
                items.remove(*index);
                return true;
            }

            let Some(child) = items.get_mut(*index) else {
                return false;
            };
            let removed = remove_at(child, rest);
            if removed && is_empty_object(child) {
                items.remove(*index);
            }
            removed
        }
        (
            Value::Array(_) | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_),
            _,
        ) => false,
    }
}
