// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic values carried by log calls.
//!
//! A log call mixes free text, substitution params and a flat metadata object whose
//! values may be of any runtime category. [`Value`] models those categories,
//! and [`Meta`] is the one-level mapping attached to a call.
//!
//! Two keys of a [`Meta`] are reserved: `$mask` holds a mask description and
//! `$rewriter` holds a [`Rewriter`]. See [`crate::transform`] for what happens to them.
//!
//! ```rust
//! use logshim::{meta, Value};
//!
//! let meta = meta! { "user" => "alice", "attempts" => 3 };
//! assert_eq!(meta.get("attempts"), Some(&Value::from(3)));
//! ```

use crate::error::RewriteError;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Reserved key holding a mask description.
pub const MASK_KEY: &str = "$mask";
/// Reserved key holding a [`Rewriter`].
pub const REWRITER_KEY: &str = "$rewriter";

type RewriteFn = dyn Fn(Meta) -> Result<Meta, RewriteError> + Send + Sync;

/**
A function that replaces a whole [`Meta`] with a new one.

Stored under the `$rewriter` key. Rewriters compare equal only to clones of themselves.
*/
#[derive(Clone)]
pub struct Rewriter(Arc<RewriteFn>);

impl Rewriter {
    /// Wraps an infallible rewrite.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Meta) -> Meta + Send + Sync + 'static,
    {
        Self(Arc::new(move |meta| Ok(f(meta))))
    }

    /// Wraps a rewrite that may fail. A failure propagates out of the log call.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(Meta) -> Result<Meta, RewriteError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn rewrite(&self, meta: Meta) -> Result<Meta, RewriteError> {
        (self.0)(meta)
    }
}

impl Debug for Rewriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rewriter(..)")
    }
}

impl PartialEq for Rewriter {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

/// Runtime category of a [`Value`], as used by default mask labels and `%T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Null,
    Boolean,
    Number,
    String,
    Date,
    Bytes,
    Array,
    Object,
    Function,
}

impl Category {
    pub const fn name(&self) -> &'static str {
        match self {
            Category::Null => "Null",
            Category::Boolean => "Boolean",
            Category::Number => "Number",
            Category::String => "String",
            Category::Date => "Date",
            Category::Bytes => "Uint8Array",
            Category::Array => "Array",
            Category::Object => "Object",
            Category::Function => "Function",
        }
    }
}

/// A dynamic value of any runtime category.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Date(DateTime<Utc>),
    /// Binary buffer
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(Meta),
    Rewriter(Rewriter),
}

impl Value {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    pub fn category(&self) -> Category {
        match self {
            Value::Null => Category::Null,
            Value::Bool(_) => Category::Boolean,
            Value::Number(_) => Category::Number,
            Value::String(_) => Category::String,
            Value::Date(_) => Category::Date,
            Value::Bytes(_) => Category::Bytes,
            Value::Array(_) => Category::Array,
            Value::Object(_) => Category::Object,
            Value::Rewriter(_) => Category::Function,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Meta> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /**
    Renders the value as loose string conversion would.

    Objects render as `[object Object]`, arrays as their comma-joined elements
    (where null renders empty), integral numbers without a fraction.
    */
    pub fn js_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_string(n),
            Value::String(s) => s.clone(),
            Value::Date(d) => d
                .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
                .to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Array(items) => join_elements(items.iter()),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Rewriter(_) => "[Function]".to_string(),
        }
    }

    /// Converts into a JSON value. Rewriters become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Joins values with `,`, rendering null elements as empty.
pub(crate) fn join_elements<'a>(items: impl Iterator<Item = &'a Value>) -> String {
    items
        .map(|item| match item {
            Value::Null => String::new(),
            other => other.js_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn number_string(n: &serde_json::Number) -> String {
    if n.is_f64() {
        n.as_f64().map(js_number).unwrap_or_default()
    } else {
        n.to_string()
    }
}

/// Formats a float the way script engines print numbers.
pub(crate) fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Rewriter(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => d.serialize(serializer),
            Value::Bytes(b) => serializer.collect_seq(b.iter()),
            Value::Array(items) => serializer.collect_seq(items.iter()),
            Value::Object(meta) => meta.serialize(serializer),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}
value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no numeric representation and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::from(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Meta> for Value {
    fn from(m: Meta) -> Self {
        Value::Object(m)
    }
}

impl From<Rewriter> for Value {
    fn from(r: Rewriter) -> Self {
        Value::Rewriter(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Splits `a.b[0]["c"]` into segments.
fn path_segments(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();
    let mut after_bracket = false;
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !after_bracket || !current.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                }
                after_bracket = false;
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                }
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                let quoted = inner.len() >= 2
                    && ((inner.starts_with('"') && inner.ends_with('"'))
                        || (inner.starts_with('\'') && inner.ends_with('\'')));
                let segment = if quoted {
                    Segment::Key(inner[1..inner.len() - 1].to_string())
                } else {
                    match inner.parse::<usize>() {
                        Ok(i) => Segment::Index(i),
                        Err(_) => Segment::Key(inner),
                    }
                };
                segments.push(segment);
                after_bracket = true;
            }
            c => {
                current.push(c);
                after_bracket = false;
            }
        }
    }
    if !current.is_empty() || !after_bracket {
        segments.push(Segment::Key(current));
    }
    segments
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(m), Segment::Key(k)) => m.0.get(k),
        (Value::Object(m), Segment::Index(i)) => m.0.get(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        (Value::Array(items), Segment::Key(k)) => k.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(m), Segment::Key(k)) => m.0.get_mut(k),
        (Value::Object(m), Segment::Index(i)) => m.0.get_mut(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get_mut(*i),
        (Value::Array(items), Segment::Key(k)) => {
            k.parse::<usize>().ok().and_then(move |i| items.get_mut(i))
        }
        _ => None,
    }
}

fn root_key(segment: &Segment) -> String {
    match segment {
        Segment::Key(k) => k.clone(),
        Segment::Index(i) => i.to_string(),
    }
}

/**
A flat mapping of contextual key/value pairs attached to a log call.

Keys are unique and iterate in sorted order. Nested objects are allowed as values,
but everything in this crate that rewrites meta only treats the top level.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta(BTreeMap<String, Value>);

impl Meta {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Stores a mask description under `$mask`.
    pub fn set_mask(&mut self, spec: impl Into<crate::mask::MaskSpec>) {
        self.0.insert(MASK_KEY.to_string(), spec.into().into());
    }

    /// Stores a rewriter under `$rewriter`.
    pub fn set_rewriter(&mut self, rewriter: Rewriter) {
        self.0.insert(REWRITER_KEY.to_string(), Value::Rewriter(rewriter));
    }

    /**
    Reads the value at `path`.

    `path` is dotted with optional `[n]` indices. A top-level key spelled exactly
    like `path` takes precedence over splitting it.
    */
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        let segments = path_segments(path);
        let (first, rest) = segments.split_first()?;
        let mut value = self.0.get(&root_key(first))?;
        for segment in rest {
            value = step(value, segment)?;
        }
        Some(value)
    }

    /// Mutable twin of [`Self::get_path`]. Never creates missing entries.
    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        if self.0.contains_key(path) {
            return self.0.get_mut(path);
        }
        let segments = path_segments(path);
        let (first, rest) = segments.split_first()?;
        let mut value = self.0.get_mut(&root_key(first))?;
        for segment in rest {
            value = step_mut(value, segment)?;
        }
        Some(value)
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl Serialize for Meta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // functions have no serialized form; drop the key like JSON encoders do
        serializer.collect_map(
            self.0
                .iter()
                .filter(|(_, value)| !matches!(value, Value::Rewriter(_))),
        )
    }
}

impl From<BTreeMap<String, Value>> for Meta {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Meta {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.0.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for Meta {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Meta {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
