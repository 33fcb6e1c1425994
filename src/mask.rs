// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction of named metadata fields.
//!
//! Masking replaces the value at a path with either a caller-chosen alternative or a
//! label derived from the value's runtime category:
//!
//! | Value                   | Label              |
//! |-------------------------|--------------------|
//! | string                  | `[secret String]`  |
//! | number                  | `[secret Number]`  |
//! | date                    | `[secret Date]`    |
//! | object, array, bytes    | `[secret Object]`  |
//! | boolean                 | `[secret Boolean]` |
//! | null                    | `[secret Null]`    |
//! | rewriter                | `[secret Function]`|
//!
//! A path with no value is left alone: masking never inserts a key.
//!
//! Masking mutates the [`Meta`] it is given. [`crate::transform::modify_meta`] takes
//! its meta by value, so a caller that still needs the unmasked original has to
//! clone it first.

use crate::value::{Category, Meta, Value};
use std::collections::BTreeMap;

/// Which fields to mask, and with what.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskSpec {
    /// One path, masked with its default label.
    Field(String),
    /// Several paths, each masked with its default label, in order.
    Fields(Vec<String>),
    /// Paths paired with explicit replacement values, in order.
    Replace(Vec<(String, Value)>),
}

impl MaskSpec {
    /**
    Interprets a `$mask` value.

    Arrays list paths, objects map paths to replacements, strings name a single
    path. Anything else describes no masking and yields `None`.
    */
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(MaskSpec::Fields(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.js_string(),
                    })
                    .collect(),
            )),
            Value::Object(map) => Some(MaskSpec::Replace(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            Value::String(s) => Some(MaskSpec::Field(s.clone())),
            _ => None,
        }
    }
}

impl From<MaskSpec> for Value {
    fn from(spec: MaskSpec) -> Self {
        match spec {
            MaskSpec::Field(path) => Value::String(path),
            MaskSpec::Fields(paths) => Value::from(paths),
            MaskSpec::Replace(pairs) => Value::Object(pairs.into_iter().collect()),
        }
    }
}

impl From<&str> for MaskSpec {
    fn from(path: &str) -> Self {
        MaskSpec::Field(path.to_string())
    }
}

impl From<String> for MaskSpec {
    fn from(path: String) -> Self {
        MaskSpec::Field(path)
    }
}

impl From<Vec<&str>> for MaskSpec {
    fn from(paths: Vec<&str>) -> Self {
        MaskSpec::Fields(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for MaskSpec {
    fn from(paths: Vec<String>) -> Self {
        MaskSpec::Fields(paths)
    }
}

impl<const N: usize> From<[&str; N]> for MaskSpec {
    fn from(paths: [&str; N]) -> Self {
        MaskSpec::Fields(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl From<Vec<(String, Value)>> for MaskSpec {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        MaskSpec::Replace(pairs)
    }
}

impl From<BTreeMap<String, Value>> for MaskSpec {
    fn from(map: BTreeMap<String, Value>) -> Self {
        MaskSpec::Replace(map.into_iter().collect())
    }
}

/// The label a value is replaced with when no alternative is given.
pub fn default_label(value: &Value) -> String {
    let category = match value.category() {
        Category::Bytes | Category::Array | Category::Object => Category::Object,
        other => other,
    };
    format!("[secret {}]", category.name())
}

/**
Replaces the value at `path` with its default label.

Does nothing when `path` has no value.

```rust
use logshim::{mask, meta, Value};

let mut m = meta! { "password" => "hunter2", "retries" => 3 };
mask::mask(&mut m, "password");
mask::mask(&mut m, "missing");
assert_eq!(m.get("password"), Some(&Value::from("[secret String]")));
assert!(!m.contains_key("missing"));
```
*/
pub fn mask(meta: &mut Meta, path: &str) {
    if let Some(slot) = meta.get_path_mut(path) {
        let label = default_label(slot);
        *slot = Value::String(label);
    }
}

/// Replaces the value at `path` with `alternative`. Does nothing when `path` has no value.
pub fn mask_with(meta: &mut Meta, path: &str, alternative: Value) {
    if let Some(slot) = meta.get_path_mut(path) {
        *slot = alternative;
    }
}

/// Applies every mask described by `spec` to `meta`, in order.
pub fn mask_meta(meta: &mut Meta, spec: &MaskSpec) {
    match spec {
        MaskSpec::Field(path) => mask(meta, path),
        MaskSpec::Fields(paths) => {
            for path in paths {
                mask(meta, path);
            }
        }
        MaskSpec::Replace(pairs) => {
            for (path, alternative) in pairs {
                mask_with(meta, path, alternative.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use chrono::{TimeZone, Utc};

    #[test]
    fn default_labels_follow_category() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut m = meta! {
            "s" => "secret",
            "n" => 12.5,
            "d" => date,
            "o" => meta! { "k" => 1 },
            "a" => vec![1, 2],
            "b" => Value::bytes(vec![0u8, 1]),
            "t" => true,
            "z" => Value::Null,
        };
        mask_meta(&mut m, &MaskSpec::from(["s", "n", "d", "o", "a", "b", "t", "z"]));
        assert_eq!(m.get("s"), Some(&Value::from("[secret String]")));
        assert_eq!(m.get("n"), Some(&Value::from("[secret Number]")));
        assert_eq!(m.get("d"), Some(&Value::from("[secret Date]")));
        assert_eq!(m.get("o"), Some(&Value::from("[secret Object]")));
        assert_eq!(m.get("a"), Some(&Value::from("[secret Object]")));
        assert_eq!(m.get("b"), Some(&Value::from("[secret Object]")));
        assert_eq!(m.get("t"), Some(&Value::from("[secret Boolean]")));
        assert_eq!(m.get("z"), Some(&Value::from("[secret Null]")));
    }

    #[test]
    fn masking_a_missing_path_leaves_meta_unchanged() {
        let original = meta! { "a" => 1, "nested" => meta! { "b" => 2 } };
        let mut m = original.clone();
        mask(&mut m, "absent");
        mask(&mut m, "nested.absent");
        mask_with(&mut m, "absent", Value::from("x"));
        assert_eq!(m, original);
    }

    #[test]
    fn explicit_alternatives_are_written_verbatim() {
        let mut m = meta! { "card" => "4111", "pin" => 1234 };
        let spec = MaskSpec::from(vec![
            ("card".to_string(), Value::from("****")),
            ("pin".to_string(), Value::Null),
            ("cvv".to_string(), Value::from("***")),
        ]);
        mask_meta(&mut m, &spec);
        assert_eq!(m.get("card"), Some(&Value::from("****")));
        assert_eq!(m.get("pin"), Some(&Value::Null));
        assert!(!m.contains_key("cvv"));
    }

    #[test]
    fn nested_paths_are_addressable() {
        let mut m = meta! { "user" => meta! { "email" => "a@b.c" } };
        mask(&mut m, "user.email");
        assert_eq!(
            m.get_path("user.email"),
            Some(&Value::from("[secret String]"))
        );
    }

    #[test]
    fn spec_from_value_dispatches_on_shape() {
        assert_eq!(
            MaskSpec::from_value(&Value::from("a")),
            Some(MaskSpec::Field("a".into()))
        );
        assert_eq!(
            MaskSpec::from_value(&Value::from(vec!["a", "b"])),
            Some(MaskSpec::Fields(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            MaskSpec::from_value(&Value::from(meta! { "a" => "x" })),
            Some(MaskSpec::Replace(vec![("a".into(), Value::from("x"))]))
        );
        assert_eq!(MaskSpec::from_value(&Value::from(7)), None);
    }
}
