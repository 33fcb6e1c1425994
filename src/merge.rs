// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding an error into the metadata of a log call.
//!
//! Loggers pick one of two strategies:
//!
//! - [`ErrorMetaStrategy::FixedMerge`] builds meta from the error's `name`, `code`,
//!   `stack` and `detail` (as `errorName`, `errorCode`, `errorStack`, `errorDetail`),
//!   then fills remaining keys from the caller's meta, then from the error's own meta.
//! - [`ErrorMetaStrategy::Hook`] hands the error and meta to a configured function
//!   whose result replaces the meta.

use crate::error_info::ErrorInfo;
use crate::value::{Meta, Value};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type HookFn = dyn Fn(&ErrorInfo, Option<Meta>) -> Option<Meta> + Send + Sync;

/**
A function deciding the meta of a call that carries an error.

Returning `None` keeps the meta the hook was given.
*/
#[derive(Clone)]
pub struct ErrorMetaHook(Arc<HookFn>);

impl ErrorMetaHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ErrorInfo, Option<Meta>) -> Option<Meta> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Returns the meta unchanged and ignores the error.
    pub fn identity() -> Self {
        Self::new(|_, meta| meta)
    }

    /// The fixed merge, as a hook.
    pub fn fixed_merge() -> Self {
        Self::new(|error, meta| Some(fixed_merge(error, meta)))
    }
}

impl Debug for ErrorMetaHook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ErrorMetaHook(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub enum ErrorMetaStrategy {
    #[default]
    FixedMerge,
    Hook(ErrorMetaHook),
}

impl ErrorMetaStrategy {
    pub fn apply(&self, error: &ErrorInfo, meta: Option<Meta>) -> Option<Meta> {
        match self {
            ErrorMetaStrategy::FixedMerge => Some(fixed_merge(error, meta)),
            ErrorMetaStrategy::Hook(hook) => {
                // the hook consumes its input, so keep a copy to fall back on
                let fallback = meta.clone();
                (hook.0)(error, meta).or(fallback)
            }
        }
    }
}

/**
Builds meta with error fields first, then caller meta, then error meta.

Each key keeps the first value it received. Error fields the error does not have are
not inserted, so they can still be filled from either meta.

```rust
use logshim::{meta, ErrorInfo, Value};
use logshim::merge::fixed_merge;

let error = ErrorInfo::new("TypeError", "bad").with_meta(meta! { "a" => 1, "b" => 1 });
let merged = fixed_merge(&error, Some(meta! { "b" => 2, "errorName" => "ignored" }));
assert_eq!(merged.get("errorName"), Some(&Value::from("TypeError")));
assert_eq!(merged.get("a"), Some(&Value::from(1)));
assert_eq!(merged.get("b"), Some(&Value::from(2)));
```
*/
pub fn fixed_merge(error: &ErrorInfo, meta: Option<Meta>) -> Meta {
    let mut merged = Meta::new();
    merged.insert("errorName", Value::String(error.name.clone()));
    if let Some(code) = &error.code {
        merged.insert("errorCode", code.clone());
    }
    if let Some(stack) = &error.stack {
        merged.insert("errorStack", Value::String(stack.clone()));
    }
    if let Some(detail) = &error.detail {
        merged.insert("errorDetail", detail.clone());
    }

    let sources = meta.into_iter().chain(error.meta.iter().cloned());
    for source in sources {
        for (key, value) in source {
            if !merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    fn error() -> ErrorInfo {
        ErrorInfo::new("RangeError", "out of range")
            .with_code("E_RANGE")
            .with_stack("RangeError: out of range\n    at here")
            .with_detail(meta! { "max" => 10 })
            .with_meta(meta! { "shared" => "from error", "only_error" => 1 })
    }

    #[test]
    fn error_fields_win_over_both_metas() {
        let caller = meta! { "errorName" => "caller", "errorCode" => "caller" };
        let merged = fixed_merge(&error(), Some(caller));
        assert_eq!(merged.get("errorName"), Some(&Value::from("RangeError")));
        assert_eq!(merged.get("errorCode"), Some(&Value::from("E_RANGE")));
        assert!(merged.contains_key("errorStack"));
        assert_eq!(merged.get("errorDetail"), Some(&Value::from(meta! { "max" => 10 })));
    }

    #[test]
    fn caller_meta_wins_over_error_meta() {
        let merged = fixed_merge(&error(), Some(meta! { "shared" => "from caller" }));
        assert_eq!(merged.get("shared"), Some(&Value::from("from caller")));
        assert_eq!(merged.get("only_error"), Some(&Value::from(1)));
    }

    #[test]
    fn absent_error_fields_can_be_filled_from_meta() {
        let bare = ErrorInfo::new("Error", "boom");
        let merged = fixed_merge(&bare, Some(meta! { "errorCode" => 7 }));
        assert_eq!(merged.get("errorCode"), Some(&Value::from(7)));
        assert!(!merged.contains_key("errorStack"));
    }

    #[test]
    fn merge_without_any_meta_still_carries_error_fields() {
        let merged = ErrorMetaStrategy::FixedMerge.apply(&error(), None).unwrap();
        assert!(merged.contains_key("errorName"));
        assert!(merged.contains_key("errorStack"));
    }

    #[test]
    fn hook_result_replaces_meta() {
        let hook = ErrorMetaHook::new(|error, _| Some(meta! { "err" => error.message.clone() }));
        let out = ErrorMetaStrategy::Hook(hook).apply(&error(), Some(meta! { "a" => 1 }));
        assert_eq!(out, Some(meta! { "err" => "out of range" }));
    }

    #[test]
    fn hook_returning_none_keeps_original_meta() {
        let hook = ErrorMetaHook::new(|_, _| None);
        let out = ErrorMetaStrategy::Hook(hook).apply(&error(), Some(meta! { "a" => 1 }));
        assert_eq!(out, Some(meta! { "a" => 1 }));
    }

    #[test]
    fn identity_hook_ignores_the_error() {
        let out = ErrorMetaStrategy::Hook(ErrorMetaHook::identity()).apply(&error(), None);
        assert_eq!(out, None);
    }
}
