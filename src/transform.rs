// SPDX-License-Identifier: MIT OR Apache-2.0

//! Acting on the reserved `$mask` and `$rewriter` meta keys.
//!
//! [`modify_meta`] masks first, on the meta as given, then hands the masked meta to
//! the rewriter, whose return value replaces it wholesale. Both reserved keys are
//! removed from whatever comes out, whether or not they did anything.
//!
//! Loggers only run this in production environments. Elsewhere the reserved keys
//! travel to the sink untouched.

use crate::error::RewriteError;
use crate::mask::{MaskSpec, mask_meta};
use crate::value::{MASK_KEY, Meta, REWRITER_KEY, Value};

/**
Applies and strips the reserved directives of `meta`.

Takes `meta` by value and returns the same map when no rewriter is set, so a
directive-free meta passes through without a copy.

A rewriter error is returned as is.

```rust
use logshim::{meta, Rewriter, Value};
use logshim::transform::modify_meta;

let mut m = meta! { "token" => "abc", "user" => "alice" };
m.set_mask("token");
m.set_rewriter(Rewriter::new(|mut m| {
    m.insert("rewritten", true);
    m
}));
let out = modify_meta(m).unwrap();
assert_eq!(out.get("token"), Some(&Value::from("[secret String]")));
assert_eq!(out.get("rewritten"), Some(&Value::from(true)));
assert!(!out.contains_key("$mask") && !out.contains_key("$rewriter"));
```
*/
pub fn modify_meta(mut meta: Meta) -> Result<Meta, RewriteError> {
    let spec = meta.get(MASK_KEY).and_then(MaskSpec::from_value);
    let rewriter = match meta.get(REWRITER_KEY) {
        Some(Value::Rewriter(r)) => Some(r.clone()),
        _ => None,
    };

    if let Some(spec) = spec {
        mask_meta(&mut meta, &spec);
    }
    if let Some(rewriter) = rewriter {
        meta = rewriter.rewrite(meta)?;
    }

    meta.remove(MASK_KEY);
    meta.remove(REWRITER_KEY);
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use crate::value::Rewriter;
    use std::sync::{Arc, Mutex};

    #[test]
    fn plain_meta_is_returned_unchanged() {
        let m = meta! { "a" => 1, "b" => "two" };
        assert_eq!(modify_meta(m.clone()).unwrap(), m);
    }

    #[test]
    fn reserved_keys_are_always_stripped() {
        let mut m = meta! { "a" => 1 };
        // neither directive has any effect here
        m.insert(MASK_KEY, 17);
        m.insert(REWRITER_KEY, "not a function");
        let out = modify_meta(m).unwrap();
        assert_eq!(out, meta! { "a" => 1 });
    }

    #[test]
    fn rewriter_sees_masked_meta_and_replaces_it() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in = seen.clone();
        let mut m = meta! { "password" => "pw", "keep" => 1 };
        m.set_mask(vec!["password"]);
        m.set_rewriter(Rewriter::new(move |m| {
            *seen_in.lock().unwrap() = m.get("password").cloned();
            meta! { "replaced" => true }
        }));

        let out = modify_meta(m).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            Some(Value::from("[secret String]"))
        );
        assert_eq!(out, meta! { "replaced" => true });
    }

    #[test]
    fn keys_reintroduced_by_the_rewriter_are_stripped() {
        let mut m = meta! {};
        m.set_rewriter(Rewriter::new(|_| {
            let mut fresh = meta! { "x" => 1 };
            fresh.set_mask("x");
            fresh
        }));
        assert_eq!(modify_meta(m).unwrap(), meta! { "x" => 1 });
    }

    #[test]
    fn rewriter_failure_propagates() {
        let mut m = meta! { "a" => 1 };
        m.set_rewriter(Rewriter::fallible(|_| Err("rewriter exploded".into())));
        let err = modify_meta(m).unwrap_err();
        assert_eq!(err.to_string(), "rewriter exploded");
    }
}
