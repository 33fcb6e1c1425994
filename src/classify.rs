// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sorting loosely ordered log arguments into their roles.
//!
//! A loose log call takes its arguments in almost any order:
//!
//! ```text
//! log(level, [meta], [error], message, [params...], [callback])
//! log(level, [error], [meta], [message, params...], [callback])
//! log(level, message, [params...])
//! ```
//!
//! [`classify`] decides which argument is which:
//!
//! 1. A trailing callback is taken off the end.
//! 2. The first string among the first three arguments is the message template, and
//!    every argument after it is a substitution param. The arguments before it are
//!    candidates for meta and error.
//! 3. Without such a string, the first two arguments are the candidates.
//! 4. Candidates are visited from last to first. Errors (tagged, or objects with a
//!    string `name` and `message`) become the error, other objects become the meta.
//!    Later visits overwrite earlier ones, so the candidate nearest the front wins.
//! 5. When no template, meta or error came out of this, the whole argument list is
//!    rendered, comma-joined, to stand in for the message.
//!
//! Classification never fails.

use crate::error_info::ErrorInfo;
use crate::sink::Callback;
use crate::value::{Meta, Rewriter, Value};
use chrono::{DateTime, Utc};

/// How many leading arguments are searched for the message template.
const TEMPLATE_WINDOW: usize = 3;
/// How many leading arguments are meta/error candidates when there is no template.
const CANDIDATE_WINDOW: usize = 2;

/// One argument of a loose log call.
#[derive(Debug)]
pub enum LogArg {
    Value(Value),
    Error(ErrorInfo),
    Callback(Callback),
}

impl LogArg {
    /// Tags a [`std::error::Error`] as the call's error.
    pub fn error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        LogArg::Error(ErrorInfo::from_error(error))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(&crate::Record) + Send + 'static,
    {
        LogArg::Callback(Callback::new(f))
    }

    /// Loose string conversion, as used when the whole argument list is rendered.
    pub fn js_string(&self) -> String {
        match self {
            LogArg::Value(v) => v.js_string(),
            LogArg::Error(e) => e.to_string(),
            LogArg::Callback(_) => "[Function]".to_string(),
        }
    }

    fn is_template(&self) -> bool {
        matches!(self, LogArg::Value(Value::String(_)))
    }

    fn is_candidate(&self) -> bool {
        matches!(self, LogArg::Error(_) | LogArg::Value(Value::Object(_)))
    }
}

macro_rules! log_arg_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogArg {
                fn from(v: $t) -> Self {
                    LogArg::Value(Value::from(v))
                }
            }
        )*
    };
}
log_arg_from_value!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool,
    &str, String, &String, Meta, Value, Rewriter, DateTime<Utc>
);

impl<T: Into<Value>> From<Vec<T>> for LogArg {
    fn from(items: Vec<T>) -> Self {
        LogArg::Value(Value::from(items))
    }
}

impl From<ErrorInfo> for LogArg {
    fn from(e: ErrorInfo) -> Self {
        LogArg::Error(e)
    }
}

impl From<Callback> for LogArg {
    fn from(cb: Callback) -> Self {
        LogArg::Callback(cb)
    }
}

/// The roles found in a loose argument list.
#[derive(Debug, Default)]
pub struct Classified {
    pub template: Option<String>,
    pub params: Vec<LogArg>,
    pub meta: Option<Meta>,
    pub error: Option<ErrorInfo>,
    pub callback: Option<Callback>,
    /// The comma-joined argument list, set only when nothing else describes the call.
    pub rendered: Option<String>,
}

/// Renders arguments comma-joined, with null rendering empty.
pub fn render_args(args: &[LogArg]) -> String {
    args.iter()
        .map(|arg| match arg {
            LogArg::Value(Value::Null) => String::new(),
            other => other.js_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/**
Splits `args` into template, params, meta, error and callback.

```rust
use logshim::{classify::classify, log_args, meta, ErrorInfo};

let first = ErrorInfo::new("Error", "first");
let second = ErrorInfo::new("Error", "second");
let parsed = classify(log_args![first.clone(), second, "msg"]);
assert_eq!(parsed.error, Some(first));
assert_eq!(parsed.template.as_deref(), Some("msg"));

let parsed = classify(log_args![meta! { "a" => 1 }, "id=%s", 5]);
assert_eq!(parsed.meta, Some(meta! { "a" => 1 }));
assert_eq!(parsed.params.len(), 1);
```
*/
pub fn classify(mut args: Vec<LogArg>) -> Classified {
    let mut classified = Classified::default();

    if matches!(args.last(), Some(LogArg::Callback(_))) {
        if let Some(LogArg::Callback(cb)) = args.pop() {
            classified.callback = Some(cb);
        }
    }

    let template_index = args
        .iter()
        .take(TEMPLATE_WINDOW)
        .position(LogArg::is_template);

    let candidates = match template_index {
        Some(index) => {
            classified.params = args.split_off(index + 1);
            if let Some(LogArg::Value(Value::String(template))) = args.pop() {
                classified.template = Some(template);
            }
            args
        }
        None => {
            let describable = args.iter().take(CANDIDATE_WINDOW).any(LogArg::is_candidate);
            if !describable && !args.is_empty() {
                classified.rendered = Some(render_args(&args));
            }
            args.truncate(CANDIDATE_WINDOW);
            args
        }
    };

    // tail to head: the candidate nearest the front is written last and wins
    for arg in candidates.into_iter().rev() {
        match arg {
            LogArg::Error(e) => classified.error = Some(e),
            LogArg::Value(Value::Object(object)) => match ErrorInfo::from_object(&object) {
                Some(e) => classified.error = Some(e),
                None => classified.meta = Some(object),
            },
            _ => {}
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_args, meta};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn err(message: &str) -> ErrorInfo {
        ErrorInfo::new("Error", message)
    }

    #[test]
    fn trailing_callback_is_removed() {
        let parsed = classify(log_args!["hello", Callback::new(|_| {})]);
        assert!(parsed.callback.is_some());
        assert_eq!(parsed.template.as_deref(), Some("hello"));
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn callback_not_in_last_position_is_a_param() {
        let parsed = classify(log_args!["a %s", Callback::new(|_| {}), 1]);
        assert!(parsed.callback.is_none());
        assert_eq!(parsed.params.len(), 2);
    }

    #[test]
    fn template_splits_params_and_candidates() {
        let parsed = classify(log_args![meta! { "a" => 1 }, err("e"), "x=%s y=%s", 1, 2]);
        assert_eq!(parsed.template.as_deref(), Some("x=%s y=%s"));
        assert_eq!(parsed.params.len(), 2);
        assert_eq!(parsed.meta, Some(meta! { "a" => 1 }));
        assert_eq!(parsed.error, Some(err("e")));
    }

    #[test]
    fn template_must_be_among_first_three() {
        let parsed = classify(log_args![1, 2, 3, "late"]);
        assert!(parsed.template.is_none());
        assert_eq!(parsed.rendered.as_deref(), Some("1,2,3,late"));
    }

    #[test]
    fn without_template_only_two_candidates_are_considered() {
        let parsed = classify(log_args![1, 2, meta! { "ignored" => true }]);
        assert!(parsed.meta.is_none());
        assert_eq!(parsed.rendered.as_deref(), Some("1,2,[object Object]"));

        let parsed = classify(log_args![err("a"), meta! { "m" => 1 }, meta! { "n" => 2 }]);
        assert_eq!(parsed.error, Some(err("a")));
        assert_eq!(parsed.meta, Some(meta! { "m" => 1 }));
        assert!(parsed.rendered.is_none());
    }

    #[test]
    fn head_of_sequence_wins_ties() {
        let parsed = classify(log_args![err("A"), err("B"), "msg"]);
        assert_eq!(parsed.error, Some(err("A")));

        let parsed = classify(log_args![meta! { "first" => 1 }, meta! { "second" => 2 }]);
        assert_eq!(parsed.meta, Some(meta! { "first" => 1 }));
    }

    #[test]
    fn error_shaped_objects_are_errors() {
        let shaped = meta! { "name" => "TypeError", "message" => "nope" };
        let parsed = classify(log_args![shaped, meta! { "a" => 1 }]);
        assert_eq!(parsed.error, Some(ErrorInfo::new("TypeError", "nope")));
        assert_eq!(parsed.meta, Some(meta! { "a" => 1 }));
    }

    #[test]
    fn arrays_and_scalars_are_not_meta() {
        let parsed = classify(log_args![vec![1, 2], Value::Null]);
        assert!(parsed.meta.is_none());
        assert_eq!(parsed.rendered.as_deref(), Some("1,2,"));
    }

    #[test]
    fn rendering_excludes_the_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let parsed = classify(log_args![
            5,
            Callback::new(move |_| flag.store(true, Ordering::SeqCst))
        ]);
        assert_eq!(parsed.rendered.as_deref(), Some("5"));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn empty_template_is_still_a_template() {
        let parsed = classify(log_args![""]);
        assert_eq!(parsed.template.as_deref(), Some(""));
        assert!(parsed.rendered.is_none());
    }

    #[test]
    fn only_callback_classifies_to_nothing() {
        let parsed = classify(log_args![Callback::new(|_| {})]);
        assert!(parsed.callback.is_some());
        assert!(parsed.template.is_none());
        assert!(parsed.rendered.is_none());
    }
}
