// SPDX-License-Identifier: MIT OR Apache-2.0

//! A log call with explicit roles.
//!
//! [`LogCall`] is the typed counterpart of a loose argument list: the message template,
//! its params, meta, error and callback are each set by name. A classified argument list
//! converts into one with [`LogCall::from_classified`], so both paths share
//! [`LogCall::resolve`].

use crate::classify::{Classified, LogArg};
use crate::error_info::ErrorInfo;
use crate::format::compose;
use crate::log_record::Record;
use crate::merge::ErrorMetaStrategy;
use crate::sink::Callback;
use crate::value::Meta;
use crate::Level;

/// Message of a call that produced no text.
pub const EMPTY_MESSAGE: &str = "(empty message)";
/// Joins a composed message and the error message.
pub const DEFAULT_MESSAGE_CONNECTOR: &str = " && ";

/**
A log call under construction.

```
use logshim::{call::LogCall, meta, ErrorInfo, Level};
use logshim::merge::ErrorMetaStrategy;

let resolved = LogCall::new(Level::Warn)
    .message("retrying %s")
    .param("upload")
    .meta(meta! { "attempt" => 2 })
    .error(ErrorInfo::new("TimeoutError", "timed out"))
    .resolve(" && ", &ErrorMetaStrategy::FixedMerge);
assert_eq!(resolved.message, "retrying upload && timed out");
```
*/
#[derive(Debug)]
pub struct LogCall {
    level: Level,
    template: Option<String>,
    params: Vec<LogArg>,
    meta: Option<Meta>,
    error: Option<ErrorInfo>,
    callback: Option<Callback>,
    rendered: Option<String>,
}

/// A call with its message composed and its error folded into meta.
#[derive(Debug)]
pub struct Resolved {
    pub level: Level,
    /// Never empty.
    pub message: String,
    pub meta: Option<Meta>,
    pub callback: Option<Callback>,
}

impl LogCall {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            template: None,
            params: Vec::new(),
            meta: None,
            error: None,
            callback: None,
            rendered: None,
        }
    }

    pub fn from_classified(level: Level, classified: Classified) -> Self {
        Self {
            level,
            template: classified.template,
            params: classified.params,
            meta: classified.meta,
            error: classified.error,
            callback: classified.callback,
            rendered: classified.rendered,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn param(mut self, param: impl Into<LogArg>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Record) + Send + 'static,
    {
        self.callback = Some(Callback::new(f));
        self
    }

    /**
    Composes the message and applies the error strategy.

    With an error, a non-empty composed message is joined to the error message with
    `connector`, and an empty or missing one is replaced by it. Without a template the
    rendered argument list stands in. Whatever is still empty becomes
    [`EMPTY_MESSAGE`].
    */
    pub fn resolve(self, connector: &str, strategy: &ErrorMetaStrategy) -> Resolved {
        let mut message = self.template.map(|template| compose(&template, &self.params));
        let mut meta = self.meta;

        if let Some(error) = &self.error {
            meta = strategy.apply(error, meta);
            message = Some(match message {
                Some(composed) if !composed.is_empty() => {
                    format!("{composed}{connector}{}", error.message)
                }
                _ => error.message.clone(),
            });
        }

        let message = message
            .or(self.rendered)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| EMPTY_MESSAGE.to_string());

        Resolved {
            level: self.level,
            message,
            meta,
            callback: self.callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::merge::ErrorMetaHook;
    use crate::value::Value;
    use crate::{log_args, meta};

    fn resolve(args: Vec<LogArg>) -> Resolved {
        LogCall::from_classified(Level::Info, classify(args))
            .resolve(DEFAULT_MESSAGE_CONNECTOR, &ErrorMetaStrategy::FixedMerge)
    }

    #[test]
    fn meta_then_template() {
        let resolved = resolve(log_args![meta! { "a" => 1 }, "id=%s", 5]);
        assert_eq!(resolved.message, "id=5");
        assert_eq!(resolved.meta, Some(meta! { "a" => 1 }));
    }

    #[test]
    fn lone_error_supplies_message_and_meta() {
        let error = ErrorInfo::new("Error", "boom").with_stack("Error: boom\n    at main");
        let resolved = resolve(log_args![error]);
        assert_eq!(resolved.message, "boom");
        let meta = resolved.meta.unwrap();
        assert_eq!(meta.get("errorName"), Some(&Value::from("Error")));
        assert_eq!(meta.get("errorStack"), Some(&Value::from("Error: boom\n    at main")));
    }

    #[test]
    fn message_and_error_are_connected() {
        let resolved = resolve(log_args![ErrorInfo::new("Error", "disk full"), "saving %s", "a.txt"]);
        assert_eq!(resolved.message, "saving a.txt && disk full");

        let custom = LogCall::new(Level::Error)
            .message("saving")
            .error(ErrorInfo::new("Error", "disk full"))
            .resolve(" | ", &ErrorMetaStrategy::FixedMerge);
        assert_eq!(custom.message, "saving | disk full");
    }

    #[test]
    fn empty_template_with_error_uses_error_message() {
        let resolved = resolve(log_args![ErrorInfo::new("Error", "nope"), ""]);
        assert_eq!(resolved.message, "nope");
    }

    #[test]
    fn empty_everything_gets_placeholder() {
        assert_eq!(resolve(log_args![""]).message, EMPTY_MESSAGE);
        assert_eq!(resolve(log_args![ErrorInfo::new("Error", "")]).message, EMPTY_MESSAGE);
        assert_eq!(LogCall::new(Level::Info).resolve(" && ", &ErrorMetaStrategy::default()).message, EMPTY_MESSAGE);
    }

    #[test]
    fn rendered_arguments_stand_in() {
        let resolved = resolve(log_args![1, true]);
        assert_eq!(resolved.message, "1,true");
        assert_eq!(resolved.meta, None);
    }

    #[test]
    fn hook_strategy_replaces_meta() {
        let strategy = ErrorMetaStrategy::Hook(ErrorMetaHook::identity());
        let resolved = LogCall::new(Level::Error)
            .meta(meta! { "a" => 1 })
            .error(ErrorInfo::new("Error", "x"))
            .resolve(" && ", &strategy);
        assert_eq!(resolved.meta, Some(meta! { "a" => 1 }));
    }

    #[test]
    fn builder_params_compose() {
        let resolved = LogCall::new(Level::Debug)
            .message("%s + %s = %d")
            .params([1, 2])
            .param(3)
            .resolve(" && ", &ErrorMetaStrategy::default());
        assert_eq!(resolved.message, "1 + 2 = 3");
        assert_eq!(resolved.level, Level::Debug);
    }
}
