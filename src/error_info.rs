// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error values attached to a log call.
//!
//! An error passed to a log call contributes its message to the log message and its
//! fields to the metadata. Callers either tag errors explicitly with [`ErrorInfo`] or
//! pass a plain object that has the shape of one (string `name` and `message`).

use crate::value::{Meta, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// An error, as seen by a log call.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    pub code: Option<Value>,
    pub stack: Option<String>,
    pub detail: Option<Value>,
    /// Extra metadata carried by the error. Caller meta wins over it on key clashes.
    pub meta: Option<Meta>,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: None,
            stack: None,
            detail: None,
            meta: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /**
    Converts any [`std::error::Error`].

    The name is the short type name of `E`; the stack is the rendered chain of
    `source()` errors, when there is one.
    */
    pub fn from_error<E: Error + ?Sized>(error: &E) -> Self {
        let full_name = std::any::type_name::<E>();
        let name = short_type_name(full_name);
        let mut info = Self::new(name, error.to_string());

        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("    caused by: {cause}"));
            source = cause.source();
        }
        if !chain.is_empty() {
            info.stack = Some(format!("{}: {}\n{}", info.name, info.message, chain.join("\n")));
        }
        info
    }

    /**
    Reads an error out of a plain object, if it has the shape of one.

    The object qualifies when `name` and `message` are both strings. `code`, `stack`,
    `detail` and an object-valued `meta` are picked up when present.
    */
    pub fn from_object(object: &Meta) -> Option<Self> {
        let name = object.get("name")?.as_str()?;
        let message = object.get("message")?.as_str()?;
        let mut info = Self::new(name, message);
        info.code = object.get("code").cloned();
        info.stack = object.get("stack").and_then(Value::as_str).map(str::to_string);
        info.detail = object.get("detail").cloned();
        info.meta = object.get("meta").and_then(Value::as_object).cloned();
        Some(info)
    }

    /// Renders the error as a JSON object of its own fields (no name or message).
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(code) = &self.code {
            map.insert("code".to_string(), code.to_json());
        }
        if let Some(stack) = &self.stack {
            map.insert("stack".to_string(), serde_json::Value::String(stack.clone()));
        }
        if let Some(detail) = &self.detail {
            map.insert("detail".to_string(), detail.to_json());
        }
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), Value::Object(meta.clone()).to_json());
        }
        serde_json::Value::Object(map)
    }
}

fn short_type_name(full: &str) -> String {
    // strip generic arguments first so `a::B<c::D>` yields `B`
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl Display for Outer {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("outer failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn from_error_uses_type_name_and_source_chain() {
        let err = Outer(std::io::Error::other("disk gone"));
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.name, "Outer");
        assert_eq!(info.message, "outer failed");
        let stack = info.stack.unwrap();
        assert!(stack.contains("caused by: disk gone"), "{stack}");
    }

    #[test]
    fn from_error_without_source_has_no_stack() {
        let info = ErrorInfo::from_error(&std::fmt::Error);
        assert_eq!(info.name, "Error");
        assert!(info.stack.is_none());
    }

    #[test]
    fn from_object_requires_name_and_message() {
        let shaped = meta! {
            "name" => "TypeError",
            "message" => "bad input",
            "code" => 42,
            "meta" => meta! { "field" => "email" },
        };
        let info = ErrorInfo::from_object(&shaped).unwrap();
        assert_eq!(info.name, "TypeError");
        assert_eq!(info.code, Some(Value::from(42)));
        assert_eq!(info.meta, Some(meta! { "field" => "email" }));

        assert!(ErrorInfo::from_object(&meta! { "message" => "no name" }).is_none());
        assert!(ErrorInfo::from_object(&meta! { "name" => "X", "message" => 1 }).is_none());
    }

    #[test]
    fn display_joins_name_and_message() {
        assert_eq!(ErrorInfo::new("Error", "boom").to_string(), "Error: boom");
        assert_eq!(ErrorInfo::new("Error", "").to_string(), "Error");
    }
}
