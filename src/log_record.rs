// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record handed to sinks.
//!
//! A [`Record`] is what remains of a log call once its arguments have been sorted,
//! its message composed and its meta merged and cleaned: a level, a message that is
//! never empty, optional meta, and the time it was emitted.
//!
//! Records are created fresh for every call and owned by whoever receives them.
//!
//! # Example
//!
//! ```rust
//! use logshim::{meta, Level, Record};
//!
//! let record = Record::new(Level::Info, "user signed in", Some(meta! { "user" => "alice" }));
//! assert_eq!(record.to_string(), r#"info: user signed in {"user":"alice"}"#);
//! ```

use crate::Level;
use crate::value::Meta;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Debug, Display};

/**
A log record.

Sinks receive records by value. The `Display` form is `level: message`, followed by the
meta as compact JSON when there is meta.
*/
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    level: Level,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    timestamp: DateTime<Utc>,
}

impl Record {
    /// Creates a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>, meta: Option<Meta>) -> Self {
        Self {
            level,
            message: message.into(),
            meta,
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn meta_mut(&mut self) -> Option<&mut Meta> {
        self.meta.as_mut()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Serializes the record as one line of JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.level, self.message)?;
        if let Some(meta) = &self.meta {
            let json = serde_json::to_string(meta).map_err(|_| std::fmt::Error)?;
            write!(f, " {}", json)?;
        }
        Ok(())
    }
}
/*
Boilerplate notes for Record:

IMPLEMENTED:
- Debug, Clone: Derived
- PartialEq: Derived, compares timestamps too. Meta may hold rewriters, so no Eq/Hash.
- Display: level, message and JSON meta on one line
- Serialize: for JSON sinks

NOT IMPLEMENTED:
- Default: a record without a message is never produced
- Ord/PartialOrd: ordering by timestamp is a query concern, see QueryOptions
*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    #[test]
    fn display_without_meta_is_level_and_message() {
        let record = Record::new(Level::Warn, "disk almost full", None);
        assert_eq!(record.to_string(), "warn: disk almost full");
    }

    #[test]
    fn json_includes_level_message_and_meta() {
        let record = Record::new(Level::Error, "boom", Some(meta! { "code" => 5 }));
        let json: serde_json::Value = serde_json::from_str(&record.to_json()).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["meta"]["code"], 5);
        assert!(json["timestamp"].is_string());
    }
}
