// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named timers for [`Sink::profile`](crate::Sink::profile).
//!
//! The first call with a label starts a timer. The second stops it and produces an
//! info record whose message is the label and whose meta carries `durationMs`.

use crate::log_record::Record;
use crate::sys::{Duration, Instant};
use crate::value::Meta;
use crate::Level;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Meta key carrying the elapsed milliseconds of a finished timer.
pub const DURATION_KEY: &str = "durationMs";

#[derive(Debug, Default)]
pub struct Profiler {
    running: Mutex<HashMap<String, Instant>>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `label`, or stops it and returns the time since it started.
    pub fn toggle(&self, label: &str) -> Option<Duration> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        match running.remove(label) {
            Some(started) => Some(started.elapsed()),
            None => {
                running.insert(label.to_string(), Instant::now());
                None
            }
        }
    }

    pub fn is_running(&self, label: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(label)
    }

    /// The record logged when the timer `label` finishes.
    pub fn completion_record(label: &str, elapsed: Duration) -> Record {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let mut meta = Meta::new();
        meta.insert(DURATION_KEY, millis);
        Record::new(Level::Info, label, Some(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn toggle_starts_then_stops() {
        let profiler = Profiler::new();
        assert_eq!(profiler.toggle("load"), None);
        assert!(profiler.is_running("load"));
        assert!(profiler.toggle("load").is_some());
        assert!(!profiler.is_running("load"));
        // a third call starts a fresh timer
        assert_eq!(profiler.toggle("load"), None);
    }

    #[test]
    fn labels_are_independent() {
        let profiler = Profiler::new();
        profiler.toggle("a");
        assert!(!profiler.is_running("b"));
        assert_eq!(profiler.toggle("b"), None);
        assert!(profiler.toggle("a").is_some());
        assert!(profiler.is_running("b"));
    }

    #[test]
    fn completion_record_carries_duration() {
        let record = Profiler::completion_record("load", Duration::from_millis(1500));
        assert_eq!(record.level(), Level::Info);
        assert_eq!(record.message(), "load");
        assert_eq!(
            record.meta().and_then(|m| m.get(DURATION_KEY)),
            Some(&Value::from(1500u64))
        );
    }
}
