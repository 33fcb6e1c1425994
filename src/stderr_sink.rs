// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::SinkError;
use crate::log_record::Record;
use crate::profile::Profiler;
use crate::sink::{Callback, Sink};

/**
A reference sink that logs to stderr.

Each record is written as its `Display` line. On WASM the browser console method is
picked by level.
 */
#[derive(Debug, Default)]
pub struct StdErrSink {
    profiler: Profiler,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived, required by Sink
// - Default: Derived, the sink has no configuration
// - Clone/Copy: NOT implemented - running profile timers are per sink
// - PartialEq/Eq/Hash: NOT implemented - two sinks with different timers aren't equal
// - Display: NOT implemented - no meaningful string representation for stderr sink
// - Send/Sync: Automatic

impl StdErrSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(record: &Record) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let mut lock = std::io::stderr().lock();
            // nowhere left to report a failed stderr write
            let _ = writeln!(lock, "{}", record);
        }
        #[cfg(target_arch = "wasm32")]
        {
            use crate::Level;
            let msg = record.to_string();
            match record.level() {
                Level::Error => web_sys::console::error_1(&msg.into()),
                Level::Warn => web_sys::console::warn_1(&msg.into()),
                Level::Info => web_sys::console::info_1(&msg.into()),
                Level::Verbose => web_sys::console::log_1(&msg.into()),
                Level::Debug | Level::Silly => web_sys::console::debug_1(&msg.into()),
            }
        }
    }
}

impl Sink for StdErrSink {
    fn log(&self, record: Record, callback: Option<Callback>) {
        Self::write(&record);
        if let Some(callback) = callback {
            callback.call(&record);
        }
    }

    fn log_async<'s>(
        &'s self,
        record: Record,
        callback: Option<Callback>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 's>> {
        // TODO: write through an async stderr handle instead of blocking on the lock
        Box::pin(async move { self.log(record, callback) })
    }

    fn profile(&self, label: &str) -> Result<(), SinkError> {
        if let Some(elapsed) = self.profiler.toggle(label) {
            self.log(Profiler::completion_record(label, elapsed), None);
        }
        Ok(())
    }

    fn prepare_to_die(&self) {
        //nothing to do since we are unbuffered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use crate::sink::QueryOptions;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn log_invokes_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        StdErrSink::new().log(
            Record::new(Level::Debug, "to stderr", None),
            Some(Callback::new(move |_| flag.store(true, Ordering::SeqCst))),
        );
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn query_is_unsupported() {
        let err = StdErrSink::new().query(&QueryOptions::default()).unwrap_err();
        assert_eq!(err, SinkError::Unsupported("query"));
    }
}
