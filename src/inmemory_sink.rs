// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides an in-memory sink for testing and debugging purposes.
//! The `InMemorySink` keeps every record it receives rather than writing it out,
//! which makes it ideal for:
//!
//! - Unit testing code that logs through a [`Logger`](crate::Logger)
//! - Programmatically examining the records a call produced
//! - Serving [`query`](crate::Sink::query) and [`stream`](crate::Sink::stream) without any I/O
//!
//! ## Architecture
//!
//! Records live in a `Mutex<Vec<Record>>`, oldest first. Streams are `mpsc` senders kept
//! next to them. Both are locked in the same order on every path, so a stream opened with
//! a replay position sees each record exactly once.

use crate::error::SinkError;
use crate::log_record::Record;
use crate::profile::Profiler;
use crate::sink::{Callback, QueryOptions, Sink, StreamOptions};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A sink that stores records in memory.
///
/// # Example
///
/// ```rust
/// use logshim::{init, InitOptions, InMemorySink, Logger, LoggerOptions, log_args};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let environment = init(InitOptions::default());
/// let logger = Logger::with_environment(
///     environment,
///     LoggerOptions::new("src/app.rs").sink(sink.clone()).attach_filename(false),
/// ).unwrap();
///
/// logger.info(log_args!["Test message %d", 42]).unwrap();
///
/// let logs = sink.drain_logs();
/// assert_eq!(logs, "info: Test message 42");
/// ```
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<Record>>,
    streams: Mutex<Vec<Sender<Record>>>,
    profiler: Profiler,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived, required by Sink
// - Default: Derived, an empty store
// - Clone: NOT implemented - open streams cannot be meaningfully duplicated
// - PartialEq/Eq/Hash: NOT implemented - equality of live buffers is unclear
// - Send/Sync: Automatic through Mutex (required for Sink)

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records, oldest first.
    pub fn records(&self) -> Vec<Record> {
        lock(&self.records).clone()
    }

    /// Removes and returns every stored record, oldest first.
    pub fn drain_records(&self) -> Vec<Record> {
        std::mem::take(&mut *lock(&self.records))
    }

    /// Drains all records into a single string, one `Display`ed record per line.
    ///
    /// The internal buffer is cleared, so a second call returns an empty string unless
    /// new records arrived.
    pub fn drain_logs(&self) -> String {
        self.drain_records()
            .iter()
            .map(Record::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes every stored record to the console and clears the buffer.
    ///
    /// - On native platforms: `eprintln!`
    /// - On WASM: `web_sys::console::log_1`
    pub fn drain_to_console(&self) {
        for record in self.drain_records() {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&record.to_string().into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{}", record);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for InMemorySink {
    fn log(&self, record: Record, callback: Option<Callback>) {
        {
            let mut records = lock(&self.records);
            records.push(record.clone());
            // closed receivers are dropped here
            lock(&self.streams).retain(|tx| tx.send(record.clone()).is_ok());
        }
        if let Some(callback) = callback {
            callback.call(&record);
        }
    }

    fn query(&self, options: &QueryOptions) -> Result<Vec<Record>, SinkError> {
        Ok(options.apply(lock(&self.records).iter()))
    }

    fn stream(&self, options: &StreamOptions) -> Result<Receiver<Record>, SinkError> {
        let (tx, rx) = mpsc::channel();
        let records = lock(&self.records);
        if let Some(start) = options.start {
            for record in records.iter().skip(start) {
                // rx is alive, the send cannot fail
                let _ = tx.send(record.clone());
            }
        }
        lock(&self.streams).push(tx);
        Ok(rx)
    }

    fn profile(&self, label: &str) -> Result<(), SinkError> {
        if let Some(elapsed) = self.profiler.toggle(label) {
            self.log(Profiler::completion_record(label, elapsed), None);
        }
        Ok(())
    }

    /// No-op: nothing is buffered outside memory.
    fn prepare_to_die(&self) {}
}
