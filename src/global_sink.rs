// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide sink management.
//!
//! Loggers created without an explicit sink write to [`GlobalSinks`], which fans each
//! record out to every sink registered here. By default the registry holds a single
//! [`StdErrSink`], so logging works without configuration.
//!
//! # Examples
//!
//! ```
//! use logshim::global_sink::{add_global_sink, global_sinks};
//! use logshim::InMemorySink;
//! use std::sync::Arc;
//!
//! let before = global_sinks().len();
//! add_global_sink(Arc::new(InMemorySink::new()));
//! assert_eq!(global_sinks().len(), before + 1);
//! ```
//!
//! Sinks are reference counted. One removed by [`set_global_sinks`] lives until calls
//! already holding it have finished.

use crate::error::SinkError;
use crate::log_record::Record;
use crate::sink::{Callback, QueryOptions, Sink, StreamOptions};
use crate::stderr_sink::StdErrSink;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static GLOBAL_SINKS: OnceLock<RwLock<Vec<Arc<dyn Sink>>>> = OnceLock::new();

fn registry() -> &'static RwLock<Vec<Arc<dyn Sink>>> {
    GLOBAL_SINKS.get_or_init(|| RwLock::new(vec![Arc::new(StdErrSink::new())]))
}

/// The currently registered sinks.
pub fn global_sinks() -> Vec<Arc<dyn Sink>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Appends a sink to the registry.
pub fn add_global_sink(sink: Arc<dyn Sink>) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(sink);
}

/// Replaces every registered sink. An empty list silently drops records.
pub fn set_global_sinks(sinks: Vec<Arc<dyn Sink>>) {
    *registry().write().unwrap_or_else(PoisonError::into_inner) = sinks;
}

/**
The sink of loggers that were not given one.

Each record goes to every registered sink, read at the time of the call. The callback
runs once, after all of them accepted the record.
*/
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalSinks;

impl Sink for GlobalSinks {
    fn log(&self, record: Record, callback: Option<Callback>) {
        for sink in global_sinks() {
            sink.log(record.clone(), None);
        }
        if let Some(callback) = callback {
            callback.call(&record);
        }
    }

    fn log_async<'s>(
        &'s self,
        record: Record,
        callback: Option<Callback>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 's>> {
        Box::pin(async move {
            for sink in global_sinks() {
                sink.log_async(record.clone(), None).await;
            }
            if let Some(callback) = callback {
                callback.call(&record);
            }
        })
    }

    /// Concatenates the results of every sink that supports queries.
    fn query(&self, options: &QueryOptions) -> Result<Vec<Record>, SinkError> {
        let mut supported = false;
        let mut out = Vec::new();
        for sink in global_sinks() {
            match sink.query(options) {
                Ok(records) => {
                    supported = true;
                    out.extend(records);
                }
                Err(SinkError::Unsupported(_)) => {}
            }
        }
        if supported {
            Ok(out)
        } else {
            Err(SinkError::Unsupported("query"))
        }
    }

    /// Streams from the first sink that supports it.
    fn stream(&self, options: &StreamOptions) -> Result<Receiver<Record>, SinkError> {
        global_sinks()
            .iter()
            .find_map(|sink| sink.stream(options).ok())
            .ok_or(SinkError::Unsupported("stream"))
    }

    fn profile(&self, label: &str) -> Result<(), SinkError> {
        let mut supported = false;
        for sink in global_sinks() {
            supported |= sink.profile(label).is_ok();
        }
        if supported {
            Ok(())
        } else {
            Err(SinkError::Unsupported("profile"))
        }
    }

    fn prepare_to_die(&self) {
        for sink in global_sinks() {
            sink.prepare_to_die();
        }
    }
}
