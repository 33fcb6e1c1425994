// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::SinkError;
use crate::log_record::Record;
use crate::Level;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};
use std::sync::mpsc::Receiver;

/**
A single-shot completion function for a log call.

The logger hands it to the sink untouched. Sinks call it once the record has been
accepted.
*/
pub struct Callback(Box<dyn FnOnce(&Record) + Send + 'static>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&Record) + Send + 'static,
    {
        Self(Box::new(f))
    }

    pub fn call(self, record: &Record) {
        (self.0)(record)
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

/// Which stored records a [`Sink::query`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Only records at exactly this level.
    pub level: Option<Level>,
    /// Records to skip, after ordering.
    pub start: usize,
    pub limit: Option<usize>,
    pub order: Order,
    /// Meta keys to keep. `None` keeps all of them.
    pub fields: Option<Vec<String>>,
}

impl QueryOptions {
    pub fn matches(&self, record: &Record) -> bool {
        self.from.is_none_or(|from| record.timestamp() >= from)
            && self.until.is_none_or(|until| record.timestamp() <= until)
            && self.level.is_none_or(|level| record.level() == level)
    }

    /// Filters, orders, pages and projects `records`, which must be oldest first.
    pub fn apply<'a>(&self, records: impl DoubleEndedIterator<Item = &'a Record>) -> Vec<Record> {
        let matching: Box<dyn Iterator<Item = &'a Record> + '_> = match self.order {
            Order::Ascending => Box::new(records.filter(|r| self.matches(r))),
            Order::Descending => Box::new(records.rev().filter(|r| self.matches(r))),
        };
        matching
            .skip(self.start)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|record| self.project(record.clone()))
            .collect()
    }

    fn project(&self, mut record: Record) -> Record {
        if let (Some(fields), Some(meta)) = (&self.fields, record.meta_mut()) {
            let drop: Vec<String> = meta
                .keys()
                .filter(|key| !fields.iter().any(|f| f == key))
                .map(str::to_string)
                .collect();
            for key in drop {
                meta.remove(&key);
            }
        }
        record
    }
}

/// Where a [`Sink::stream`] starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Replay stored records from this index before live ones. `None` streams only new records.
    pub start: Option<usize>,
}

/**
The leveled backend that persists or transports records.

Only [`Sink::log`] and [`Sink::prepare_to_die`] are required. The passthroughs a logger
exposes (`query`, `stream`, `profile`) report [`SinkError::Unsupported`] unless a sink
implements them.
*/
pub trait Sink: Debug + Send + Sync {
    /**
    Accepts a record. When a callback is given, the sink calls it once the record is
    accepted.
    */
    fn log(&self, record: Record, callback: Option<Callback>);

    /**
    Accepts a record asynchronously.

    This allows sinks to reuse an async context that already exists.
    Sinks may choose to implement this as a simple wrapper around [Self::log] if they wish.
    */
    fn log_async<'s>(
        &'s self,
        record: Record,
        callback: Option<Callback>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 's>> {
        Box::pin(async move { self.log(record, callback) })
    }

    fn query(&self, _options: &QueryOptions) -> Result<Vec<Record>, SinkError> {
        Err(SinkError::Unsupported("query"))
    }

    fn stream(&self, _options: &StreamOptions) -> Result<Receiver<Record>, SinkError> {
        Err(SinkError::Unsupported("stream"))
    }

    /**
    Starts the timer named `label`, or, if it is running, stops it and logs the
    elapsed time.
    */
    fn profile(&self, _label: &str) -> Result<(), SinkError> {
        Err(SinkError::Unsupported("profile"))
    }

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}

/*
Boilerplate notes.

# Sink

Clone makes no sense for a sink holding buffers or handles, so copy's out.
PartialEq and Eq are possible but it's unclear if we mean data equality or provenance. Not implemented.
Default is not sensible since who knows how the sink is constructed.
Send/Sync is required: one sink serves every logger and thread.
*/
