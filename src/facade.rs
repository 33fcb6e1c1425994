// SPDX-License-Identifier: MIT OR Apache-2.0

//! The logger facade.
//!
//! A [`Logger`] is bound to one source file and one [`Sink`]. Every call runs the same
//! pipeline:
//!
//! 1. calls below the logger's level, and calls without arguments, are dropped;
//! 2. loose arguments are classified ([`classify`](crate::classify::classify));
//! 3. the message is composed and the error folded into meta
//!    ([`LogCall::resolve`]);
//! 4. configured meta rewriters run, then, in production, the `$mask` and `$rewriter`
//!    directives are applied ([`modify_meta`]);
//! 5. configured message filters run;
//! 6. the logger's filename is attached under its alias;
//! 7. the record goes to the sink, with the caller's callback.
//!
//! Outside production, `$mask` and `$rewriter` reach the sink untouched.

use crate::call::{DEFAULT_MESSAGE_CONNECTOR, EMPTY_MESSAGE, LogCall, Resolved};
use crate::classify::{LogArg, classify};
use crate::environment::{Environment, environment};
use crate::error::{ConfigError, LogError, SinkError};
use crate::global_sink::GlobalSinks;
use crate::log_record::Record;
use crate::merge::{ErrorMetaHook, ErrorMetaStrategy};
use crate::sink::{Callback, QueryOptions, Sink, StreamOptions};
use crate::transform::modify_meta;
use crate::value::{Meta, Value};
use crate::Level;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// Meta properties the logger fills in itself.
pub const RESERVED_META_KEYS: [&str; 1] = ["filename"];

/// Rewrites the meta of a call before it reaches the sink.
pub type MetaRewriteFn = Arc<dyn Fn(Level, &str, Meta) -> Meta + Send + Sync>;
/// Rewrites the message of a call before it reaches the sink.
pub type MessageFilterFn = Arc<dyn Fn(Level, String, Option<&Meta>) -> String + Send + Sync>;

/**
The meta key each reserved property is written under.

By default every reserved property uses its own name.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaAliases(BTreeMap<String, String>);

impl Default for MetaAliases {
    fn default() -> Self {
        Self(
            RESERVED_META_KEYS
                .iter()
                .map(|key| (key.to_string(), key.to_string()))
                .collect(),
        )
    }
}

impl MetaAliases {
    pub fn set(&mut self, reserved: &str, alias: impl Into<String>) -> Result<(), ConfigError> {
        match self.0.get_mut(reserved) {
            Some(slot) => {
                *slot = alias.into();
                Ok(())
            }
            None => Err(ConfigError::UnknownReservedKey(reserved.to_string())),
        }
    }

    pub fn key_for<'a>(&'a self, reserved: &'a str) -> &'a str {
        self.0.get(reserved).map(String::as_str).unwrap_or(reserved)
    }
}

/**
Options for [`create`] and [`Logger::with_environment`].

```
use logshim::{Level, LoggerOptions};

let options = LoggerOptions::new("src/jobs.rs")
    .level(Level::Debug)
    .message_connector(" | ")
    .meta_alias("filename", "source");
```
*/
#[derive(Clone, Default)]
pub struct LoggerOptions {
    filename: Option<String>,
    message_connector: Option<String>,
    aliases: Vec<(String, String)>,
    attach_filename: Option<bool>,
    error_meta: ErrorMetaStrategy,
    level: Level,
    sink: Option<Arc<dyn Sink>>,
    rewriters: Vec<MetaRewriteFn>,
    filters: Vec<MessageFilterFn>,
}

impl LoggerOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Joins a composed message and an error message. Defaults to `" && "`.
    pub fn message_connector(mut self, connector: impl Into<String>) -> Self {
        self.message_connector = Some(connector.into());
        self
    }

    /// Writes the reserved property `reserved` under `alias`. Checked by the constructor.
    pub fn meta_alias(mut self, reserved: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.push((reserved.into(), alias.into()));
        self
    }

    /// Whether the filename is attached to every record. Defaults to `true`.
    pub fn attach_filename(mut self, attach: bool) -> Self {
        self.attach_filename = Some(attach);
        self
    }

    /// Replaces the fixed error merge with `hook`.
    pub fn modify_meta_when_log_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::ErrorInfo, Option<Meta>) -> Option<Meta> + Send + Sync + 'static,
    {
        self.error_meta = ErrorMetaStrategy::Hook(ErrorMetaHook::new(hook));
        self
    }

    pub fn error_meta_strategy(mut self, strategy: ErrorMetaStrategy) -> Self {
        self.error_meta = strategy;
        self
    }

    /// Least severe level that is logged. Defaults to [`Level::Info`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Defaults to [`GlobalSinks`].
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn rewriter<F>(mut self, f: F) -> Self
    where
        F: Fn(Level, &str, Meta) -> Meta + Send + Sync + 'static,
    {
        self.rewriters.push(Arc::new(f));
        self
    }

    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(Level, String, Option<&Meta>) -> String + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(f));
        self
    }
}

impl Debug for LoggerOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("filename", &self.filename)
            .field("message_connector", &self.message_connector)
            .field("aliases", &self.aliases)
            .field("attach_filename", &self.attach_filename)
            .field("error_meta", &self.error_meta)
            .field("level", &self.level)
            .field("sink", &self.sink)
            .field("rewriters", &self.rewriters.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// A logger bound to one source file.
pub struct Logger {
    filename: String,
    connector: String,
    aliases: MetaAliases,
    attach_filename: bool,
    error_meta: ErrorMetaStrategy,
    level: Level,
    sink: Arc<dyn Sink>,
    rewriters: Vec<MetaRewriteFn>,
    filters: Vec<MessageFilterFn>,
    production: bool,
}

impl Debug for Logger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("filename", &self.filename)
            .field("level", &self.level)
            .field("production", &self.production)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

/**
Creates a logger in the environment set by [`init`](crate::init).

Fails with [`ConfigError::NotInitialized`] before `init`, and with
[`ConfigError::MissingFilename`] when the options carry no filename.
*/
pub fn create(options: LoggerOptions) -> Result<Logger, ConfigError> {
    let environment = environment().ok_or(ConfigError::NotInitialized)?;
    Logger::with_environment(environment, options)
}

macro_rules! level_fns {
    ($(($name:ident, $level:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Logs `args` at [`Level::", stringify!($level), "`].")]
            pub fn $name(&self, args: Vec<LogArg>) -> Result<(), LogError> {
                self.log(Level::$level, args)
            }
        )*
    };
}

impl Logger {
    pub fn with_environment(
        environment: &Environment,
        options: LoggerOptions,
    ) -> Result<Self, ConfigError> {
        let filename = options
            .filename
            .filter(|f| !f.is_empty())
            .ok_or(ConfigError::MissingFilename)?;
        let mut aliases = MetaAliases::default();
        for (reserved, alias) in options.aliases {
            aliases.set(&reserved, alias)?;
        }
        Ok(Self {
            filename,
            connector: options
                .message_connector
                .unwrap_or_else(|| DEFAULT_MESSAGE_CONNECTOR.to_string()),
            aliases,
            attach_filename: options.attach_filename.unwrap_or(true),
            error_meta: options.error_meta,
            level: options.level,
            sink: options.sink.unwrap_or_else(|| Arc::new(GlobalSinks)),
            rewriters: options.rewriters,
            filters: options.filters,
            production: environment.is_production(),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level)
    }

    /**
    Logs a loose argument list at `level`.

    No arguments is a no-op. The only error is a failing `$rewriter`, in which case
    nothing reaches the sink and the callback is not called.
    */
    pub fn log(&self, level: Level, args: Vec<LogArg>) -> Result<(), LogError> {
        if args.is_empty() || !self.enabled(level) {
            return Ok(());
        }
        self.emit(LogCall::from_classified(level, classify(args)))
    }

    /// Logs a call built with explicit roles.
    pub fn emit(&self, call: LogCall) -> Result<(), LogError> {
        if !self.enabled(call.level()) {
            return Ok(());
        }
        let (record, callback) = self.prepare(call)?;
        self.sink.log(record, callback);
        Ok(())
    }

    pub async fn log_async(&self, level: Level, args: Vec<LogArg>) -> Result<(), LogError> {
        if args.is_empty() || !self.enabled(level) {
            return Ok(());
        }
        self.emit_async(LogCall::from_classified(level, classify(args)))
            .await
    }

    pub async fn emit_async(&self, call: LogCall) -> Result<(), LogError> {
        if !self.enabled(call.level()) {
            return Ok(());
        }
        let (record, callback) = self.prepare(call)?;
        self.sink.log_async(record, callback).await;
        Ok(())
    }

    level_fns!(
        (error, Error),
        (warn, Warn),
        (info, Info),
        (verbose, Verbose),
        (debug, Debug),
        (silly, Silly),
    );

    pub fn query(&self, options: &QueryOptions) -> Result<Vec<Record>, SinkError> {
        self.sink.query(options)
    }

    pub fn stream(&self, options: &StreamOptions) -> Result<Receiver<Record>, SinkError> {
        self.sink.stream(options)
    }

    pub fn profile(&self, label: &str) -> Result<(), SinkError> {
        self.sink.profile(label)
    }

    fn prepare(&self, call: LogCall) -> Result<(Record, Option<Callback>), LogError> {
        let Resolved {
            level,
            message,
            meta,
            callback,
        } = call.resolve(&self.connector, &self.error_meta);

        // rewriters see an empty meta on calls that carry none
        let meta = if meta.is_none() && self.rewriters.is_empty() {
            None
        } else {
            let mut meta = meta.unwrap_or_default();
            for rewriter in &self.rewriters {
                meta = rewriter(level, &message, meta);
            }
            if self.production {
                meta = modify_meta(meta).map_err(LogError::Rewrite)?;
            }
            Some(meta)
        };

        let mut message = message;
        for filter in &self.filters {
            message = filter(level, message, meta.as_ref());
        }
        if message.is_empty() {
            message = EMPTY_MESSAGE.to_string();
        }

        let mut meta = meta;
        if self.attach_filename {
            let key = self.aliases.key_for("filename");
            let meta = meta.get_or_insert_with(Meta::new);
            if !meta.contains_key(key) {
                meta.insert(key, Value::String(self.filename.clone()));
            }
        }
        let meta = meta.filter(|m| !m.is_empty());

        Ok((Record::new(level, message, meta), callback))
    }
}

/*
Boilerplate notes for Logger:

- Debug: manual, closures are summarized
- Clone: NOT implemented - share a logger through Arc instead
- PartialEq/Eq/Hash: NOT implemented - loggers hold functions
- Default: NOT implemented - a filename is required
- Send/Sync: Automatic, every part is Send + Sync
*/
