// SPDX-License-Identifier: MIT OR Apache-2.0

//! Macros for building metadata and loose log calls.

/**
Builds a [`Meta`](crate::Meta) from `key => value` pairs.

Values go through `Into<Value>`, so nested `meta!` calls, vectors, numbers and strings
all work.

```rust
use logshim::{meta, Value};

let meta = meta! { "user" => "alice", "roles" => vec!["admin"], "limits" => meta! { "rpm" => 60 } };
assert_eq!(meta.get_path("limits.rpm"), Some(&Value::from(60)));
assert!(meta! {}.is_empty());
```
*/
#[macro_export]
macro_rules! meta {
    () => {
        $crate::Meta::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut meta = $crate::Meta::new();
        $( meta.insert($key, $value); )+
        meta
    }};
}

/**
Converts each argument into a [`LogArg`](crate::LogArg).

```rust
use logshim::{log_args, meta, LogArg};

let args: Vec<LogArg> = log_args![meta! { "id" => 7 }, "loaded %s", "config"];
assert_eq!(args.len(), 3);
```
*/
#[macro_export]
macro_rules! log_args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::LogArg::from($arg)),*]
    };
}

/**
Logs a loose argument list on `logger` at `level`.

Expands to [`Logger::log`](crate::Logger::log) and evaluates to its result.

```rust
use logshim::{init, log, InitOptions, InMemorySink, Level, Logger, LoggerOptions};
use std::sync::Arc;

let sink = Arc::new(InMemorySink::new());
let logger = Logger::with_environment(
    init(InitOptions::default()),
    LoggerOptions::new("src/main.rs").sink(sink.clone()).attach_filename(false),
).unwrap();

log!(logger, Level::Warn, "%d files skipped", 3).unwrap();
assert_eq!(sink.drain_logs(), "warn: 3 files skipped");
```
*/
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {
        $logger.log($level, $crate::log_args![$($arg),*])
    };
}
