//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# logshim

logshim is a thin logging facade: loose, JavaScript-style log calls in, clean leveled
records out.

# The problem

Application code logs in many shapes. Sometimes a message, sometimes a message with
printf-style params, sometimes an error, sometimes an object of context, often several
of these in whatever order was convenient at the call site.

Backends, on the other hand, want exactly one thing: a level, a message and a bag of
metadata. And before that metadata leaves the process, secrets in it must be hidden.

# The facade

A [`Logger`] accepts an argument list in any of these forms:

```text
log(level, [meta], [error], message, [params...], [callback])
log(level, [error], [meta], [message, params...], [callback])
log(level, message, [params...])
```

and turns it into a single [`Record`] for its [`Sink`]:

* arguments are sorted into message, params, meta, error and callback
  ([`classify`](classify::classify));
* the message is composed sprintf-style ([`format`]);
* the error's fields are merged into the metadata ([`merge`]) and its message is
  appended to the log message;
* in production, the `$mask` and `$rewriter` metadata directives hide and rewrite
  fields before anything reaches the sink ([`transform`], [`mask`]).

```rust
use logshim::{create, init, log_args, meta, ErrorInfo, InitOptions, InMemorySink, LoggerOptions, Value};
use std::sync::Arc;

init(InitOptions::production());
let sink = Arc::new(InMemorySink::new());
let logger = create(LoggerOptions::new("src/billing.rs").sink(sink.clone())).unwrap();

let mut meta = meta! { "card" => "4111 1111 1111 1111", "amount" => 30 };
meta.set_mask("card");
logger.error(log_args![
    ErrorInfo::new("PaymentError", "card declined"),
    meta,
    "charging %s",
    "order-17",
]).unwrap();

let record = sink.drain_records().remove(0);
assert_eq!(record.message(), "charging order-17 && card declined");
let meta = record.meta().unwrap();
assert_eq!(meta.get("card"), Some(&Value::from("[secret String]")));
assert_eq!(meta.get("errorName"), Some(&Value::from("PaymentError")));
assert_eq!(meta.get("filename"), Some(&Value::from("src/billing.rs")));
```

# Sinks

Loggers write to [`GlobalSinks`](global_sink::GlobalSinks) unless given a sink. The
global registry starts out with a [`StdErrSink`]; tests typically swap in an
[`InMemorySink`] with [`set_global_sinks`].

Sinks may also answer queries, stream records and run profiling timers. Those calls are
passed straight through by the logger.
*/

mod level;
mod error;
pub mod value;
mod error_info;
pub mod mask;
pub mod transform;
pub mod merge;
pub mod format;
pub mod classify;
pub mod call;
mod log_record;
mod sink;
mod profile;
mod inmemory_sink;
mod stderr_sink;
pub mod global_sink;
mod environment;
mod facade;
mod macros;
mod sys;

pub use level::Level;
pub use error::{ConfigError, LogError, ParseLevelError, RewriteError, SinkError};
pub use value::{Category, Meta, Rewriter, Value};
pub use error_info::ErrorInfo;
pub use mask::MaskSpec;
pub use classify::LogArg;
pub use log_record::Record;
pub use sink::{Callback, Order, QueryOptions, Sink, StreamOptions};
pub use profile::{DURATION_KEY, Profiler};
pub use inmemory_sink::InMemorySink;
pub use stderr_sink::StdErrSink;
pub use global_sink::{add_global_sink, global_sinks, set_global_sinks};
pub use environment::{Environment, InitOptions, PRODUCTION_ENV_VAR, environment, init};
pub use facade::{Logger, LoggerOptions, MetaAliases, RESERVED_META_KEYS, create};
pub use sys::Duration;
