// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide initialization.
//!
//! [`init`] records whether the process runs in production. Loggers read it when they
//! are created: only production loggers apply the `$mask` and `$rewriter` directives.
//! Initialization happens once. Later calls return the first environment and ignore
//! their options.

use std::sync::OnceLock;

/// Environment variable read by [`InitOptions::from_env`].
pub const PRODUCTION_ENV_VAR: &str = "LOGSHIM_PRODUCTION";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InitOptions {
    pub is_production_env: bool,
}

impl InitOptions {
    pub const fn production() -> Self {
        Self {
            is_production_env: true,
        }
    }

    /**
    Reads `LOGSHIM_PRODUCTION`.

    `1`, `true`, `yes` and `on` (any case) mean production. Anything else, including an
    unset variable, does not.
    */
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_production_env = lookup(PRODUCTION_ENV_VAR).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        });
        Self { is_production_env }
    }
}

/// The settings fixed by [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Environment {
    is_production_env: bool,
}

impl Environment {
    /// An environment that is not installed globally. Useful with
    /// [`Logger::with_environment`](crate::Logger::with_environment).
    pub const fn new(options: InitOptions) -> Self {
        Self {
            is_production_env: options.is_production_env,
        }
    }

    pub const fn is_production(&self) -> bool {
        self.is_production_env
    }
}

impl From<InitOptions> for Environment {
    fn from(options: InitOptions) -> Self {
        Self::new(options)
    }
}

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/**
Initializes the process environment and returns it.

Only the first call has an effect.

```
use logshim::{init, InitOptions};

let first = init(InitOptions::default());
let second = init(InitOptions::production());
assert_eq!(first, second);
```
*/
pub fn init(options: InitOptions) -> &'static Environment {
    ENVIRONMENT.get_or_init(|| Environment::new(options))
}

/// The environment set by [`init`], if it ran.
pub fn environment() -> Option<&'static Environment> {
    ENVIRONMENT.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, PRODUCTION_ENV_VAR);
            value.map(str::to_string)
        }
    }

    #[test]
    fn env_values() {
        assert!(InitOptions::from_lookup(lookup(Some("1"))).is_production_env);
        assert!(InitOptions::from_lookup(lookup(Some(" TRUE "))).is_production_env);
        assert!(!InitOptions::from_lookup(lookup(Some("0"))).is_production_env);
        assert!(!InitOptions::from_lookup(lookup(Some("production?"))).is_production_env);
        assert!(!InitOptions::from_lookup(lookup(None)).is_production_env);
    }

    #[test]
    fn init_is_idempotent() {
        let first = init(InitOptions::default());
        let again = init(InitOptions {
            is_production_env: !first.is_production(),
        });
        assert_eq!(first, again);
        assert_eq!(environment(), Some(first));
    }
}
