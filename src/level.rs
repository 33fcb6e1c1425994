// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::ParseLevelError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Severity understood by the sinks.
///
/// Ordered from most to least severe, so `Level::Error < Level::Info`.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// A failed operation
    Error,
    /// Suspicious condition
    Warn,
    /// Normal operational messages, the default threshold
    #[default]
    Info,
    Verbose,
    Debug,
    /// Everything
    Silly,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Verbose,
        Level::Debug,
        Level::Silly,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
            Level::Silly => "silly",
        }
    }

    /**
    Whether a message at `self` passes a logger whose threshold is `threshold`.
    */
    pub fn passes(&self, threshold: Level) -> bool {
        *self <= threshold
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("SILLY".parse::<Level>().unwrap(), Level::Silly);
        assert!("fatal".parse::<Level>().is_err());
    }

    #[test]
    fn default_threshold_is_info() {
        assert_eq!(Level::default(), Level::Info);
    }

    #[test]
    fn threshold_admits_more_severe_levels() {
        assert!(Level::Error.passes(Level::Info));
        assert!(Level::Info.passes(Level::Info));
        assert!(!Level::Debug.passes(Level::Info));
    }
}
