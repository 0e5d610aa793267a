//! crates/logging/src/verbosity.rs
//! Mapping from `-v` occurrences to rendered tracing levels.

use tracing::Level;

/// How much diagnostic output an invocation renders.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub enum Verbosity {
    /// Warnings and errors only.
    #[default]
    Normal,
    /// Adds one line per metadata action (`-v`).
    Verbose,
    /// Adds git invocations and merge decisions (`-vv` and above).
    Debug,
}

impl Verbosity {
    /// Creates a verbosity from the number of `-v` flags supplied.
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        match level {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Returns the most verbose level rendered at this verbosity.
    #[must_use]
    pub const fn max_level(self) -> Level {
        match self {
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
        }
    }
}
