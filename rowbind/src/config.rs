//! Connection configuration

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::OpenFlags;

/// Where the database lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// File-based database
    File(PathBuf),
    /// Private in-memory database, discarded on close
    Memory,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::File(path) => write!(f, "{}", path.display()),
            Target::Memory => f.write_str(":memory:"),
        }
    }
}

/// Read-write, creating the file if it is missing
pub fn default_flags() -> OpenFlags { OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE }

/// Configuration for opening a [`Database`](crate::Database)
#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    pub target: Target,
    pub flags: OpenFlags,
    /// Fail when a named bind does not match any parameter, instead of skipping it
    pub strict_names: bool,
    /// Check the stored type of a column before decoding a scalar from it,
    /// instead of relying on SQLite's coercion rules
    pub strict_types: bool,
    pub busy_timeout: Option<Duration>,
}

impl DatabaseConfig {
    pub fn new(target: Target) -> Self {
        Self { target, flags: default_flags(), strict_names: false, strict_types: false, busy_timeout: None }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self { Self::new(Target::File(path.into())) }

    pub fn memory() -> Self { Self::new(Target::Memory) }

    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn strict_names(mut self, strict: bool) -> Self {
        self.strict_names = strict;
        self
    }

    pub fn strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    /// Enables both strict names and strict types
    pub fn strict(self) -> Self { self.strict_names(true).strict_types(true) }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self { Self::memory() }
}
