// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Tree configuration.

/// Tunables for a versioned tree.
///
/// ```
/// use palimpsest::Config;
///
/// let config = Config::default()
///     .with_max_versions(1 << 16)
///     .with_check_invariants(true);
/// assert_eq!(config.lifting_levels(), 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on issued version ids, version 0 included.
    pub max_versions: u32,
    /// Validate every new snapshot and panic if it is malformed.
    pub check_invariants: bool,
}

impl Config {
    /// Create the default configuration.
    pub fn new() -> Config {
        return Config {
            max_versions: u32::MAX,
            check_invariants: false,
        };
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Config {
        self.max_versions = max_versions.max(1);
        return self;
    }

    pub fn with_check_invariants(mut self, check_invariants: bool) -> Config {
        self.check_invariants = check_invariants;
        return self;
    }

    /// Number of binary lifting levels needed to jump across any
    /// ancestor chain: ceil(log2(max_versions)), at least one.
    pub fn lifting_levels(&self) -> usize {
        let bits = u32::BITS - self.max_versions.saturating_sub(1).leading_zeros();
        return (bits as usize).max(1);
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self::new();
    }
}
