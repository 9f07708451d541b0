//! Search settings.

use serde::{Deserialize, Serialize};

/// Settings for a [`Searcher`](crate::Searcher).
///
/// Every field has a default, so a partial (or empty) TOML table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Search depth in plies.
    pub depth: u8,
    /// Search without a transposition table when false.
    pub use_tt: bool,
    /// Deepen one ply at a time up to `depth` instead of a single fixed-depth search.
    pub iterative: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            hash_mb: 16,
            depth: 5,
            use_tt: true,
            iterative: true,
        }
    }
}
