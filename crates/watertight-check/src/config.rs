//! Check pass configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MemoPolicy
// ---------------------------------------------------------------------------

/// How per-node verdicts are settled when evaluation runs into a cycle.
///
/// The safety engine marks a node as in progress before it looks at the
/// node's neighbors, and a cyclic query of an in-progress node answers "safe
/// unless it has already leaked". A node resolved on the strength of such an
/// answer keeps its verdict even if the in-progress node later turns out to
/// leak. The whole-graph verdict is unaffected (every leak is rooted in some
/// face open to the void, and every reachable node is evaluated), but
/// individual node verdicts can be too optimistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoPolicy {
    /// Verdicts are final once resolved.
    #[default]
    Optimistic,
    /// After evaluation, unsafety is pushed backwards across open faces until
    /// nothing changes, so every node that can reach the void is unsafe.
    Strict,
}

// ---------------------------------------------------------------------------
// CheckConfig
// ---------------------------------------------------------------------------

/// Configuration for a watertightness check pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub memo_policy: MemoPolicy,
    /// Rewrite neighbor links from grid positions before evaluating. When
    /// off, positions are still collected (for the report and overlap
    /// detection) but the authored links are evaluated as they are.
    pub normalize_links: bool,
}

impl Default for CheckConfig {
    /// Optimistic memoization, links normalized.
    fn default() -> Self {
        Self {
            memo_policy: MemoPolicy::Optimistic,
            normalize_links: true,
        }
    }
}

impl CheckConfig {
    /// Default configuration with [`MemoPolicy::Strict`].
    pub fn strict() -> Self {
        Self {
            memo_policy: MemoPolicy::Strict,
            ..Self::default()
        }
    }
}
