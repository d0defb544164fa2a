//! Core error type and the fatal-invariant macros.
//!
//! Two failure classes exist in the arena:
//!
//! - **Recoverable** failures (bad configuration, exhausted retry budgets,
//!   same-tick races) are values: sub-crates define their own `thiserror`
//!   enums and wrap `CoreError` via `#[from]` where useful.
//! - **Invariant violations** (grid/entity disagreement, a cell claimed by two
//!   entities, a penalty naming a block that does not exist) mean the shared
//!   spatial state can no longer be trusted.  They go through [`invariant!`]
//!   or [`invariant_failed!`], which log at `error` level and panic.

use thiserror::Error;

/// The top-level error type for `swarm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `swarm-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Assert a spatial-state invariant; log and panic with the formatted
/// diagnostic when it does not hold.
///
/// ```should_panic
/// use swarm_core::invariant;
/// let state = "HAS_BLOCK";
/// invariant!(state == "EMPTY", "cell@(3, 3) in {state}, expected EMPTY");
/// ```
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::invariant_failed!($($arg)+);
        }
    };
}

/// Unconditionally report a violated invariant (log, then panic).
#[macro_export]
macro_rules! invariant_failed {
    ($($arg:tt)+) => {{
        let msg = format!($($arg)+);
        $crate::__tracing::error!(target: "swarm::invariant", "{}", msg);
        panic!("invariant violated: {}", msg);
    }};
}
