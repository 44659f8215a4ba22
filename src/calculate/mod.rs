//! Rating builders.
//!
//! Pure read computations over the snapshot store:
//! - point-in-time ratings with deltas vs. a reference snapshot
//! - growth ratings between two explicit snapshots
//! - clan/brotherhood standings with cross-snapshot reconciliation
//! - level cohort counts and balance thresholds
//!
//! Snapshots are immutable once ingested, so all of these are safe to run
//! concurrently.

mod groups;
mod growth;
mod levels;
mod overall;

pub use groups::*;
pub use growth::*;
pub use levels::*;
pub use overall::*;

use thiserror::Error;

use crate::params::ParamError;
use crate::storage::StorageError;

/// Errors from rating queries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
