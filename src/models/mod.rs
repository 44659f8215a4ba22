//! Core data models for the rating tracker.

mod group;
mod hero;
mod level;
mod rating;
mod snapshot;

pub use group::*;
pub use hero::*;
pub use level::*;
pub use rating::*;
pub use snapshot::*;
