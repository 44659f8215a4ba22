//! Precomputed best-gain rankings.

mod best_window;

pub use best_window::*;
