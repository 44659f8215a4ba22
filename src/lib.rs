//! # Hero Ratings
//!
//! A snapshot-based rating and trend engine for game leaderboard captures.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (heroes, snapshots, rating rows)
//! - **params**: The closed set of selectable metrics and their resolution
//! - **storage**: Snapshot files on disk, ordered by capture time
//! - **ingest**: Normalizing raw capture files into snapshots
//! - **calculate**: Rating, growth, group and level-cohort builders
//! - **cache**: Precomputed best-gain rankings over a trailing window
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod params;
pub mod storage;

pub use models::*;
