//! Back2U Match - item matching and notification service for the Back2U
//! lost-and-found portal.
//!
//! A matching run selects counterpart items for a source item, scores them
//! through a pluggable [`core::MatchScorer`], records every qualifying pair
//! exactly once and notifies both owners.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchPipeline, MatchScorer, PipelineError, MATCH_THRESHOLD, MAX_CANDIDATES};
pub use models::{Item, ItemCategory, ItemStatus, MatchRecord, MatchStatus, ScoredCandidate};
