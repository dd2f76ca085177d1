// Matching pipeline exports
pub mod error;
pub mod heuristic;
pub mod pipeline;
pub mod prompt;
pub mod recorder;
pub mod scorer;
pub mod selector;

pub use error::PipelineError;
pub use heuristic::HeuristicScorer;
pub use pipeline::{MatchPipeline, PipelineOutcome};
pub use recorder::{match_notification, MatchRecorder, RecordOutcome};
pub use scorer::{MatchScorer, ScoringError, MATCH_THRESHOLD};
pub use selector::{CandidateSelector, MAX_CANDIDATES};
