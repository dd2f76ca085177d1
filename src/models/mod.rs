// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Item, ItemCategory, ItemStatus, MatchPair, MatchRecord, MatchStatus, NewMatch, Notification,
    NotificationType, Profile, ScoredCandidate, ScoringWeights,
};
pub use requests::{FindMatchesRequest, ListMatchesQuery, NotificationRequest, UpdateMatchStatusRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, ListMatchesResponse, NotificationResponse};
