// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AvailabilityStatus, Candidate, CareType, GeoPoint, RegulatoryTier};
pub use requests::{Priority, Query, ValidatedQuery};
pub use responses::{ReasonTag, ScoreBreakdown, ScoredCandidate, Selection, SelectionResult, StrategyLabel};
