//! Care Match - multi-criteria scoring and strategic selection for care facilities
//!
//! This library scores candidate facilities against a requester's preferences
//! and picks a small, diverse set of recommendations under distinct objectives
//! (safest, best reviewed, best value). It performs no I/O: callers supply the
//! candidates and the query, and own the result.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use crate::core::{haversine_distance, Category, MatchResult, Matcher, Preset, SelectionPolicy, WeightConfig};
pub use crate::error::{ConfigurationError, InputValidationError, MatchError};
pub use crate::models::{Candidate, CareType, GeoPoint, Query, ScoreBreakdown, SelectionResult, StrategyLabel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let matcher = Matcher::default();
        assert_eq!(matcher.config().total_points, 100);
        assert_eq!(haversine_distance(51.5, -0.12, 51.5, -0.12), 0.0);
    }
}
