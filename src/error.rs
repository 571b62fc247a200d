use thiserror::Error;

use crate::core::presets::Category;
use crate::models::CareType;

/// Errors raised while resolving presets and weight overrides
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown scoring category: {0}")]
    UnknownCategory(String),

    #[error("Category {0} is configured more than once")]
    DuplicateCategory(Category),

    #[error("Weight map is missing category {0}")]
    MissingCategory(Category),

    #[error("Negative weight {weight} for category {category}")]
    NegativeWeight { category: Category, weight: i64 },

    #[error("Weights sum to zero and cannot be rescaled to {total} points")]
    ZeroWeightSum { total: u32 },

    #[error("Weights are too large to sum")]
    WeightOverflow,

    #[error("Invalid selection policy: {0}")]
    InvalidPolicy(String),

    #[error("Failed to load settings: {0}")]
    Load(String),
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Load(err.to_string())
    }
}

/// Errors raised while validating the query or an individual candidate record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("Invalid coordinates: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Budget must be a non-negative number, got {0}")]
    NegativeBudget(f64),

    #[error("Maximum distance must be positive, got {0}")]
    InvalidDistance(f64),

    #[error("Unrecognized care type: {0}")]
    UnknownCareType(String),

    #[error("Category {0} appears more than once in priorities")]
    DuplicatePriority(Category),

    #[error("At least one strategy must be requested")]
    NoStrategiesRequested,

    #[error("Candidate record has no id")]
    MissingCandidateId,

    #[error("Invalid price {price} for care type {care_type}")]
    InvalidPrice { care_type: CareType, price: f64 },

    #[error("Review rating must be within 0-5, got {0}")]
    InvalidReviewRating(f64),

    #[error("Hygiene rating must be within 0-5, got {0}")]
    InvalidHygieneRating(u8),

    #[error("Query priorities cannot be resolved: {0}")]
    InvalidPriorities(#[source] ConfigurationError),
}

/// Errors surfaced by a matching call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Invalid input: {0}")]
    InputValidation(#[from] InputValidationError),
}
