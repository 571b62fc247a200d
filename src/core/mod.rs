// Core algorithm exports
pub mod categories;
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod presets;
pub mod scoring;
pub mod selector;

pub use distance::{distance_between, haversine_distance};
pub use matcher::{MatchResult, Matcher};
pub use presets::{Category, CategoryWeights, Preset, WeightConfig};
pub use scoring::{score_batch, score_candidate, ScoredBatch};
pub use selector::{select_strategies, SelectionPolicy};
