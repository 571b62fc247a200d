use serde::Serialize;
use std::fmt;

use crate::core::presets::Category;
use crate::models::domain::Candidate;

/// Per-category points for one candidate against one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub location: u32,
    pub safety: u32,
    pub budget: u32,
    pub care_type: u32,
    pub availability: u32,
    pub reputation: u32,
    pub total: u32,
    #[serde(rename = "maxTotal")]
    pub max_total: u32,
}

impl ScoreBreakdown {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Location => self.location,
            Category::Safety => self.safety,
            Category::Budget => self.budget,
            Category::CareType => self.care_type,
            Category::Availability => self.availability,
            Category::Reputation => self.reputation,
        }
    }
}

/// A candidate together with its breakdown and the derived figures the
/// selector ranks on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    /// Position in the input list, the final tie-breaker
    #[serde(skip)]
    pub index: usize,
    pub breakdown: ScoreBreakdown,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    pub price: Option<f64>,
    /// `total / price`, zero when the price is unknown or not positive
    #[serde(rename = "valueRatio")]
    pub value_ratio: f64,
}

/// Label of a selection slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyLabel {
    SafetyFirst,
    ReputationFirst,
    BestValue,
    /// Extra slot filled by overall total score
    Alternative(usize),
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyLabel::SafetyFirst => f.write_str("safety_first"),
            StrategyLabel::ReputationFirst => f.write_str("reputation_first"),
            StrategyLabel::BestValue => f.write_str("best_value"),
            StrategyLabel::Alternative(n) => write!(f, "alternative_{n}"),
        }
    }
}

/// Structured reason attached to a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    MetEligibility,
    FallbackUnfiltered,
    RerankedAfterDuplicate,
    FilledByTotalScore,
    WithinDistance,
    UnknownDistance,
    TopSafetyTier,
    WithinBudget,
    ExactCareMatch,
    BedsAvailable,
    StrongReputation,
}

/// One filled strategy slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection<'a> {
    pub label: StrategyLabel,
    pub candidate: &'a Candidate,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<ReasonTag>,
}

/// Ordered strategy slots, each referencing a distinct candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionResult<'a> {
    pub selections: Vec<Selection<'a>>,
}

impl<'a> SelectionResult<'a> {
    pub fn get(&self, label: StrategyLabel) -> Option<&Selection<'a>> {
        self.selections.iter().find(|s| s.label == label)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Empty means "no match", not a failure
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = StrategyLabel> + '_ {
        self.selections.iter().map(|s| s.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_lookup() {
        let breakdown = ScoreBreakdown {
            location: 20,
            safety: 25,
            budget: 10,
            care_type: 5,
            availability: 0,
            reputation: 3,
            total: 63,
            max_total: 100,
        };
        assert_eq!(breakdown.get(Category::Safety), 25);
        assert_eq!(breakdown.get(Category::Reputation), 3);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(StrategyLabel::BestValue.to_string(), "best_value");
        assert_eq!(StrategyLabel::Alternative(2).to_string(), "alternative_2");
    }
}
