//! Strategic selection over a fully scored candidate set.
//!
//! Strategies resolve in a fixed priority order. Each one filters for
//! eligibility, ranks, and falls back to its unfiltered ranking when nothing is
//! eligible. A candidate already taken by an earlier strategy is never picked
//! again; the later strategy re-ranks over what is left.

use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::filters::{meets_floor, within_budget, within_distance};
use crate::core::presets::{Category, WeightConfig};
use crate::error::{ConfigurationError, InputValidationError};
use crate::models::{
    AvailabilityStatus, ReasonTag, RegulatoryTier, ScoredCandidate, Selection, SelectionResult,
    StrategyLabel, ValidatedQuery,
};

/// Eligibility floors and cutoffs for the selector.
///
/// Floors are fractions of the active category weight.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SelectionPolicy {
    #[serde(default = "default_strategy_count")]
    pub strategy_count: usize,
    #[serde(default = "default_distance_cutoff_km")]
    pub distance_cutoff_km: f64,
    #[serde(default = "default_safety_first_floor")]
    pub safety_first_floor: f64,
    #[serde(default = "default_reputation_floor")]
    pub reputation_floor: f64,
    #[serde(default = "default_baseline_safety_floor")]
    pub reputation_safety_floor: f64,
    #[serde(default = "default_baseline_safety_floor")]
    pub value_safety_floor: f64,
}

fn default_strategy_count() -> usize { 3 }
// 15 miles
fn default_distance_cutoff_km() -> f64 { 24.14 }
fn default_safety_first_floor() -> f64 { 0.8 }
fn default_reputation_floor() -> f64 { 0.6 }
fn default_baseline_safety_floor() -> f64 { 0.4 }

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            strategy_count: default_strategy_count(),
            distance_cutoff_km: default_distance_cutoff_km(),
            safety_first_floor: default_safety_first_floor(),
            reputation_floor: default_reputation_floor(),
            reputation_safety_floor: default_baseline_safety_floor(),
            value_safety_floor: default_baseline_safety_floor(),
        }
    }
}

impl SelectionPolicy {
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if !self.distance_cutoff_km.is_finite() || self.distance_cutoff_km <= 0.0 {
            return Err(ConfigurationError::InvalidPolicy(format!(
                "distance_cutoff_km must be positive, got {}",
                self.distance_cutoff_km
            )));
        }

        let floors = [
            ("safety_first_floor", self.safety_first_floor),
            ("reputation_floor", self.reputation_floor),
            ("reputation_safety_floor", self.reputation_safety_floor),
            ("value_safety_floor", self.value_safety_floor),
        ];
        for (name, floor) in floors {
            if !(0.0..=1.0).contains(&floor) {
                return Err(ConfigurationError::InvalidPolicy(format!(
                    "{} must be within 0-1, got {}",
                    name, floor
                )));
            }
        }

        if self.strategy_count == 0 {
            return Err(ConfigurationError::InvalidPolicy(
                "strategy_count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Named objective with its own eligibility filter and ranking key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    SafetyFirst,
    ReputationFirst,
    BestValue,
}

/// Resolution order of the named strategies
const STRATEGY_ORDER: [Strategy; 3] = [
    Strategy::SafetyFirst,
    Strategy::ReputationFirst,
    Strategy::BestValue,
];

/// Per-call inputs shared by every strategy
struct SelectionContext<'q> {
    config: &'q WeightConfig,
    policy: &'q SelectionPolicy,
    budget: Option<f64>,
    cutoff_km: f64,
}

impl SelectionContext<'_> {
    #[inline]
    fn floor(&self, scored: &ScoredCandidate<'_>, category: Category, floor: f64) -> bool {
        meets_floor(scored.breakdown.get(category), self.config.weight(category), floor)
    }
}

impl Strategy {
    fn label(&self) -> StrategyLabel {
        match self {
            Strategy::SafetyFirst => StrategyLabel::SafetyFirst,
            Strategy::ReputationFirst => StrategyLabel::ReputationFirst,
            Strategy::BestValue => StrategyLabel::BestValue,
        }
    }

    fn is_eligible(&self, scored: &ScoredCandidate<'_>, ctx: &SelectionContext<'_>) -> bool {
        let policy = ctx.policy;
        match self {
            Strategy::SafetyFirst => {
                within_distance(scored, ctx.cutoff_km)
                    && ctx.floor(scored, Category::Safety, policy.safety_first_floor)
            }
            Strategy::ReputationFirst => {
                ctx.floor(scored, Category::Reputation, policy.reputation_floor)
                    && ctx.floor(scored, Category::Safety, policy.reputation_safety_floor)
            }
            Strategy::BestValue => {
                within_budget(scored, ctx.budget)
                    && ctx.floor(scored, Category::Safety, policy.value_safety_floor)
            }
        }
    }

    /// `Less` means `a` ranks ahead of `b`. Input order breaks exact ties.
    fn rank(&self, a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
        let (x, y) = (&a.breakdown, &b.breakdown);
        let by_key = match self {
            Strategy::SafetyFirst => y.safety.cmp(&x.safety).then(y.location.cmp(&x.location)),
            Strategy::ReputationFirst => y
                .reputation
                .cmp(&x.reputation)
                .then(y.safety.cmp(&x.safety)),
            Strategy::BestValue => b
                .value_ratio
                .total_cmp(&a.value_ratio)
                .then(y.budget.cmp(&x.budget))
                .then(y.total.cmp(&x.total)),
        };
        by_key.then(a.index.cmp(&b.index))
    }

    /// Best eligible candidate in `pool`, else the unfiltered best.
    /// The flag reports whether the eligibility filter was met.
    fn pick<'s, 'a>(
        &self,
        pool: &[&'s ScoredCandidate<'a>],
        ctx: &SelectionContext<'_>,
    ) -> Option<(&'s ScoredCandidate<'a>, bool)> {
        let eligible = pool
            .iter()
            .copied()
            .filter(|s| self.is_eligible(s, ctx))
            .min_by(|a, b| self.rank(a, b));

        match eligible {
            Some(best) => Some((best, true)),
            None => pool
                .iter()
                .copied()
                .min_by(|a, b| self.rank(a, b))
                .map(|best| (best, false)),
        }
    }
}

/// Rank for generic slots: total score, then value, then input order
fn rank_by_total(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.breakdown
        .total
        .cmp(&a.breakdown.total)
        .then(b.value_ratio.total_cmp(&a.value_ratio))
        .then(a.index.cmp(&b.index))
}

/// Produce up to `strategy_count` selections, each a distinct candidate.
///
/// Candidates sharing an id count as the same candidate. When fewer distinct
/// candidates exist than slots requested, the result is shorter.
pub fn select_strategies<'a>(
    scored: &[ScoredCandidate<'a>],
    query: &ValidatedQuery,
    config: &WeightConfig,
    policy: &SelectionPolicy,
    strategy_count: usize,
) -> Result<SelectionResult<'a>, InputValidationError> {
    if strategy_count == 0 {
        return Err(InputValidationError::NoStrategiesRequested);
    }

    let ctx = SelectionContext {
        config,
        policy,
        budget: query.budget,
        cutoff_km: query.max_distance_km.unwrap_or(policy.distance_cutoff_km),
    };

    let everyone: Vec<&ScoredCandidate<'a>> = scored.iter().collect();
    let mut used: HashSet<&str> = HashSet::new();
    let mut selections = Vec::with_capacity(strategy_count.min(scored.len()));

    for slot in 0..strategy_count {
        let remaining: Vec<&ScoredCandidate<'a>> = everyone
            .iter()
            .copied()
            .filter(|s| !used.contains(s.candidate.id.as_str()))
            .collect();
        if remaining.is_empty() {
            break;
        }

        let (label, chosen, mut reasons) = match STRATEGY_ORDER.get(slot) {
            Some(strategy) => {
                let Some((chosen, eligible)) = strategy.pick(&remaining, &ctx) else {
                    break;
                };
                let mut reasons = vec![if eligible {
                    ReasonTag::MetEligibility
                } else {
                    ReasonTag::FallbackUnfiltered
                }];

                let first_choice = strategy.pick(&everyone, &ctx).map(|(s, _)| s);
                if first_choice.is_some_and(|s| used.contains(s.candidate.id.as_str())) {
                    reasons.push(ReasonTag::RerankedAfterDuplicate);
                }

                tracing::debug!(
                    strategy = %strategy.label(),
                    candidate_id = %chosen.candidate.id,
                    eligible,
                    "Strategy resolved"
                );
                (strategy.label(), chosen, reasons)
            }
            None => {
                let Some(chosen) = remaining.iter().copied().min_by(|a, b| rank_by_total(a, b))
                else {
                    break;
                };
                let label = StrategyLabel::Alternative(slot + 1 - STRATEGY_ORDER.len());
                (label, chosen, vec![ReasonTag::FilledByTotalScore])
            }
        };

        reasons.extend(describe(chosen, query, &ctx));
        used.insert(chosen.candidate.id.as_str());

        selections.push(Selection {
            label,
            candidate: chosen.candidate,
            breakdown: chosen.breakdown,
            reasons,
        });
    }

    if selections.len() < strategy_count {
        tracing::debug!(
            requested = strategy_count,
            filled = selections.len(),
            "Fewer distinct candidates than requested strategies"
        );
    }

    Ok(SelectionResult { selections })
}

/// Descriptive tags derived from the candidate's scores
fn describe(
    scored: &ScoredCandidate<'_>,
    query: &ValidatedQuery,
    ctx: &SelectionContext<'_>,
) -> Vec<ReasonTag> {
    let mut tags = Vec::new();
    let candidate = scored.candidate;

    match scored.distance_km {
        Some(_) if within_distance(scored, ctx.cutoff_km) => tags.push(ReasonTag::WithinDistance),
        Some(_) => {}
        None => tags.push(ReasonTag::UnknownDistance),
    }
    if candidate.regulatory_tier() == Some(RegulatoryTier::Outstanding) {
        tags.push(ReasonTag::TopSafetyTier);
    }
    if query.budget.is_some() && within_budget(scored, query.budget) {
        tags.push(ReasonTag::WithinBudget);
    }
    if query
        .care_type
        .is_some_and(|requested| candidate.care_types.contains(&requested))
    {
        tags.push(ReasonTag::ExactCareMatch);
    }
    if candidate.availability() == Some(AvailabilityStatus::Available) {
        tags.push(ReasonTag::BedsAvailable);
    }
    if scored.breakdown.reputation > 0
        && ctx.floor(scored, Category::Reputation, ctx.policy.reputation_floor)
    {
        tags.push(ReasonTag::StrongReputation);
    }
    tags
}
