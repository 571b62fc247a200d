use crate::core::presets::{Preset, WeightConfig};
use crate::core::scoring::score_batch;
use crate::core::selector::{select_strategies, SelectionPolicy};
use crate::error::{InputValidationError, MatchError};
use crate::models::{Candidate, Query, ScoredCandidate, SelectionResult};

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub selections: SelectionResult<'a>,
    /// Every valid candidate, best total first
    pub ranked: Vec<ScoredCandidate<'a>>,
    pub total_candidates: usize,
    pub skipped: usize,
}

impl MatchResult<'_> {
    /// True when no candidate could be recommended
    pub fn is_no_match(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Boundary validation of the query
/// 2. Per-query weight resolution (priorities)
/// 3. Per-candidate scoring, in parallel
/// 4. Strategic selection over the complete scored set
#[derive(Debug, Clone)]
pub struct Matcher {
    config: WeightConfig,
    policy: SelectionPolicy,
}

impl Matcher {
    pub fn new(config: WeightConfig, policy: SelectionPolicy) -> Self {
        Self { config, policy }
    }

    pub fn with_preset(preset: Preset) -> Self {
        Self {
            config: WeightConfig::from_preset(preset),
            policy: SelectionPolicy::default(),
        }
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Score and select with the policy's strategy count
    pub fn find_matches<'a>(
        &self,
        candidates: &'a [Candidate],
        query: &Query,
    ) -> Result<MatchResult<'a>, MatchError> {
        self.find_top(candidates, query, self.policy.strategy_count)
    }

    /// Score every candidate and resolve `strategy_count` distinct selections
    ///
    /// # Arguments
    /// * `candidates` - Candidate facilities supplied by the data layer
    /// * `query` - The requester's preferences
    /// * `strategy_count` - Number of selection slots to fill
    ///
    /// # Returns
    /// MatchResult with the selections and the full ranked list. An empty
    /// candidate list is a normal "no match" outcome, not an error.
    pub fn find_top<'a>(
        &self,
        candidates: &'a [Candidate],
        query: &Query,
        strategy_count: usize,
    ) -> Result<MatchResult<'a>, MatchError> {
        let total_candidates = candidates.len();

        // Stage 1: validate before any scoring
        let query = query.check()?;
        if strategy_count == 0 {
            return Err(InputValidationError::NoStrategiesRequested.into());
        }

        // Stage 2: requester priorities reshape the weights for this call only
        let config = self
            .config
            .with_priorities(&query.priorities)
            .map_err(InputValidationError::InvalidPriorities)?;

        // Stage 3: score
        let batch = score_batch(candidates, &query, &config);

        // Stage 4: barrier, then select over the complete set
        let selections =
            select_strategies(&batch.scored, &query, &config, &self.policy, strategy_count)?;

        let mut ranked = batch.scored;
        ranked.sort_by(|a, b| {
            b.breakdown
                .total
                .cmp(&a.breakdown.total)
                .then(a.index.cmp(&b.index))
        });

        if selections.is_empty() {
            tracing::info!(total_candidates, skipped = batch.skipped, "No match");
        } else {
            tracing::info!(
                total_candidates,
                scored = ranked.len(),
                skipped = batch.skipped,
                selections = selections.len(),
                "Matching complete"
            );
        }

        Ok(MatchResult {
            selections,
            ranked,
            total_candidates,
            skipped: batch.skipped,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_preset(Preset::default())
    }
}
