use crate::core::categories::{
    location_points, score_availability, score_budget, score_care_type, score_reputation,
    score_safety,
};
use crate::core::distance::distance_between;
use crate::core::presets::WeightConfig;
use crate::models::{Candidate, ScoreBreakdown, ScoredCandidate, ValidatedQuery};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Score one candidate against one query.
///
/// Runs every category scorer and keeps each contribution for auditability.
/// Pure and stateless, so candidates can be scored on any thread.
///
/// Scoring formula:
/// total = location + safety + budget + care_type + availability + reputation
/// where each term lies in `[0, weight]` for its category.
pub fn score_candidate<'a>(
    candidate: &'a Candidate,
    index: usize,
    query: &ValidatedQuery,
    config: &WeightConfig,
) -> ScoredCandidate<'a> {
    let distance_km = distance_between(query.origin.as_ref(), candidate.location.as_ref());
    let breakdown = calculate_breakdown(candidate, distance_km, query, config);

    let price = candidate.effective_price(query.care_type);
    let value_ratio = match price {
        Some(price) if price > 0.0 => f64::from(breakdown.total) / price,
        _ => 0.0,
    };

    ScoredCandidate {
        candidate,
        index,
        breakdown,
        distance_km,
        price,
        value_ratio,
    }
}

fn calculate_breakdown(
    candidate: &Candidate,
    distance_km: Option<f64>,
    query: &ValidatedQuery,
    config: &WeightConfig,
) -> ScoreBreakdown {
    let location = location_points(distance_km, config);
    let safety = score_safety(candidate, query, config);
    let budget = score_budget(candidate, query, config);
    let care_type = score_care_type(candidate, query, config);
    let availability = score_availability(candidate, query, config);
    let reputation = score_reputation(candidate, query, config);

    let total = (location + safety + budget + care_type + availability + reputation)
        .min(config.total_points);

    ScoreBreakdown {
        location,
        safety,
        budget,
        care_type,
        availability,
        reputation,
        total,
        max_total: config.total_points,
    }
}

/// Outcome of scoring a whole batch
#[derive(Debug, Clone)]
pub struct ScoredBatch<'a> {
    /// Valid candidates, in input order
    pub scored: Vec<ScoredCandidate<'a>>,
    /// Malformed records that were skipped
    pub skipped: usize,
}

/// Score every candidate, skipping malformed records.
///
/// Each record is checked and scored independently. Output order always
/// follows input order, with or without the `parallel` feature.
pub fn score_batch<'a>(
    candidates: &'a [Candidate],
    query: &ValidatedQuery,
    config: &WeightConfig,
) -> ScoredBatch<'a> {
    let score_one = |(index, candidate): (usize, &'a Candidate)| match candidate.check() {
        Ok(()) => Some(score_candidate(candidate, index, query, config)),
        Err(e) => {
            tracing::warn!(
                candidate_id = %candidate.id,
                index,
                error = %e,
                "Skipping malformed candidate record"
            );
            None
        }
    };

    #[cfg(feature = "parallel")]
    let scored: Vec<ScoredCandidate<'a>> = candidates
        .par_iter()
        .enumerate()
        .filter_map(score_one)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .enumerate()
        .filter_map(score_one)
        .collect();

    let skipped = candidates.len() - scored.len();
    ScoredBatch { scored, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presets::{Category, Preset};
    use crate::models::{AvailabilityStatus, CareType, GeoPoint};
    use std::collections::BTreeMap;

    fn create_test_query() -> ValidatedQuery {
        ValidatedQuery {
            origin: Some(GeoPoint::new(52.4862, -1.8904)),
            budget: Some(1100.0),
            care_type: Some(CareType::Nursing),
            max_distance_km: None,
            priorities: vec![],
        }
    }

    fn create_test_candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Home {}", id),
            location: Some(GeoPoint::new(52.49, -1.90)),
            prices: BTreeMap::from([(CareType::Nursing, 1050.0)]),
            regulatory_rating: Some("Good".to_string()),
            hygiene_rating: Some(4),
            review_rating: Some(4.1),
            review_count: 12,
            beds_available: Some(1),
            availability_status: None,
            care_types: vec![CareType::Nursing],
        }
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let config = WeightConfig::from_preset(Preset::Current);
        let candidate = create_test_candidate("1");
        let scored = score_candidate(&candidate, 0, &create_test_query(), &config);

        let b = scored.breakdown;
        assert_eq!(
            b.total,
            b.location + b.safety + b.budget + b.care_type + b.availability + b.reputation
        );
        assert_eq!(b.max_total, 100);
        // 20 + 20 + 20 + 15 + 10 + 6
        assert_eq!(b.total, 91);
    }

    #[test]
    fn test_each_category_within_weight() {
        for preset in [Preset::Current, Preset::Legacy] {
            let config = WeightConfig::from_preset(preset);
            let mut candidate = create_test_candidate("1");
            candidate.regulatory_rating = Some("Outstanding".to_string());
            candidate.hygiene_rating = Some(5);
            candidate.review_rating = Some(5.0);
            candidate.review_count = 500;

            let scored = score_candidate(&candidate, 0, &create_test_query(), &config);
            for category in Category::ALL {
                assert!(scored.breakdown.get(category) <= config.weight(category));
            }
            assert!(scored.breakdown.total <= config.total_points);
        }
    }

    #[test]
    fn test_value_ratio() {
        let config = WeightConfig::from_preset(Preset::Current);
        let candidate = create_test_candidate("1");
        let scored = score_candidate(&candidate, 0, &create_test_query(), &config);
        assert!((scored.value_ratio - 91.0 / 1050.0).abs() < 1e-12);

        let mut free = create_test_candidate("2");
        free.prices = BTreeMap::from([(CareType::Nursing, 0.0)]);
        let scored = score_candidate(&free, 0, &create_test_query(), &config);
        assert_eq!(scored.value_ratio, 0.0);

        let mut unpriced = create_test_candidate("3");
        unpriced.prices.clear();
        let scored = score_candidate(&unpriced, 0, &create_test_query(), &config);
        assert_eq!(scored.value_ratio, 0.0);
        assert_eq!(scored.price, None);
    }

    #[test]
    fn test_missing_fields_still_scored() {
        let config = WeightConfig::from_preset(Preset::Current);
        let bare = Candidate {
            id: "bare".to_string(),
            ..Candidate::default()
        };
        let scored = score_candidate(&bare, 0, &create_test_query(), &config);

        assert_eq!(scored.distance_km, None);
        // location floor 5 + unrated 10 + neutral budget 10 + unknown availability 5
        assert_eq!(scored.breakdown.total, 30);
    }

    #[test]
    fn test_batch_skips_malformed_and_keeps_order() {
        let config = WeightConfig::from_preset(Preset::Current);
        let mut broken = create_test_candidate("broken");
        broken.review_rating = Some(7.5);
        let mut waiting = create_test_candidate("c");
        waiting.availability_status = Some(AvailabilityStatus::Waiting);

        let candidates = vec![
            create_test_candidate("a"),
            broken,
            create_test_candidate("b"),
            waiting,
        ];
        let batch = score_batch(&candidates, &create_test_query(), &config);

        assert_eq!(batch.skipped, 1);
        let ids: Vec<&str> = batch.scored.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let indices: Vec<usize> = batch.scored.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }
}
