use crate::models::ScoredCandidate;

/// Check whether a candidate's known distance is inside the cutoff.
///
/// Unknown distance never passes a distance filter.
#[inline]
pub fn within_distance(scored: &ScoredCandidate<'_>, cutoff_km: f64) -> bool {
    scored
        .distance_km
        .map(|km| km <= cutoff_km)
        .unwrap_or(false)
}

/// Check whether a category score reaches `floor` as a fraction of its weight.
/// Floors are inclusive.
#[inline]
pub fn meets_floor(points: u32, weight: u32, floor: f64) -> bool {
    f64::from(points) >= floor * f64::from(weight)
}

/// Check whether the effective price fits the budget.
///
/// Without a budget everything passes; with one, an unknown price cannot be
/// confirmed and fails.
#[inline]
pub fn within_budget(scored: &ScoredCandidate<'_>, budget: Option<f64>) -> bool {
    match budget {
        None => true,
        Some(budget) => scored.price.map(|price| price <= budget).unwrap_or(false),
    }
}
