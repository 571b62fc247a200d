//! One scorer per category.
//!
//! Every scorer reads its bucket table in base points, rescales the hit to the
//! active weight and returns a value in `[0, weight]`.

use crate::core::distance::distance_between;
use crate::core::presets::{Band, Category, WeightConfig};
use crate::models::{AvailabilityStatus, Candidate, RegulatoryTier, ValidatedQuery};

/// Pick the points of the first band whose bound covers `value`
#[inline]
fn band_points(bands: &[Band], value: f64, beyond: u32) -> u32 {
    bands
        .iter()
        .find(|band| value <= band.up_to)
        .map(|band| band.points)
        .unwrap_or(beyond)
}

pub fn score_location(candidate: &Candidate, query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let distance_km = distance_between(query.origin.as_ref(), candidate.location.as_ref());
    location_points(distance_km, config)
}

/// Location points for an already computed distance.
/// Unknown distance scores like the farthest bucket.
#[inline]
pub fn location_points(distance_km: Option<f64>, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.location;
    let raw = match distance_km {
        Some(km) => band_points(table.bands, table.unit.convert_km(km), table.beyond),
        None => table.beyond,
    };
    config.scaled(Category::Location, raw)
}

pub fn score_safety(candidate: &Candidate, _query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.safety;
    let raw = match candidate.regulatory_tier() {
        Some(RegulatoryTier::Outstanding) => table.outstanding,
        Some(RegulatoryTier::Good) => table.good,
        Some(RegulatoryTier::RequiresImprovement) => table.requires_improvement,
        Some(RegulatoryTier::Inadequate) => table.inadequate,
        None => table.unrated,
    };

    let weight = i64::from(config.weight(Category::Safety));
    let mut points = i64::from(config.scaled(Category::Safety, raw));

    let adjustment = i64::from(table.hygiene_adjustment);
    match candidate.hygiene_rating {
        Some(5) => points += adjustment,
        Some(0) | Some(1) => points -= adjustment,
        _ => {}
    }

    points.clamp(0, weight) as u32
}

pub fn score_budget(candidate: &Candidate, query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.budget;
    let price = candidate.effective_price(query.care_type);

    let raw = match (query.budget, price) {
        (Some(budget), Some(price)) => {
            let overage = price - budget;
            if overage <= 0.0 {
                table.within
            } else {
                band_points(table.over, overage, table.beyond)
            }
        }
        _ => table.no_budget,
    };
    config.scaled(Category::Budget, raw)
}

pub fn score_care_type(candidate: &Candidate, query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.care_type;
    let offered = &candidate.care_types;

    let raw = match query.care_type {
        None => table.general,
        Some(_) if offered.is_empty() => table.none,
        Some(requested) if offered.contains(&requested) => table.exact,
        Some(requested)
            if requested
                .close_variants()
                .iter()
                .any(|variant| offered.contains(variant)) =>
        {
            table.close
        }
        Some(_) => table.general,
    };
    config.scaled(Category::CareType, raw)
}

pub fn score_availability(candidate: &Candidate, _query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.availability;
    let raw = match candidate.availability() {
        Some(AvailabilityStatus::Available) => table.available,
        Some(AvailabilityStatus::Limited) | Some(AvailabilityStatus::Waiting) => table.limited,
        Some(AvailabilityStatus::Full) => table.full,
        None => table.unknown,
    };
    config.scaled(Category::Availability, raw)
}

pub fn score_reputation(candidate: &Candidate, _query: &ValidatedQuery, config: &WeightConfig) -> u32 {
    let table = &config.thresholds.reputation;
    let rating = match candidate.review_rating {
        Some(rating) if candidate.review_count > 0 => rating,
        _ => return 0,
    };
    let many = candidate.review_count >= table.many_reviews;

    let raw = if rating >= table.excellent_rating {
        table.excellent
    } else if rating >= table.good_rating {
        if many { table.good_many } else { table.good_few }
    } else if rating >= table.fair_rating {
        if many { table.fair_many } else { table.fair_few }
    } else {
        0
    };
    config.scaled(Category::Reputation, raw)
}
