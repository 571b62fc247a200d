//! Scoring presets and the weight/threshold resolver.
//!
//! A preset bundles a total point budget, the default weight of each of the
//! six scoring categories, and bucket tables expressed in the preset's own
//! default ("base") points. Bucket values are rescaled to whatever weight is
//! active at lookup time, so a custom weight map never needs its own tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;
use crate::models::Priority;

/// The six fixed scoring dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Location,
    Safety,
    Budget,
    CareType,
    Availability,
    Reputation,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Location,
        Category::Safety,
        Category::Budget,
        Category::CareType,
        Category::Availability,
        Category::Reputation,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Location => "location",
            Category::Safety => "safety",
            Category::Budget => "budget",
            Category::CareType => "care_type",
            Category::Availability => "availability",
            Category::Reputation => "reputation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "location" | "distance" => Ok(Category::Location),
            "safety" | "regulatory" | "regulatory_safety" => Ok(Category::Safety),
            "budget" | "budget_fit" | "cost" => Ok(Category::Budget),
            "care_type" | "care_type_match" | "medical" | "medical_match" => Ok(Category::CareType),
            "availability" => Ok(Category::Availability),
            "reputation" | "reviews" => Ok(Category::Reputation),
            _ => Err(ConfigurationError::UnknownCategory(s.to_string())),
        }
    }
}

/// Integer weight per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryWeights([u32; 6]);

impl CategoryWeights {
    pub const fn new(
        location: u32,
        safety: u32,
        budget: u32,
        care_type: u32,
        availability: u32,
        reputation: u32,
    ) -> Self {
        Self([location, safety, budget, care_type, availability, reputation])
    }

    #[inline]
    pub fn get(&self, category: Category) -> u32 {
        self.0[category.index()]
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

/// Unit the location bands are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

const KM_PER_MILE: f64 = 1.609344;

impl DistanceUnit {
    #[inline]
    pub fn convert_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Miles => km / KM_PER_MILE,
            DistanceUnit::Kilometers => km,
        }
    }
}

/// Upper bound (inclusive) of a bucket and the base points it awards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub up_to: f64,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationThresholds {
    pub unit: DistanceUnit,
    pub bands: &'static [Band],
    /// Beyond the last band, and also used when distance is unknown
    pub beyond: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyThresholds {
    pub outstanding: u32,
    pub good: u32,
    pub requires_improvement: u32,
    pub inadequate: u32,
    pub unrated: u32,
    /// Unscaled points added for a top hygiene rating, removed for a bottom one
    pub hygiene_adjustment: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetThresholds {
    pub within: u32,
    /// Bands over the overage `price - budget`
    pub over: &'static [Band],
    pub beyond: u32,
    pub no_budget: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CareTypeThresholds {
    pub exact: u32,
    pub close: u32,
    pub general: u32,
    pub none: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvailabilityThresholds {
    pub available: u32,
    pub limited: u32,
    pub full: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReputationThresholds {
    pub excellent_rating: f64,
    pub excellent: u32,
    pub good_rating: f64,
    pub good_many: u32,
    pub good_few: u32,
    pub fair_rating: f64,
    pub fair_many: u32,
    pub fair_few: u32,
    /// Review count at which a rating counts as well-established
    pub many_reviews: u32,
}

/// Bucket tables for every category, in base points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdTables {
    pub location: LocationThresholds,
    pub safety: SafetyThresholds,
    pub budget: BudgetThresholds,
    pub care_type: CareTypeThresholds,
    pub availability: AvailabilityThresholds,
    pub reputation: ReputationThresholds,
}

/// Named scoring scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 100-point scheme, distances in miles
    #[default]
    Current,
    /// 50-point scheme, distances in kilometres
    Legacy,
}

impl FromStr for Preset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" | "v2" => Ok(Preset::Current),
            "legacy" | "v1" => Ok(Preset::Legacy),
            _ => Err(ConfigurationError::UnknownPreset(s.to_string())),
        }
    }
}

const CURRENT_TOTAL: u32 = 100;
const CURRENT_WEIGHTS: CategoryWeights = CategoryWeights::new(20, 25, 20, 15, 10, 10);
const CURRENT_THRESHOLDS: ThresholdTables = ThresholdTables {
    location: LocationThresholds {
        unit: DistanceUnit::Miles,
        bands: &[
            Band { up_to: 5.0, points: 20 },
            Band { up_to: 10.0, points: 15 },
            Band { up_to: 15.0, points: 10 },
        ],
        beyond: 5,
    },
    safety: SafetyThresholds {
        outstanding: 25,
        good: 20,
        requires_improvement: 10,
        inadequate: 0,
        unrated: 10,
        hygiene_adjustment: 1,
    },
    budget: BudgetThresholds {
        within: 20,
        over: &[
            Band { up_to: 50.0, points: 15 },
            Band { up_to: 100.0, points: 10 },
            Band { up_to: 200.0, points: 5 },
        ],
        beyond: 0,
        no_budget: 10,
    },
    care_type: CareTypeThresholds {
        exact: 15,
        close: 10,
        general: 5,
        none: 0,
    },
    availability: AvailabilityThresholds {
        available: 10,
        limited: 5,
        full: 0,
        unknown: 5,
    },
    reputation: ReputationThresholds {
        excellent_rating: 4.5,
        excellent: 10,
        good_rating: 4.0,
        good_many: 8,
        good_few: 6,
        fair_rating: 3.5,
        fair_many: 5,
        fair_few: 3,
        many_reviews: 20,
    },
};

const LEGACY_TOTAL: u32 = 50;
const LEGACY_WEIGHTS: CategoryWeights = CategoryWeights::new(10, 12, 10, 8, 5, 5);
const LEGACY_THRESHOLDS: ThresholdTables = ThresholdTables {
    location: LocationThresholds {
        unit: DistanceUnit::Kilometers,
        bands: &[
            Band { up_to: 5.0, points: 10 },
            Band { up_to: 10.0, points: 7 },
            Band { up_to: 20.0, points: 4 },
        ],
        beyond: 1,
    },
    safety: SafetyThresholds {
        outstanding: 12,
        good: 9,
        requires_improvement: 4,
        inadequate: 0,
        unrated: 4,
        hygiene_adjustment: 1,
    },
    budget: BudgetThresholds {
        within: 10,
        over: &[
            Band { up_to: 50.0, points: 7 },
            Band { up_to: 100.0, points: 5 },
            Band { up_to: 200.0, points: 2 },
        ],
        beyond: 0,
        no_budget: 5,
    },
    care_type: CareTypeThresholds {
        exact: 8,
        close: 5,
        general: 3,
        none: 0,
    },
    availability: AvailabilityThresholds {
        available: 5,
        limited: 3,
        full: 0,
        unknown: 2,
    },
    reputation: ReputationThresholds {
        excellent_rating: 4.5,
        excellent: 5,
        good_rating: 4.0,
        good_many: 4,
        good_few: 3,
        fair_rating: 3.5,
        fair_many: 2,
        fair_few: 1,
        many_reviews: 10,
    },
};

impl Preset {
    pub fn total_points(&self) -> u32 {
        match self {
            Preset::Current => CURRENT_TOTAL,
            Preset::Legacy => LEGACY_TOTAL,
        }
    }

    pub fn default_weights(&self) -> CategoryWeights {
        match self {
            Preset::Current => CURRENT_WEIGHTS,
            Preset::Legacy => LEGACY_WEIGHTS,
        }
    }

    pub fn thresholds(&self) -> ThresholdTables {
        match self {
            Preset::Current => CURRENT_THRESHOLDS,
            Preset::Legacy => LEGACY_THRESHOLDS,
        }
    }

    /// Resolve this preset, optionally applying a complete weight override
    pub fn resolve(
        self,
        overrides: Option<&BTreeMap<Category, i64>>,
    ) -> Result<WeightConfig, ConfigurationError> {
        let config = WeightConfig::from_preset(self);
        match overrides {
            Some(weights) => config.with_weights(weights),
            None => Ok(config),
        }
    }
}

/// Resolved, read-only scoring configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightConfig {
    pub preset: Preset,
    pub total_points: u32,
    pub weights: CategoryWeights,
    /// Preset defaults, the reference scale for threshold buckets
    pub base_weights: CategoryWeights,
    pub thresholds: ThresholdTables,
}

impl WeightConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            total_points: preset.total_points(),
            weights: preset.default_weights(),
            base_weights: preset.default_weights(),
            thresholds: preset.thresholds(),
        }
    }

    #[inline]
    pub fn weight(&self, category: Category) -> u32 {
        self.weights.get(category)
    }

    /// Rescale a raw bucket value from base points to the active weight
    #[inline]
    pub fn scaled(&self, category: Category, raw: u32) -> u32 {
        let active = self.weights.get(category);
        let base = self.base_weights.get(category);
        if base == 0 {
            return 0;
        }
        if active == base {
            return raw.min(active);
        }
        let scaled = (f64::from(raw) / f64::from(base) * f64::from(active)).round() as u32;
        scaled.min(active)
    }

    /// Replace the active weights with a complete custom map.
    ///
    /// Every category must be present and non-negative. When the map does not
    /// sum to the preset total it is rescaled proportionally.
    pub fn with_weights(
        &self,
        weights: &BTreeMap<Category, i64>,
    ) -> Result<WeightConfig, ConfigurationError> {
        let mut raw = [0i64; 6];
        for category in Category::ALL {
            let weight = *weights
                .get(&category)
                .ok_or(ConfigurationError::MissingCategory(category))?;
            if weight < 0 {
                return Err(ConfigurationError::NegativeWeight { category, weight });
            }
            raw[category.index()] = weight;
        }

        let rescaled = rescale(raw, self.total_points)?;

        tracing::debug!(
            preset = ?self.preset,
            requested = ?raw,
            resolved = ?rescaled,
            "Resolved custom category weights"
        );

        Ok(WeightConfig {
            weights: CategoryWeights(rescaled),
            ..*self
        })
    }

    /// Derive weights from a requester's ordered priority list.
    ///
    /// Explicit weights are taken as given; priorities without one boost the
    /// active weight by their position. Unlisted categories keep their weight.
    pub fn with_priorities(&self, priorities: &[Priority]) -> Result<WeightConfig, ConfigurationError> {
        if priorities.is_empty() {
            return Ok(*self);
        }

        let mut weights: BTreeMap<Category, i64> = self
            .weights
            .iter()
            .map(|(category, weight)| (category, i64::from(weight)))
            .collect();

        for (position, priority) in priorities.iter().enumerate() {
            let weight = match priority.weight {
                Some(explicit) => i64::from(explicit),
                None => {
                    let boost = PRIORITY_BOOSTS.get(position).copied().unwrap_or(1.0);
                    (f64::from(self.weight(priority.category)) * boost).round() as i64
                }
            };
            weights.insert(priority.category, weight);
        }

        self.with_weights(&weights)
    }
}

/// Multipliers for the first, second and third listed priority
const PRIORITY_BOOSTS: [f64; 3] = [2.0, 1.5, 1.25];

/// Proportionally rescale raw weights so they sum to `total`.
///
/// Each weight is rounded, then the rounding residual is handed out one point
/// at a time by largest fractional remainder so the sum is exact.
fn rescale(raw: [i64; 6], total: u32) -> Result<[u32; 6], ConfigurationError> {
    let sum = raw
        .iter()
        .try_fold(0i64, |acc, &weight| acc.checked_add(weight))
        .ok_or(ConfigurationError::WeightOverflow)?;
    if sum == i64::from(total) {
        // Every weight is non-negative and at most `total` here
        return Ok(raw.map(|weight| weight as u32));
    }
    if sum == 0 {
        return Err(ConfigurationError::ZeroWeightSum { total });
    }

    let ideal = raw.map(|weight| weight as f64 / sum as f64 * f64::from(total));
    let mut rounded = ideal.map(|share| share.round() as i64);

    let mut residual = i64::from(total) - rounded.iter().sum::<i64>();
    let mut order: Vec<usize> = (0..6).collect();

    if residual > 0 {
        // Most under-rounded first
        order.sort_by(|&a, &b| {
            let ra = ideal[a] - rounded[a] as f64;
            let rb = ideal[b] - rounded[b] as f64;
            rb.total_cmp(&ra).then(a.cmp(&b))
        });
        for &i in order.iter().cycle() {
            if residual == 0 {
                break;
            }
            rounded[i] += 1;
            residual -= 1;
        }
    } else if residual < 0 {
        // Most over-rounded first
        order.sort_by(|&a, &b| {
            let ra = ideal[a] - rounded[a] as f64;
            let rb = ideal[b] - rounded[b] as f64;
            ra.total_cmp(&rb).then(a.cmp(&b))
        });
        while residual < 0 {
            let mut adjusted = false;
            for &i in &order {
                if residual == 0 {
                    break;
                }
                if rounded[i] > 0 {
                    rounded[i] -= 1;
                    residual += 1;
                    adjusted = true;
                }
            }
            if !adjusted {
                break;
            }
        }
    }

    Ok(rounded.map(|weight| weight.max(0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map(values: [i64; 6]) -> BTreeMap<Category, i64> {
        Category::ALL.iter().copied().zip(values).collect()
    }

    #[test]
    fn test_preset_defaults_sum_to_total() {
        for preset in [Preset::Current, Preset::Legacy] {
            let config = WeightConfig::from_preset(preset);
            assert_eq!(config.weights.sum(), config.total_points);
        }
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("current".parse::<Preset>().unwrap(), Preset::Current);
        assert_eq!("V1".parse::<Preset>().unwrap(), Preset::Legacy);
        assert!(matches!(
            "v3".parse::<Preset>(),
            Err(ConfigurationError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("medical_match".parse::<Category>().unwrap(), Category::CareType);
        assert_eq!("Care-Type".parse::<Category>().unwrap(), Category::CareType);
        assert!("price".parse::<Category>().is_err());
    }

    #[test]
    fn test_override_already_summing_is_kept() {
        let config = Preset::Current
            .resolve(Some(&full_map([30, 30, 10, 10, 10, 10])))
            .unwrap();
        assert_eq!(config.weights, CategoryWeights::new(30, 30, 10, 10, 10, 10));
    }

    #[test]
    fn test_override_rescaled_to_total() {
        // Sums to 200, halves cleanly
        let config = Preset::Current
            .resolve(Some(&full_map([40, 50, 40, 30, 20, 20])))
            .unwrap();
        assert_eq!(config.weights, CategoryWeights::new(20, 25, 20, 15, 10, 10));
    }

    #[test]
    fn test_rescale_residual_distributed() {
        // 1/6 of 100 each: rounding alone gives 17 * 6 = 102
        let config = Preset::Current.resolve(Some(&full_map([1, 1, 1, 1, 1, 1]))).unwrap();
        assert_eq!(config.weights.sum(), 100);

        // 1/7-ish shares that round down
        let config = Preset::Legacy.resolve(Some(&full_map([1, 1, 1, 1, 1, 2]))).unwrap();
        assert_eq!(config.weights.sum(), 50);
    }

    #[test]
    fn test_override_missing_category() {
        let mut weights = full_map([20, 25, 20, 15, 10, 10]);
        weights.remove(&Category::Availability);
        assert_eq!(
            Preset::Current.resolve(Some(&weights)),
            Err(ConfigurationError::MissingCategory(Category::Availability))
        );
    }

    #[test]
    fn test_override_negative_weight() {
        let result = Preset::Current.resolve(Some(&full_map([20, -5, 20, 15, 10, 10])));
        assert!(matches!(
            result,
            Err(ConfigurationError::NegativeWeight { category: Category::Safety, weight: -5 })
        ));
    }

    #[test]
    fn test_override_all_zero() {
        let result = Preset::Current.resolve(Some(&full_map([0; 6])));
        assert_eq!(result, Err(ConfigurationError::ZeroWeightSum { total: 100 }));
    }

    #[test]
    fn test_override_sum_overflow() {
        let result = Preset::Current.resolve(Some(&full_map([i64::MAX, 1, 1, 1, 1, 1])));
        assert_eq!(result, Err(ConfigurationError::WeightOverflow));

        // A single huge weight still fits and takes the whole total
        let config = Preset::Current
            .resolve(Some(&full_map([i64::MAX, 0, 0, 0, 0, 0])))
            .unwrap();
        assert_eq!(config.weight(Category::Location), 100);
        assert_eq!(config.weights.sum(), 100);
    }

    #[test]
    fn test_scaled_thresholds() {
        let config = Preset::Current
            .resolve(Some(&full_map([40, 10, 20, 10, 10, 10])))
            .unwrap();
        // Location doubled: 15 base points become 30
        assert_eq!(config.scaled(Category::Location, 15), 30);
        // Safety 25 -> 10: 20 base points become 8
        assert_eq!(config.scaled(Category::Safety, 20), 8);
        // Never above the active weight
        assert_eq!(config.scaled(Category::Safety, 40), 10);
    }

    #[test]
    fn test_priorities_boost_and_rescale() {
        let config = WeightConfig::from_preset(Preset::Current);
        let priorities = vec![
            Priority { category: Category::Safety, weight: None },
            Priority { category: Category::Budget, weight: Some(40) },
        ];
        let boosted = config.with_priorities(&priorities).unwrap();
        assert_eq!(boosted.weights.sum(), 100);
        assert!(boosted.weight(Category::Safety) > config.weight(Category::Safety));
        assert!(boosted.weight(Category::Budget) > config.weight(Category::Budget));
        assert!(boosted.weight(Category::Location) < config.weight(Category::Location));
    }
}
