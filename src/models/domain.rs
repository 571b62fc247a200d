use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::InputValidationError;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Range-check the coordinates, rejecting NaN as well
    pub fn check(&self) -> Result<(), InputValidationError> {
        let finite = self.latitude.is_finite() && self.longitude.is_finite();
        if !finite || self.validate().is_err() {
            return Err(InputValidationError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

/// Care type tags a facility can offer and a requester can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareType {
    Residential,
    Nursing,
    Dementia,
    NursingDementia,
    Respite,
}

impl CareType {
    pub const ALL: [CareType; 5] = [
        CareType::Residential,
        CareType::Nursing,
        CareType::Dementia,
        CareType::NursingDementia,
        CareType::Respite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareType::Residential => "residential",
            CareType::Nursing => "nursing",
            CareType::Dementia => "dementia",
            CareType::NursingDementia => "nursing_dementia",
            CareType::Respite => "respite",
        }
    }

    /// Specialised variants that count as a close match for this requested type
    pub fn close_variants(&self) -> &'static [CareType] {
        match self {
            CareType::Residential => &[CareType::Dementia],
            CareType::Nursing => &[CareType::NursingDementia],
            CareType::Dementia => &[CareType::NursingDementia],
            CareType::NursingDementia => &[CareType::Dementia, CareType::Nursing],
            CareType::Respite => &[],
        }
    }
}

impl fmt::Display for CareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CareType {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        match token.as_str() {
            "residential" => Ok(CareType::Residential),
            "nursing" => Ok(CareType::Nursing),
            "dementia" | "residential_dementia" => Ok(CareType::Dementia),
            "nursing_dementia" | "dementia_nursing" => Ok(CareType::NursingDementia),
            "respite" => Ok(CareType::Respite),
            _ => Err(InputValidationError::UnknownCareType(s.to_string())),
        }
    }
}

/// Regulatory inspection tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryTier {
    Outstanding,
    Good,
    RequiresImprovement,
    Inadequate,
}

impl RegulatoryTier {
    /// Map free rating text to a tier. Unrecognized text is treated as unrated.
    pub fn parse(text: &str) -> Option<Self> {
        match normalize_token(text).as_str() {
            "outstanding" => Some(RegulatoryTier::Outstanding),
            "good" => Some(RegulatoryTier::Good),
            "requires_improvement" => Some(RegulatoryTier::RequiresImprovement),
            "inadequate" => Some(RegulatoryTier::Inadequate),
            _ => None,
        }
    }
}

/// Bed availability as reported by the data layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Limited,
    Waiting,
    Full,
}

/// Candidate facility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Weekly price per care type
    #[serde(rename = "pricesByCareType", default)]
    pub prices: BTreeMap<CareType, f64>,
    #[serde(rename = "regulatoryRating", default)]
    pub regulatory_rating: Option<String>,
    #[serde(rename = "hygieneRating", default)]
    pub hygiene_rating: Option<u8>,
    #[serde(rename = "reviewRating", default)]
    pub review_rating: Option<f64>,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(rename = "bedsAvailable", default)]
    pub beds_available: Option<u32>,
    #[serde(rename = "availabilityStatus", default)]
    pub availability_status: Option<AvailabilityStatus>,
    #[serde(rename = "careTypes", default)]
    pub care_types: Vec<CareType>,
}

impl Candidate {
    /// Reject records the scorers cannot interpret
    pub fn check(&self) -> Result<(), InputValidationError> {
        if self.id.trim().is_empty() {
            return Err(InputValidationError::MissingCandidateId);
        }

        if let Some(location) = &self.location {
            location.check()?;
        }

        for (care_type, price) in &self.prices {
            if !price.is_finite() || *price < 0.0 {
                return Err(InputValidationError::InvalidPrice {
                    care_type: *care_type,
                    price: *price,
                });
            }
        }

        if let Some(rating) = self.review_rating {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(InputValidationError::InvalidReviewRating(rating));
            }
        }

        if let Some(hygiene) = self.hygiene_rating {
            if hygiene > 5 {
                return Err(InputValidationError::InvalidHygieneRating(hygiene));
            }
        }

        Ok(())
    }

    pub fn regulatory_tier(&self) -> Option<RegulatoryTier> {
        self.regulatory_rating
            .as_deref()
            .and_then(RegulatoryTier::parse)
    }

    /// Explicit status wins, otherwise fall back to the bed count
    pub fn availability(&self) -> Option<AvailabilityStatus> {
        match (self.availability_status, self.beds_available) {
            (Some(status), _) => Some(status),
            (None, Some(0)) => Some(AvailabilityStatus::Full),
            (None, Some(_)) => Some(AvailabilityStatus::Available),
            (None, None) => None,
        }
    }

    /// Price for the requested care type, else the cheapest listed price
    pub fn effective_price(&self, care_type: Option<CareType>) -> Option<f64> {
        care_type
            .and_then(|requested| self.prices.get(&requested).copied())
            .or_else(|| {
                self.prices
                    .values()
                    .copied()
                    .min_by(|a, b| a.total_cmp(b))
            })
    }
}

/// Lowercase, trim, and fold spaces/hyphens into underscores
fn normalize_token(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_care_type_parsing() {
        assert_eq!("Nursing".parse::<CareType>().unwrap(), CareType::Nursing);
        assert_eq!(
            " residential-dementia ".parse::<CareType>().unwrap(),
            CareType::Dementia
        );
        assert_eq!(
            "Dementia Nursing".parse::<CareType>().unwrap(),
            CareType::NursingDementia
        );
        assert!(matches!(
            "hospice".parse::<CareType>(),
            Err(InputValidationError::UnknownCareType(_))
        ));
    }

    #[test]
    fn test_regulatory_tier_parsing() {
        assert_eq!(
            RegulatoryTier::parse("Requires Improvement"),
            Some(RegulatoryTier::RequiresImprovement)
        );
        assert_eq!(RegulatoryTier::parse("OUTSTANDING"), Some(RegulatoryTier::Outstanding));
        assert_eq!(RegulatoryTier::parse("Not yet inspected"), None);
    }

    #[test]
    fn test_availability_resolution() {
        let mut candidate = Candidate {
            id: "c1".to_string(),
            ..Candidate::default()
        };
        assert_eq!(candidate.availability(), None);

        candidate.beds_available = Some(0);
        assert_eq!(candidate.availability(), Some(AvailabilityStatus::Full));

        candidate.beds_available = Some(3);
        assert_eq!(candidate.availability(), Some(AvailabilityStatus::Available));

        candidate.availability_status = Some(AvailabilityStatus::Waiting);
        assert_eq!(candidate.availability(), Some(AvailabilityStatus::Waiting));
    }

    #[test]
    fn test_effective_price() {
        let candidate = Candidate {
            id: "c1".to_string(),
            prices: BTreeMap::from([(CareType::Residential, 900.0), (CareType::Nursing, 1200.0)]),
            ..Candidate::default()
        };

        assert_eq!(candidate.effective_price(Some(CareType::Nursing)), Some(1200.0));
        assert_eq!(candidate.effective_price(Some(CareType::Respite)), Some(900.0));
        assert_eq!(candidate.effective_price(None), Some(900.0));
        assert_eq!(Candidate::default().effective_price(None), None);
    }

    #[test]
    fn test_candidate_check() {
        let valid = Candidate {
            id: "c1".to_string(),
            location: Some(GeoPoint::new(51.5, -0.12)),
            review_rating: Some(4.2),
            hygiene_rating: Some(5),
            ..Candidate::default()
        };
        assert!(valid.check().is_ok());

        let bad_coords = Candidate {
            location: Some(GeoPoint::new(95.0, 0.0)),
            ..valid.clone()
        };
        assert!(matches!(
            bad_coords.check(),
            Err(InputValidationError::InvalidCoordinates { .. })
        ));

        let bad_price = Candidate {
            prices: BTreeMap::from([(CareType::Residential, -10.0)]),
            ..valid.clone()
        };
        assert!(matches!(bad_price.check(), Err(InputValidationError::InvalidPrice { .. })));

        let bad_rating = Candidate {
            review_rating: Some(f64::NAN),
            ..valid
        };
        assert!(bad_rating.check().is_err());
    }

    #[test]
    fn test_geo_point_conversion() {
        let point: geo::Point<f64> = GeoPoint::new(51.5, -0.12).into();
        assert_eq!(point.y(), 51.5);
        assert_eq!(point.x(), -0.12);
    }
}
