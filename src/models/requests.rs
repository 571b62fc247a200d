use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::core::presets::Category;
use crate::error::InputValidationError;
use crate::models::domain::{CareType, GeoPoint};

/// One entry of the requester's ordered priority list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub category: Category,
    #[serde(default)]
    pub weight: Option<u32>,
}

/// Requester preferences for one matching call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Query {
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(rename = "careType", default)]
    pub care_type: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
}

/// Query after boundary validation, with tokens parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub origin: Option<GeoPoint>,
    pub budget: Option<f64>,
    pub care_type: Option<CareType>,
    pub max_distance_km: Option<f64>,
    pub priorities: Vec<Priority>,
}

impl Query {
    /// Validate every field before any scoring begins
    pub fn check(&self) -> Result<ValidatedQuery, InputValidationError> {
        if let Some(origin) = &self.origin {
            origin.check()?;
        }

        let field_errors = self.validate().err();
        let failed = |field: &str| {
            field_errors
                .as_ref()
                .map(|errors| errors.field_errors().contains_key(field))
                .unwrap_or(false)
        };

        if let Some(budget) = self.budget {
            if !budget.is_finite() || failed("budget") {
                return Err(InputValidationError::NegativeBudget(budget));
            }
        }

        if let Some(distance) = self.max_distance_km {
            if !distance.is_finite() || distance <= 0.0 || failed("max_distance_km") {
                return Err(InputValidationError::InvalidDistance(distance));
            }
        }

        let care_type = self
            .care_type
            .as_deref()
            .map(str::parse::<CareType>)
            .transpose()?;

        let mut seen = HashSet::new();
        for priority in &self.priorities {
            if !seen.insert(priority.category) {
                return Err(InputValidationError::DuplicatePriority(priority.category));
            }
        }

        Ok(ValidatedQuery {
            origin: self.origin,
            budget: self.budget,
            care_type,
            max_distance_km: self.max_distance_km,
            priorities: self.priorities.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_valid() {
        let validated = Query::default().check().unwrap();
        assert_eq!(validated.care_type, None);
        assert!(validated.priorities.is_empty());
    }

    #[test]
    fn test_query_parses_care_type() {
        let query = Query {
            care_type: Some("Nursing Dementia".to_string()),
            ..Query::default()
        };
        assert_eq!(query.check().unwrap().care_type, Some(CareType::NursingDementia));
    }

    #[test]
    fn test_query_rejects_bad_input() {
        let bad_origin = Query {
            origin: Some(GeoPoint::new(12.0, 200.0)),
            ..Query::default()
        };
        assert!(matches!(
            bad_origin.check(),
            Err(InputValidationError::InvalidCoordinates { .. })
        ));

        let negative_budget = Query {
            budget: Some(-1.0),
            ..Query::default()
        };
        assert_eq!(
            negative_budget.check(),
            Err(InputValidationError::NegativeBudget(-1.0))
        );

        let zero_distance = Query {
            max_distance_km: Some(0.0),
            ..Query::default()
        };
        assert_eq!(
            zero_distance.check(),
            Err(InputValidationError::InvalidDistance(0.0))
        );

        let unknown_care = Query {
            care_type: Some("spa".to_string()),
            ..Query::default()
        };
        assert_eq!(
            unknown_care.check(),
            Err(InputValidationError::UnknownCareType("spa".to_string()))
        );

        let duplicated = Query {
            priorities: vec![
                Priority { category: Category::Safety, weight: None },
                Priority { category: Category::Safety, weight: Some(10) },
            ],
            ..Query::default()
        };
        assert_eq!(
            duplicated.check(),
            Err(InputValidationError::DuplicatePriority(Category::Safety))
        );
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let json = r#"{
            "origin": {"latitude": 51.5, "longitude": -0.12},
            "budget": 900.0,
            "careType": "residential",
            "maxDistanceKm": 20.0,
            "priorities": [{"category": "safety"}]
        }"#;
        let query: Query = serde_json::from_str(json).unwrap();
        assert_eq!(query.budget, Some(900.0));
        assert_eq!(query.priorities[0].category, Category::Safety);
        assert!(query.check().is_ok());
    }
}
