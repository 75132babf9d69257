use serde::{Deserialize, Serialize};

/// Weights and caps of the ranking score. Every contribution is bounded by its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Contribution of a points margin at or above `points_margin_cap`.
    pub points_weight: f64,
    pub points_margin_cap: u8,
    /// Flat reward for each satisfied advisory group.
    pub advisory_bonus: f64,
    /// Contribution of a grade surplus at or above `grade_surplus_cap`, per satisfied group.
    pub grade_surplus_weight: f64,
    pub grade_surplus_cap: u8,
}

const DEFAULT_POINTS_WEIGHT: f64 = 1.0;
const DEFAULT_POINTS_MARGIN_CAP: u8 = 6;
const DEFAULT_ADVISORY_BONUS: f64 = 0.5;
const DEFAULT_GRADE_SURPLUS_WEIGHT: f64 = 0.25;
const DEFAULT_GRADE_SURPLUS_CAP: u8 = 3;

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_weight: DEFAULT_POINTS_WEIGHT,
            points_margin_cap: DEFAULT_POINTS_MARGIN_CAP,
            advisory_bonus: DEFAULT_ADVISORY_BONUS,
            grade_surplus_weight: DEFAULT_GRADE_SURPLUS_WEIGHT,
            grade_surplus_cap: DEFAULT_GRADE_SURPLUS_CAP,
        }
    }
}

impl ScoringConfig {
    /// Replace negative or non-finite weights and zero caps with the defaults.
    pub fn sanitized(self) -> Self {
        Self {
            points_weight: weight_or(self.points_weight, DEFAULT_POINTS_WEIGHT),
            points_margin_cap: cap_or(self.points_margin_cap, DEFAULT_POINTS_MARGIN_CAP),
            advisory_bonus: weight_or(self.advisory_bonus, DEFAULT_ADVISORY_BONUS),
            grade_surplus_weight: weight_or(
                self.grade_surplus_weight,
                DEFAULT_GRADE_SURPLUS_WEIGHT,
            ),
            grade_surplus_cap: cap_or(self.grade_surplus_cap, DEFAULT_GRADE_SURPLUS_CAP),
        }
    }
}

fn weight_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

fn cap_or(value: u8, fallback: u8) -> u8 {
    if value == 0 {
        fallback
    } else {
        value
    }
}
