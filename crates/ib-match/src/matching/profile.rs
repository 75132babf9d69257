use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    CandidateProfile, Grade, SubjectResult, MAX_CORE_POINTS, MAX_TOTAL_POINTS,
};
use super::subjects::{CourseCatalog, Level, SubjectCode};

/// Candidate input as received from a form or API request, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidateInput {
    #[serde(default)]
    pub subjects: Vec<RawSubjectEntry>,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubjectEntry {
    pub code: String,
    pub level: String,
    pub grade: i64,
}

/// Validation errors raised while building a candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("unknown subject '{code}'")]
    UnknownSubject { code: String },
    #[error("unrecognised level '{level}' for {code} (expected HL or SL)")]
    InvalidLevel { code: SubjectCode, level: String },
    #[error("{code} is not offered at {level}")]
    LevelNotOffered { code: SubjectCode, level: Level },
    #[error("grade {grade} for {code} outside 1..=7")]
    GradeOutOfRange { code: SubjectCode, grade: i64 },
    #[error("{code} listed more than once")]
    DuplicateSubject { code: SubjectCode },
    #[error("total points {points} outside 0..=45")]
    TotalPointsOutOfRange { points: i64 },
}

/// Builder responsible for producing validated [`CandidateProfile`] instances.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    courses: Arc<CourseCatalog>,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new(Arc::new(CourseCatalog::standard()))
    }
}

impl ProfileBuilder {
    pub fn new(courses: Arc<CourseCatalog>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &CourseCatalog {
        &self.courses
    }

    /// Convert raw input into a profile, returning the first violation found.
    pub fn build(&self, input: RawCandidateInput) -> Result<CandidateProfile, ProfileError> {
        let mut subjects = BTreeMap::new();

        for entry in input.subjects {
            let code = SubjectCode::new(&entry.code);
            let subject = self
                .courses
                .get(&code)
                .ok_or_else(|| ProfileError::UnknownSubject {
                    code: entry.code.trim().to_string(),
                })?;

            let level = Level::parse(&entry.level).ok_or_else(|| ProfileError::InvalidLevel {
                code: code.clone(),
                level: entry.level.clone(),
            })?;
            if !subject.offers(level) {
                return Err(ProfileError::LevelNotOffered { code, level });
            }

            let grade = Grade::new(entry.grade).ok_or_else(|| ProfileError::GradeOutOfRange {
                code: code.clone(),
                grade: entry.grade,
            })?;

            if subjects.contains_key(&code) {
                return Err(ProfileError::DuplicateSubject { code });
            }
            subjects.insert(code, SubjectResult { level, grade });
        }

        let total_points = u8::try_from(input.total_points)
            .ok()
            .filter(|points| *points <= MAX_TOTAL_POINTS)
            .ok_or(ProfileError::TotalPointsOutOfRange {
                points: input.total_points,
            })?;

        let profile = CandidateProfile::new(subjects, total_points);
        let ceiling = profile.grade_sum() + u16::from(MAX_CORE_POINTS);
        if u16::from(total_points) > ceiling {
            debug!(
                total_points,
                grade_sum = profile.grade_sum(),
                "declared total exceeds subject grades plus core points; trusting declared total"
            );
        }

        Ok(profile)
    }
}
