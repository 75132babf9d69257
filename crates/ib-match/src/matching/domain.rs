use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::subjects::{Level, SubjectCode};

/// Highest Diploma total: six subjects at 7 plus three core points.
pub const MAX_TOTAL_POINTS: u8 = 45;
/// Bonus points available from Theory of Knowledge and the Extended Essay.
pub const MAX_CORE_POINTS: u8 = 3;

/// Subject grade on the IB 1-7 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// How far `self` exceeds `required`, zero when it does not.
    pub fn surplus_over(self, required: Grade) -> u8 {
        self.0.saturating_sub(required.0)
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(i64::from(value)).ok_or_else(|| format!("grade {value} outside 1..=7"))
    }
}

impl From<Grade> for u8 {
    fn from(value: Grade) -> Self {
        value.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One examined subject held by a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectResult {
    pub level: Level,
    pub grade: Grade,
}

/// Validated qualification profile. Only [`super::profile::ProfileBuilder`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateProfile {
    subjects: BTreeMap<SubjectCode, SubjectResult>,
    total_points: u8,
}

impl CandidateProfile {
    pub(crate) fn new(subjects: BTreeMap<SubjectCode, SubjectResult>, total_points: u8) -> Self {
        Self {
            subjects,
            total_points,
        }
    }

    pub fn result_for(&self, code: &SubjectCode) -> Option<&SubjectResult> {
        self.subjects.get(code)
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&SubjectCode, &SubjectResult)> {
        self.subjects.iter()
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn total_points(&self) -> u8 {
        self.total_points
    }

    pub fn grade_sum(&self) -> u16 {
        self.subjects
            .values()
            .map(|result| u16::from(result.grade.value()))
            .sum()
    }
}

/// Identifier wrapper for catalog programs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a requirement group, unique within its program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    Foundation,
    Bachelor,
    IntegratedMaster,
    Master,
}

impl DegreeLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "foundation" => Some(Self::Foundation),
            "bachelor" | "bachelors" | "undergraduate" => Some(Self::Bachelor),
            "integrated_master" | "integrated_masters" => Some(Self::IntegratedMaster),
            "master" | "masters" => Some(Self::Master),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DegreeLevel::Foundation => "foundation",
            DegreeLevel::Bachelor => "bachelor",
            DegreeLevel::IntegratedMaster => "integrated_master",
            DegreeLevel::Master => "master",
        }
    }
}

/// A single acceptable way of meeting a requirement group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub course: SubjectCode,
    pub level: Level,
    pub min_grade: Grade,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} >= {}", self.course, self.level, self.min_grade)
    }
}

/// OR-set of alternatives; critical groups disqualify when unmet, advisory groups only affect ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementGroup {
    id: GroupId,
    critical: bool,
    alternatives: Vec<Alternative>,
}

impl RequirementGroup {
    pub(crate) fn new(id: GroupId, critical: bool, alternatives: Vec<Alternative>) -> Self {
        debug_assert!(!alternatives.is_empty(), "ingestion rejects empty groups");
        Self {
            id,
            critical,
            alternatives,
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }
}

/// Admission rules and facets of one catalog program, validated at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    id: ProgramId,
    name: String,
    university: String,
    country: String,
    field_of_study: String,
    degree_level: DegreeLevel,
    min_ib_points: u8,
    requirement_groups: Vec<RequirementGroup>,
}

impl Program {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ProgramId,
        name: String,
        university: String,
        country: String,
        field_of_study: String,
        degree_level: DegreeLevel,
        min_ib_points: u8,
        requirement_groups: Vec<RequirementGroup>,
    ) -> Self {
        Self {
            id,
            name,
            university,
            country,
            field_of_study,
            degree_level,
            min_ib_points,
            requirement_groups,
        }
    }

    pub fn id(&self) -> &ProgramId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn university(&self) -> &str {
        &self.university
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn field_of_study(&self) -> &str {
        &self.field_of_study
    }

    pub fn degree_level(&self) -> DegreeLevel {
        self.degree_level
    }

    /// Zero means the program publishes no points threshold.
    pub fn min_ib_points(&self) -> u8 {
        self.min_ib_points
    }

    pub fn requirement_groups(&self) -> &[RequirementGroup] {
        &self.requirement_groups
    }

    pub fn group(&self, id: &GroupId) -> Option<&RequirementGroup> {
        self.requirement_groups.iter().find(|group| group.id() == id)
    }
}
