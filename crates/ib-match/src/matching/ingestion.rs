//! Compiles loosely-typed catalog records into validated [`Program`]s.
//!
//! Drafts may describe requirement groups either nested (a group owning its
//! alternatives) or as flat rows that share a group key, the shape the catalog
//! store persists. Flat rows are folded into nested groups here, once, so the
//! evaluator never reconstructs groups.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::domain::{
    Alternative, DegreeLevel, Grade, GroupId, Program, ProgramId, RequirementGroup,
    MAX_TOTAL_POINTS,
};
use super::subjects::{CourseCatalog, Level, SubjectCode};

/// Fatal problems found while compiling a program; the program is not admitted to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("program record is missing an id")]
    MissingProgramId,
    #[error("program {program} listed more than once")]
    DuplicateProgram { program: ProgramId },
    #[error("program {program}: unrecognised degree level '{value}'")]
    InvalidDegreeLevel { program: ProgramId, value: String },
    #[error("program {program}: minimum points {points} outside 0..=45")]
    MinPointsOutOfRange { program: ProgramId, points: i64 },
    #[error("program {program}: requirement group '{group}' has no alternatives")]
    EmptyGroup { program: ProgramId, group: GroupId },
    #[error("program {program}: requirement group '{group}' defined more than once")]
    DuplicateGroup { program: ProgramId, group: GroupId },
    #[error("program {program}: rows of requirement group '{group}' disagree on criticality")]
    MixedCriticality { program: ProgramId, group: GroupId },
    #[error("program {program}: group '{group}' references unknown subject '{course}'")]
    UnknownSubject {
        program: ProgramId,
        group: GroupId,
        course: String,
    },
    #[error("program {program}: group '{group}' uses unrecognised level '{level}' for {course}")]
    InvalidLevel {
        program: ProgramId,
        group: GroupId,
        course: SubjectCode,
        level: String,
    },
    #[error("program {program}: group '{group}' requires {course} at {level}, which is not offered")]
    LevelNotOffered {
        program: ProgramId,
        group: GroupId,
        course: SubjectCode,
        level: Level,
    },
    #[error("program {program}: group '{group}' minimum grade {min_grade} for {course} outside 1..=7")]
    MinGradeOutOfRange {
        program: ProgramId,
        group: GroupId,
        course: SubjectCode,
        min_grade: i64,
    },
    #[error("{rows} requirement row(s) reference unknown program {program}")]
    OrphanRequirements { program: ProgramId, rows: usize },
}

impl IngestionError {
    pub fn program(&self) -> Option<&ProgramId> {
        match self {
            IngestionError::MissingProgramId => None,
            IngestionError::DuplicateProgram { program }
            | IngestionError::InvalidDegreeLevel { program, .. }
            | IngestionError::MinPointsOutOfRange { program, .. }
            | IngestionError::EmptyGroup { program, .. }
            | IngestionError::DuplicateGroup { program, .. }
            | IngestionError::MixedCriticality { program, .. }
            | IngestionError::UnknownSubject { program, .. }
            | IngestionError::InvalidLevel { program, .. }
            | IngestionError::LevelNotOffered { program, .. }
            | IngestionError::MinGradeOutOfRange { program, .. }
            | IngestionError::OrphanRequirements { program, .. } => Some(program),
        }
    }
}

/// Unvalidated program record as served by the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDraft {
    pub id: String,
    pub name: String,
    pub university: String,
    pub country: String,
    pub field_of_study: String,
    pub degree_level: String,
    #[serde(default)]
    pub min_ib_points: i64,
    #[serde(default)]
    pub groups: Vec<RequirementGroupDraft>,
    #[serde(default)]
    pub rows: Vec<RequirementRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementGroupDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub critical: bool,
    pub alternatives: Vec<AlternativeDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeDraft {
    pub course: String,
    pub level: String,
    pub min_grade: i64,
}

/// Flat requirement row; rows sharing a non-empty `group` key are alternatives of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRow {
    #[serde(default)]
    pub group: Option<String>,
    pub course: String,
    pub level: String,
    pub min_grade: i64,
    pub critical: bool,
}

impl ProgramDraft {
    /// Validate the draft against the course catalog.
    pub fn compile(self, courses: &CourseCatalog) -> Result<Program, IngestionError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(IngestionError::MissingProgramId);
        }
        let program = ProgramId(id.to_string());

        let degree_level = DegreeLevel::parse(&self.degree_level).ok_or_else(|| {
            IngestionError::InvalidDegreeLevel {
                program: program.clone(),
                value: self.degree_level.clone(),
            }
        })?;

        let min_ib_points = u8::try_from(self.min_ib_points)
            .ok()
            .filter(|points| *points <= MAX_TOTAL_POINTS)
            .ok_or_else(|| IngestionError::MinPointsOutOfRange {
                program: program.clone(),
                points: self.min_ib_points,
            })?;

        let mut drafts = self.groups;
        drafts.extend(fold_rows(&program, self.rows)?);

        let mut seen = HashSet::new();
        let mut groups = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let group_id = GroupId(
                draft
                    .id
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("group-{}", index + 1)),
            );
            if !seen.insert(group_id.clone()) {
                return Err(IngestionError::DuplicateGroup {
                    program,
                    group: group_id,
                });
            }
            groups.push(compile_group(&program, group_id, draft, courses)?);
        }

        Ok(Program::new(
            program,
            self.name.trim().to_string(),
            self.university.trim().to_string(),
            self.country.trim().to_string(),
            self.field_of_study.trim().to_string(),
            degree_level,
            min_ib_points,
            groups,
        ))
    }
}

/// Fold flat rows into nested group drafts, keeping first-appearance order.
/// A row without a key becomes its own group, `{course}#{n}` for its n-th keyless
/// row of that course; only keyed groups absorb later rows.
fn fold_rows(
    program: &ProgramId,
    rows: Vec<RequirementRow>,
) -> Result<Vec<RequirementGroupDraft>, IngestionError> {
    let mut groups: Vec<RequirementGroupDraft> = Vec::new();
    let mut keyed: HashMap<String, usize> = HashMap::new();
    let mut keyless: HashMap<SubjectCode, usize> = HashMap::new();

    for row in rows {
        let key = row
            .group
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let alternative = AlternativeDraft {
            course: row.course.clone(),
            level: row.level,
            min_grade: row.min_grade,
        };

        let Some(key) = key else {
            let course = SubjectCode::new(&row.course);
            let seen = keyless.entry(course.clone()).or_default();
            *seen += 1;
            groups.push(RequirementGroupDraft {
                id: Some(format!("{course}#{seen}")),
                critical: row.critical,
                alternatives: vec![alternative],
            });
            continue;
        };

        match keyed.get(&key) {
            Some(&position) if groups[position].critical != row.critical => {
                return Err(IngestionError::MixedCriticality {
                    program: program.clone(),
                    group: GroupId(key),
                });
            }
            Some(&position) => groups[position].alternatives.push(alternative),
            None => {
                keyed.insert(key.clone(), groups.len());
                groups.push(RequirementGroupDraft {
                    id: Some(key),
                    critical: row.critical,
                    alternatives: vec![alternative],
                });
            }
        }
    }

    Ok(groups)
}

fn compile_group(
    program: &ProgramId,
    group: GroupId,
    draft: RequirementGroupDraft,
    courses: &CourseCatalog,
) -> Result<RequirementGroup, IngestionError> {
    if draft.alternatives.is_empty() {
        return Err(IngestionError::EmptyGroup {
            program: program.clone(),
            group,
        });
    }

    let mut alternatives = Vec::with_capacity(draft.alternatives.len());
    for alternative in draft.alternatives {
        let course = SubjectCode::new(&alternative.course);
        let subject = courses
            .get(&course)
            .ok_or_else(|| IngestionError::UnknownSubject {
                program: program.clone(),
                group: group.clone(),
                course: alternative.course.trim().to_string(),
            })?;

        let level = Level::parse(&alternative.level).ok_or_else(|| IngestionError::InvalidLevel {
            program: program.clone(),
            group: group.clone(),
            course: course.clone(),
            level: alternative.level.clone(),
        })?;
        if !subject.offers(level) {
            return Err(IngestionError::LevelNotOffered {
                program: program.clone(),
                group,
                course,
                level,
            });
        }

        let min_grade =
            Grade::new(alternative.min_grade).ok_or_else(|| IngestionError::MinGradeOutOfRange {
                program: program.clone(),
                group: group.clone(),
                course: course.clone(),
                min_grade: alternative.min_grade,
            })?;

        alternatives.push(Alternative {
            course,
            level,
            min_grade,
        });
    }

    Ok(RequirementGroup::new(group, draft.critical, alternatives))
}
