mod config;
mod policy;
mod rules;
mod scoring;

pub use config::ScoringConfig;
pub use policy::Shortfall;
pub use scoring::{ScoreComponent, ScoreSource};

use super::domain::{Alternative, CandidateProfile, Grade, GroupId, Program, ProgramId};
use super::subjects::{Level, SubjectCode};
use serde::Serialize;

/// Decide eligibility of `profile` for `program`. Total and pure over validated input.
pub fn evaluate(profile: &CandidateProfile, program: &Program) -> EligibilityVerdict {
    let mut failed_critical_groups = Vec::new();
    let mut satisfied_groups = Vec::new();

    for group in program.requirement_groups() {
        match rules::satisfaction(group, profile) {
            Some(satisfied) => satisfied_groups.push(satisfied),
            None if group.is_critical() => failed_critical_groups.push(group.id().clone()),
            None => {}
        }
    }

    let points_margin =
        i16::from(profile.total_points()) - i16::from(program.min_ib_points());
    let eligible = failed_critical_groups.is_empty() && points_margin >= 0;

    EligibilityVerdict {
        program_id: program.id().clone(),
        eligible,
        failed_critical_groups,
        satisfied_groups,
        points_margin,
    }
}

/// Stateless evaluator and scorer; holds only the scoring weights.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: ScoringConfig,
}

impl EligibilityEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn evaluate(&self, profile: &CandidateProfile, program: &Program) -> EligibilityVerdict {
        evaluate(profile, program)
    }

    /// Ranking score of a verdict; negative infinity when the verdict is not eligible.
    pub fn score(&self, verdict: &EligibilityVerdict) -> f64 {
        scoring::score_verdict(verdict, &self.config).0
    }

    /// Evaluate, score, and explain a single program.
    pub fn assess(&self, profile: &CandidateProfile, program: &Program) -> MatchResult {
        let verdict = evaluate(profile, program);
        let (score, components) = scoring::score_verdict(&verdict, &self.config);
        let shortfalls = if verdict.eligible {
            Vec::new()
        } else {
            policy::shortfalls(profile, program, &verdict)
        };

        MatchResult {
            program: program.clone(),
            verdict,
            score,
            components,
            shortfalls,
        }
    }
}

/// A satisfied requirement group and the alternative that met it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSatisfaction {
    pub group: GroupId,
    pub critical: bool,
    pub alternative: Alternative,
    pub achieved: Grade,
}

impl GroupSatisfaction {
    pub fn surplus(&self) -> u8 {
        self.achieved.surplus_over(self.alternative.min_grade)
    }
}

/// Candidate's nearest attempt at an unmet requirement group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosestAttempt {
    pub course: SubjectCode,
    pub required_level: Level,
    pub required_grade: Grade,
    pub held_level: Level,
    pub held_grade: Grade,
}

/// Outcome of evaluating one profile against one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityVerdict {
    pub program_id: ProgramId,
    pub eligible: bool,
    pub failed_critical_groups: Vec<GroupId>,
    /// Every satisfied group, critical or advisory.
    pub satisfied_groups: Vec<GroupSatisfaction>,
    /// Candidate total minus the program threshold; negative when short.
    pub points_margin: i16,
}

impl EligibilityVerdict {
    pub fn points_deficit(&self) -> u16 {
        if self.points_margin < 0 {
            self.points_margin.unsigned_abs()
        } else {
            0
        }
    }

    pub fn is_satisfied(&self, group: &GroupId) -> bool {
        self.satisfied_groups
            .iter()
            .any(|satisfied| &satisfied.group == group)
    }
}

/// Evaluated program with its ranking score and explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub program: Program,
    pub verdict: EligibilityVerdict,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
    pub shortfalls: Vec<Shortfall>,
}
