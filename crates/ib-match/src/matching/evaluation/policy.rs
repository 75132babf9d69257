use super::super::domain::{Alternative, CandidateProfile, GroupId, Program};
use super::rules::closest_attempt;
use super::{ClosestAttempt, EligibilityVerdict};
use serde::Serialize;

/// Reason a candidate misses a program, surfaced as feedback for near misses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    Requirement {
        group: GroupId,
        alternatives: Vec<Alternative>,
        closest: Option<ClosestAttempt>,
    },
    Points {
        required: u8,
        actual: u8,
    },
}

impl Shortfall {
    pub fn summary(&self) -> String {
        match self {
            Shortfall::Requirement {
                alternatives,
                closest,
                ..
            } => {
                let options = alternatives
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or ");
                match closest {
                    Some(attempt) => format!(
                        "requires {options} (closest: {} {} at {})",
                        attempt.course, attempt.held_level, attempt.held_grade
                    ),
                    None => format!("requires {options}"),
                }
            }
            Shortfall::Points { required, actual } => format!(
                "requires {required} points, candidate has {actual} ({} short)",
                required.saturating_sub(*actual)
            ),
        }
    }
}

pub(crate) fn shortfalls(
    profile: &CandidateProfile,
    program: &Program,
    verdict: &EligibilityVerdict,
) -> Vec<Shortfall> {
    let mut reasons: Vec<Shortfall> = verdict
        .failed_critical_groups
        .iter()
        .filter_map(|id| program.group(id))
        .map(|group| Shortfall::Requirement {
            group: group.id().clone(),
            alternatives: group.alternatives().to_vec(),
            closest: closest_attempt(group, profile),
        })
        .collect();

    if verdict.points_margin < 0 {
        reasons.push(Shortfall::Points {
            required: program.min_ib_points(),
            actual: profile.total_points(),
        });
    }

    reasons
}
