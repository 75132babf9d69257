use super::super::domain::{CandidateProfile, RequirementGroup};
use super::{ClosestAttempt, GroupSatisfaction};

/// The alternative with the largest grade surplus that the profile satisfies, if any.
/// Ties keep catalog order.
pub(crate) fn satisfaction(
    group: &RequirementGroup,
    profile: &CandidateProfile,
) -> Option<GroupSatisfaction> {
    let mut best: Option<GroupSatisfaction> = None;

    for alternative in group.alternatives() {
        let Some(result) = profile.result_for(&alternative.course) else {
            continue;
        };
        if result.level != alternative.level || result.grade < alternative.min_grade {
            continue;
        }

        let candidate = GroupSatisfaction {
            group: group.id().clone(),
            critical: group.is_critical(),
            alternative: alternative.clone(),
            achieved: result.grade,
        };

        let improves = best
            .as_ref()
            .map_or(true, |current| candidate.surplus() > current.surplus());
        if improves {
            best = Some(candidate);
        }
    }

    best
}

/// Nearest miss for an unmet group: the candidate's attempt at one of its courses,
/// preferring the required level, then the smallest grade gap.
pub(crate) fn closest_attempt(
    group: &RequirementGroup,
    profile: &CandidateProfile,
) -> Option<ClosestAttempt> {
    group
        .alternatives()
        .iter()
        .filter_map(|alternative| {
            profile.result_for(&alternative.course).map(|held| {
                let rank = (
                    held.level != alternative.level,
                    alternative.min_grade.surplus_over(held.grade),
                );
                let attempt = ClosestAttempt {
                    course: alternative.course.clone(),
                    required_level: alternative.level,
                    required_grade: alternative.min_grade,
                    held_level: held.level,
                    held_grade: held.grade,
                };
                (rank, attempt)
            })
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, attempt)| attempt)
}
