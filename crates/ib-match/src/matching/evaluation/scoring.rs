use super::super::domain::GroupId;
use super::config::ScoringConfig;
use super::EligibilityVerdict;
use serde::Serialize;

/// What a score component was earned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "group", rename_all = "snake_case")]
pub enum ScoreSource {
    PointsMargin,
    AdvisoryGroup(GroupId),
    CriticalGroup(GroupId),
}

/// Discrete contribution to a ranking score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub source: ScoreSource,
    pub value: f64,
    pub notes: String,
}

/// Maps a raw margin onto `[0, 1]` by linear scaling against `cap`.
fn normalize(raw: i32, cap: u8) -> f64 {
    (f64::from(raw) / f64::from(cap.max(1))).clamp(0.0, 1.0)
}

/// Score an eligible verdict; ineligible verdicts score negative infinity with no components.
pub(crate) fn score_verdict(
    verdict: &EligibilityVerdict,
    config: &ScoringConfig,
) -> (f64, Vec<ScoreComponent>) {
    if !verdict.eligible {
        return (f64::NEG_INFINITY, Vec::new());
    }

    let mut components = Vec::with_capacity(verdict.satisfied_groups.len() + 1);

    let points = config.points_weight
        * normalize(i32::from(verdict.points_margin), config.points_margin_cap);
    components.push(ScoreComponent {
        source: ScoreSource::PointsMargin,
        value: points,
        notes: format!("{:+} points against threshold", verdict.points_margin),
    });

    for satisfied in &verdict.satisfied_groups {
        let surplus = satisfied.surplus();
        let margin = config.grade_surplus_weight
            * normalize(i32::from(surplus), config.grade_surplus_cap);

        let component = if satisfied.critical {
            ScoreComponent {
                source: ScoreSource::CriticalGroup(satisfied.group.clone()),
                value: margin,
                notes: format!("{} met with {} (+{surplus})", satisfied.alternative, satisfied.achieved),
            }
        } else {
            ScoreComponent {
                source: ScoreSource::AdvisoryGroup(satisfied.group.clone()),
                value: config.advisory_bonus + margin,
                notes: format!(
                    "advisory {} met with {} (+{surplus})",
                    satisfied.alternative, satisfied.achieved
                ),
            }
        };
        components.push(component);
    }

    let total = components.iter().map(|component| component.value).sum();
    (total, components)
}
