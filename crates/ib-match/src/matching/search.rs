use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::catalog::{normalize_facet, ProgramCatalog};
use super::domain::{CandidateProfile, DegreeLevel, Program};
use super::evaluation::{EligibilityEngine, MatchResult};

/// Facet restrictions applied before evaluation. Empty lists do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFilter {
    pub countries: Vec<String>,
    pub fields: Vec<String>,
    pub universities: Vec<String>,
    pub degree_levels: Vec<DegreeLevel>,
    /// Keep only programs whose threshold is at most this many points.
    pub min_points_at_most: Option<u8>,
}

impl CatalogFilter {
    pub fn matches(&self, program: &Program) -> bool {
        CompiledFilter::from(self).matches(program)
    }
}

struct CompiledFilter {
    countries: BTreeSet<String>,
    fields: BTreeSet<String>,
    universities: BTreeSet<String>,
    degree_levels: BTreeSet<DegreeLevel>,
    min_points_at_most: Option<u8>,
}

impl From<&CatalogFilter> for CompiledFilter {
    fn from(filter: &CatalogFilter) -> Self {
        let normalized = |values: &[String]| {
            values
                .iter()
                .map(|value| normalize_facet(value))
                .filter(|value| !value.is_empty())
                .collect::<BTreeSet<_>>()
        };

        Self {
            countries: normalized(&filter.countries),
            fields: normalized(&filter.fields),
            universities: normalized(&filter.universities),
            degree_levels: filter.degree_levels.iter().copied().collect(),
            min_points_at_most: filter.min_points_at_most,
        }
    }
}

impl CompiledFilter {
    fn matches(&self, program: &Program) -> bool {
        facet_allows(&self.countries, program.country())
            && facet_allows(&self.fields, program.field_of_study())
            && facet_allows(&self.universities, program.university())
            && (self.degree_levels.is_empty()
                || self.degree_levels.contains(&program.degree_level()))
            && self
                .min_points_at_most
                .map_or(true, |ceiling| program.min_ib_points() <= ceiling)
    }
}

fn facet_allows(allowed: &BTreeSet<String>, value: &str) -> bool {
    allowed.is_empty() || allowed.contains(&normalize_facet(value))
}

/// Caller policy for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Retain ineligible programs after the eligible ones for near-miss feedback.
    pub include_ineligible: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("search cancelled before every program was evaluated")]
pub struct SearchCancelled;

impl EligibilityEngine {
    /// Evaluate every program passing `filter` and return them ranked.
    pub fn search(
        &self,
        catalog: &ProgramCatalog,
        profile: &CandidateProfile,
        filter: &CatalogFilter,
        options: &SearchOptions,
    ) -> Vec<MatchResult> {
        let never = AtomicBool::new(false);
        // Only `cancel` can abort the run, and it is never set here.
        self.search_cancellable(catalog, profile, filter, options, &never)
            .unwrap_or_default()
    }

    /// As [`EligibilityEngine::search`], stopping early once `cancel` is set.
    pub fn search_cancellable(
        &self,
        catalog: &ProgramCatalog,
        profile: &CandidateProfile,
        filter: &CatalogFilter,
        options: &SearchOptions,
        cancel: &AtomicBool,
    ) -> Result<Vec<MatchResult>, SearchCancelled> {
        let filter = CompiledFilter::from(filter);

        let assessed: Option<Vec<MatchResult>> = catalog
            .programs()
            .par_iter()
            .filter(|program| filter.matches(program))
            .map(|program| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(self.assess(profile, program))
                }
            })
            .collect();

        let mut results = assessed.ok_or(SearchCancelled)?;
        if !options.include_ineligible {
            results.retain(|result| result.verdict.eligible);
        }
        results.sort_by(rank_order);
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }

        Ok(results)
    }
}

/// Eligible first by descending score; ineligible by fewest failed groups then smallest
/// points deficit. Program id breaks every tie.
pub(crate) fn rank_order(a: &MatchResult, b: &MatchResult) -> CmpOrdering {
    let by_id = || a.program.id().cmp(b.program.id());

    match (a.verdict.eligible, b.verdict.eligible) {
        (true, false) => CmpOrdering::Less,
        (false, true) => CmpOrdering::Greater,
        (true, true) => b.score.total_cmp(&a.score).then_with(by_id),
        (false, false) => a
            .verdict
            .failed_critical_groups
            .len()
            .cmp(&b.verdict.failed_critical_groups.len())
            .then_with(|| a.verdict.points_deficit().cmp(&b.verdict.points_deficit()))
            .then_with(by_id),
    }
}
