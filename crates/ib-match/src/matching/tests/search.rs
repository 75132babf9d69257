use std::sync::atomic::AtomicBool;

use super::common::*;
use crate::matching::domain::{DegreeLevel, ProgramId};
use crate::matching::evaluation::EligibilityEngine;
use crate::matching::search::{CatalogFilter, SearchCancelled, SearchOptions};

fn ids(results: &[crate::matching::MatchResult]) -> Vec<&str> {
    results
        .iter()
        .map(|result| result.program.id().0.as_str())
        .collect()
}

#[test]
fn search_ranks_eligible_programs_by_descending_score() {
    let engine = EligibilityEngine::default();
    let results = engine.search(
        &search_catalog(),
        &medic_profile(38),
        &CatalogFilter::default(),
        &SearchOptions::default(),
    );

    assert_eq!(ids(&results), vec!["open-arts", "economics", "medicine"]);
    assert!(results.iter().all(|result| result.verdict.eligible));
}

#[test]
fn near_misses_follow_when_requested() {
    let engine = EligibilityEngine::default();
    let results = engine.search(
        &search_catalog(),
        &medic_profile(37),
        &CatalogFilter::default(),
        &SearchOptions {
            include_ineligible: true,
            limit: None,
        },
    );

    assert_eq!(
        ids(&results),
        vec!["open-arts", "economics", "medicine", "delft-engineering"],
        "medicine misses only by points, delft misses a group"
    );
    assert!(!results[2].verdict.eligible);
    assert!(results[2].verdict.failed_critical_groups.is_empty());
    assert_eq!(results[3].verdict.failed_critical_groups.len(), 1);
}

#[test]
fn equal_scores_are_ordered_by_program_id() {
    let catalog = catalog(vec![
        draft("zeta", 0, Vec::new()),
        draft("alpha", 0, Vec::new()),
        draft("mu", 0, Vec::new()),
    ]);
    let results = EligibilityEngine::default().search(
        &catalog,
        &medic_profile(30),
        &CatalogFilter::default(),
        &SearchOptions::default(),
    );

    assert_eq!(ids(&results), vec!["alpha", "mu", "zeta"]);
}

#[test]
fn facets_match_case_insensitively() {
    let filter = CatalogFilter {
        countries: vec!["  united KINGDOM ".to_string()],
        fields: vec!["economics".to_string()],
        ..CatalogFilter::default()
    };
    let results = EligibilityEngine::default().search(
        &search_catalog(),
        &medic_profile(40),
        &filter,
        &SearchOptions::default(),
    );

    assert_eq!(ids(&results), vec!["economics"]);
}

#[test]
fn degree_level_and_threshold_facets_restrict_results() {
    let engine = EligibilityEngine::default();
    let profile = medic_profile(40);
    let options = SearchOptions {
        include_ineligible: true,
        limit: None,
    };

    let foundation = engine.search(
        &search_catalog(),
        &profile,
        &CatalogFilter {
            degree_levels: vec![DegreeLevel::Foundation],
            ..CatalogFilter::default()
        },
        &options,
    );
    assert_eq!(ids(&foundation), vec!["open-arts"]);

    let accessible = engine.search(
        &search_catalog(),
        &profile,
        &CatalogFilter {
            min_points_at_most: Some(30),
            ..CatalogFilter::default()
        },
        &options,
    );
    assert_eq!(ids(&accessible), vec!["open-arts", "delft-engineering"]);
}

#[test]
fn limit_truncates_after_ranking() {
    let results = EligibilityEngine::default().search(
        &search_catalog(),
        &medic_profile(38),
        &CatalogFilter::default(),
        &SearchOptions {
            include_ineligible: false,
            limit: Some(1),
        },
    );

    assert_eq!(ids(&results), vec!["open-arts"]);
}

#[test]
fn repeated_searches_are_identical() {
    let engine = EligibilityEngine::default();
    let catalog = search_catalog();
    let profile = medic_profile(39);
    let options = SearchOptions {
        include_ineligible: true,
        limit: None,
    };

    let first = engine.search(&catalog, &profile, &CatalogFilter::default(), &options);
    let second = engine.search(&catalog, &profile, &CatalogFilter::default(), &options);

    assert_eq!(first, second);
}

#[test]
fn cancelled_search_reports_cancellation() {
    let cancel = AtomicBool::new(true);
    let outcome = EligibilityEngine::default().search_cancellable(
        &search_catalog(),
        &medic_profile(38),
        &CatalogFilter::default(),
        &SearchOptions::default(),
        &cancel,
    );

    assert_eq!(outcome, Err(SearchCancelled));
}

#[test]
fn filter_deserializes_with_defaults() {
    let filter: CatalogFilter =
        serde_json::from_str(r#"{"countries": ["Netherlands"]}"#).expect("partial filter");

    assert_eq!(filter.countries, vec!["Netherlands".to_string()]);
    assert!(filter.degree_levels.is_empty());
    assert!(filter.min_points_at_most.is_none());
}

#[test]
fn points_ceiling_reads_from_its_wire_name() {
    let filter: CatalogFilter =
        serde_json::from_str(r#"{"min_points_at_most": 30}"#).expect("ceiling filter");
    let catalog = search_catalog();
    let program = |id: &str| catalog.get(&ProgramId(id.to_string())).expect("fixture program");

    assert_eq!(filter.min_points_at_most, Some(30));
    assert!(filter.matches(program("open-arts")));
    assert!(!filter.matches(program("economics")));
}
