use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::matching::catalog::ProgramCatalog;
use crate::matching::domain::{CandidateProfile, Program};
use crate::matching::ingestion::{AlternativeDraft, ProgramDraft, RequirementGroupDraft};
use crate::matching::profile::{ProfileBuilder, RawCandidateInput, RawSubjectEntry};
use crate::matching::repository::{ProgramRepository, RepositoryError};
use crate::matching::service::MatchingService;
use crate::matching::subjects::CourseCatalog;
use crate::matching::{matching_router, ScoringConfig};

pub(super) fn courses() -> Arc<CourseCatalog> {
    Arc::new(CourseCatalog::standard())
}

pub(super) fn builder() -> ProfileBuilder {
    ProfileBuilder::new(courses())
}

pub(super) fn alternative(course: &str, level: &str, min_grade: i64) -> AlternativeDraft {
    AlternativeDraft {
        course: course.to_string(),
        level: level.to_string(),
        min_grade,
    }
}

pub(super) fn group(id: &str, critical: bool, alternatives: Vec<AlternativeDraft>) -> RequirementGroupDraft {
    RequirementGroupDraft {
        id: Some(id.to_string()),
        critical,
        alternatives,
    }
}

pub(super) fn draft(id: &str, min_ib_points: i64, groups: Vec<RequirementGroupDraft>) -> ProgramDraft {
    ProgramDraft {
        id: id.to_string(),
        name: format!("Programme {id}"),
        university: "Test University".to_string(),
        country: "United Kingdom".to_string(),
        field_of_study: "Medicine".to_string(),
        degree_level: "bachelor".to_string(),
        min_ib_points,
        groups,
        rows: Vec::new(),
    }
}

/// One science at HL 6 plus Biology or Physics at HL 5, 38 points.
pub(super) fn medicine_draft() -> ProgramDraft {
    draft(
        "medicine",
        38,
        vec![
            group(
                "sci-primary",
                true,
                vec![
                    alternative("BIOLOGY", "HL", 6),
                    alternative("CHEMISTRY", "HL", 6),
                    alternative("PHYSICS", "HL", 6),
                ],
            ),
            group(
                "sci-secondary",
                true,
                vec![alternative("BIOLOGY", "HL", 5), alternative("PHYSICS", "HL", 5)],
            ),
        ],
    )
}

pub(super) fn medicine() -> Program {
    medicine_draft()
        .compile(&courses())
        .expect("medicine fixture compiles")
}

pub(super) fn subject(code: &str, level: &str, grade: i64) -> RawSubjectEntry {
    RawSubjectEntry {
        code: code.to_string(),
        level: level.to_string(),
        grade,
    }
}

pub(super) fn raw_profile(subjects: Vec<RawSubjectEntry>, total_points: i64) -> RawCandidateInput {
    RawCandidateInput {
        subjects,
        total_points,
    }
}

/// Chemistry HL 6 and Biology HL 5 alongside four unrelated subjects.
pub(super) fn medic_subjects() -> Vec<RawSubjectEntry> {
    vec![
        subject("CHEMISTRY", "HL", 6),
        subject("BIOLOGY", "HL", 5),
        subject("MATH_AA", "HL", 6),
        subject("ENGLISH_A_LIT", "SL", 6),
        subject("FRENCH_B", "SL", 7),
        subject("HISTORY", "SL", 6),
    ]
}

pub(super) fn medic_profile(total_points: i64) -> CandidateProfile {
    builder()
        .build(raw_profile(medic_subjects(), total_points))
        .expect("medic fixture builds")
}

pub(super) fn catalog(drafts: Vec<ProgramDraft>) -> ProgramCatalog {
    let load = ProgramCatalog::ingest(drafts, &courses());
    assert!(load.rejected.is_empty(), "fixtures ingest cleanly: {:?}", load.rejected);
    load.catalog
}

/// Small catalog spanning countries and thresholds for search tests.
pub(super) fn search_catalog() -> ProgramCatalog {
    let mut economics = draft(
        "economics",
        36,
        vec![group("maths", true, vec![alternative("MATH_AA", "HL", 6)])],
    );
    economics.field_of_study = "Economics".to_string();

    let mut delft = draft(
        "delft-engineering",
        0,
        vec![group(
            "physics",
            true,
            vec![alternative("PHYSICS", "HL", 4), alternative("PHYSICS", "SL", 5)],
        )],
    );
    delft.country = "Netherlands".to_string();
    delft.field_of_study = "Engineering".to_string();

    let mut open = draft("open-arts", 24, Vec::new());
    open.country = "Canada".to_string();
    open.field_of_study = "Humanities".to_string();
    open.degree_level = "foundation".to_string();

    catalog(vec![medicine_draft(), economics, delft, open])
}

pub(super) fn service_with(catalog: ProgramCatalog) -> MatchingService<MemoryRepository> {
    MatchingService::new(
        Arc::new(MemoryRepository::new(catalog)),
        courses(),
        ScoringConfig::default(),
    )
}

pub(super) fn router_with(catalog: ProgramCatalog) -> axum::Router {
    matching_router(Arc::new(service_with(catalog)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    catalog: Arc<Mutex<Arc<ProgramCatalog>>>,
}

impl MemoryRepository {
    pub(super) fn new(catalog: ProgramCatalog) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(Arc::new(catalog))),
        }
    }

    pub(super) fn replace(&self, catalog: ProgramCatalog) {
        *self.catalog.lock().expect("repository mutex poisoned") = Arc::new(catalog);
    }
}

impl ProgramRepository for MemoryRepository {
    fn snapshot(&self) -> Result<Arc<ProgramCatalog>, RepositoryError> {
        let guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(Arc::clone(&guard))
    }
}

pub(super) struct UnavailableRepository;

impl ProgramRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<Arc<ProgramCatalog>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog store offline".to_string()))
    }
}
