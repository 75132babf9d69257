//! Programme eligibility matching for IB Diploma candidates.
//!
//! Candidate input is validated into a [`CandidateProfile`] once, catalog programs are
//! compiled into nested OR-groups at ingestion, and the engine evaluates, scores and
//! ranks programs as pure functions over those immutable values.

pub mod catalog;
pub mod domain;
pub(crate) mod evaluation;
pub mod ingestion;
pub mod profile;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod subjects;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogImportError, CatalogLoad, ProgramCatalog};
pub use domain::{
    Alternative, CandidateProfile, DegreeLevel, Grade, GroupId, Program, ProgramId,
    RequirementGroup, SubjectResult, MAX_CORE_POINTS, MAX_TOTAL_POINTS,
};
pub use evaluation::{
    evaluate, ClosestAttempt, EligibilityEngine, EligibilityVerdict, GroupSatisfaction,
    MatchResult, ScoreComponent, ScoreSource, ScoringConfig, Shortfall,
};
pub use ingestion::{
    AlternativeDraft, IngestionError, ProgramDraft, RequirementGroupDraft, RequirementRow,
};
pub use profile::{ProfileBuilder, ProfileError, RawCandidateInput, RawSubjectEntry};
pub use repository::{ProgramRepository, RepositoryError, StaticProgramRepository};
pub use router::{matching_router, MatchRequest, MatchResponse};
pub use search::{CatalogFilter, SearchCancelled, SearchOptions};
pub use service::{MatchingService, MatchingServiceError};
pub use subjects::{CourseCatalog, Level, Subject, SubjectCode, SubjectGroup};
