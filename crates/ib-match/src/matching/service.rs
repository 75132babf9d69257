use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{CandidateProfile, Program, ProgramId};
use super::evaluation::{EligibilityEngine, MatchResult, ScoringConfig};
use super::profile::{ProfileBuilder, ProfileError, RawCandidateInput};
use super::repository::{ProgramRepository, RepositoryError};
use super::search::{CatalogFilter, SearchCancelled, SearchOptions};
use super::subjects::CourseCatalog;

/// Service composing the profile builder, catalog repository, and eligibility engine.
pub struct MatchingService<R> {
    builder: ProfileBuilder,
    engine: Arc<EligibilityEngine>,
    repository: Arc<R>,
}

impl<R> MatchingService<R>
where
    R: ProgramRepository + 'static,
{
    pub fn new(repository: Arc<R>, courses: Arc<CourseCatalog>, config: ScoringConfig) -> Self {
        Self {
            builder: ProfileBuilder::new(courses),
            engine: Arc::new(EligibilityEngine::new(config)),
            repository,
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    pub fn build_profile(
        &self,
        raw: RawCandidateInput,
    ) -> Result<CandidateProfile, MatchingServiceError> {
        Ok(self.builder.build(raw)?)
    }

    /// Validate the candidate and rank every program passing `filter`.
    pub fn search(
        &self,
        raw: RawCandidateInput,
        filter: &CatalogFilter,
        options: &SearchOptions,
    ) -> Result<Vec<MatchResult>, MatchingServiceError> {
        let never = AtomicBool::new(false);
        self.search_until(raw, filter, options, &never)
    }

    /// As [`MatchingService::search`], abandoning the run once `cancel` is set.
    pub fn search_until(
        &self,
        raw: RawCandidateInput,
        filter: &CatalogFilter,
        options: &SearchOptions,
        cancel: &AtomicBool,
    ) -> Result<Vec<MatchResult>, MatchingServiceError> {
        let profile = self.build_profile(raw)?;
        let catalog = self.repository.snapshot()?;
        debug!(
            subjects = profile.subject_count(),
            total_points = profile.total_points(),
            catalog = catalog.len(),
            "searching programme catalog"
        );

        let results = self
            .engine
            .search_cancellable(&catalog, &profile, filter, options, cancel)?;
        let eligible = results.iter().filter(|result| result.verdict.eligible).count();
        info!(
            returned = results.len(),
            eligible,
            "programme search completed"
        );

        Ok(results)
    }

    /// Evaluate a single program for the candidate, with score and shortfalls.
    pub fn evaluate(
        &self,
        raw: RawCandidateInput,
        program_id: &ProgramId,
    ) -> Result<MatchResult, MatchingServiceError> {
        let profile = self.build_profile(raw)?;
        let catalog = self.repository.snapshot()?;
        let program = catalog
            .get(program_id)
            .ok_or_else(|| MatchingServiceError::UnknownProgram(program_id.clone()))?;

        let result = self.engine.assess(&profile, program);
        debug!(
            program = %program_id,
            eligible = result.verdict.eligible,
            "programme evaluated"
        );
        Ok(result)
    }

    pub fn program(&self, program_id: &ProgramId) -> Result<Program, MatchingServiceError> {
        let catalog = self.repository.snapshot()?;
        catalog
            .get(program_id)
            .cloned()
            .ok_or_else(|| MatchingServiceError::UnknownProgram(program_id.clone()))
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown program `{0}`")]
    UnknownProgram(ProgramId),
    #[error(transparent)]
    Cancelled(#[from] SearchCancelled),
}
