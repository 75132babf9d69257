use std::sync::Arc;

use super::catalog::ProgramCatalog;

/// Source of catalog snapshots so the service can be exercised without a real store.
pub trait ProgramRepository: Send + Sync {
    fn snapshot(&self) -> Result<Arc<ProgramCatalog>, RepositoryError>;
}

/// Error enumeration for catalog store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("catalog not found")]
    NotFound,
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Repository serving one catalog loaded up front.
#[derive(Debug, Clone)]
pub struct StaticProgramRepository {
    catalog: Arc<ProgramCatalog>,
}

impl StaticProgramRepository {
    pub fn new(catalog: ProgramCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl ProgramRepository for StaticProgramRepository {
    fn snapshot(&self) -> Result<Arc<ProgramCatalog>, RepositoryError> {
        Ok(Arc::clone(&self.catalog))
    }
}
