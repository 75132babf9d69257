mod normalizer;
mod parser;

pub(crate) use normalizer::normalize_facet;

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::domain::{Program, ProgramId};
use super::ingestion::{IngestionError, ProgramDraft};
use super::subjects::CourseCatalog;

const BUNDLED_PROGRAMS_CSV: &str = include_str!("../../../data/programs.csv");
const BUNDLED_REQUIREMENTS_CSV: &str = include_str!("../../../data/requirements.csv");

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Immutable snapshot of validated programs, ordered as ingested.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramCatalog {
    programs: Vec<Program>,
    #[serde(skip)]
    index: HashMap<ProgramId, usize>,
    loaded_at: DateTime<Utc>,
}

/// Result of ingesting a catalog feed: the admitted programs and every rejection.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: ProgramCatalog,
    pub rejected: Vec<IngestionError>,
}

impl ProgramCatalog {
    /// Compile each draft, keeping valid programs and reporting the rest.
    pub fn ingest(
        drafts: impl IntoIterator<Item = ProgramDraft>,
        courses: &CourseCatalog,
    ) -> CatalogLoad {
        let mut programs: Vec<Program> = Vec::new();
        let mut index = HashMap::new();
        let mut rejected = Vec::new();

        for draft in drafts {
            let compiled = draft.compile(courses).and_then(|program| {
                if index.contains_key(program.id()) {
                    Err(IngestionError::DuplicateProgram {
                        program: program.id().clone(),
                    })
                } else {
                    Ok(program)
                }
            });

            match compiled {
                Ok(program) => {
                    index.insert(program.id().clone(), programs.len());
                    programs.push(program);
                }
                Err(err) => {
                    error!(error = %err, "rejected catalog program");
                    rejected.push(err);
                }
            }
        }

        info!(
            admitted = programs.len(),
            rejected = rejected.len(),
            "programme catalog ingested"
        );

        CatalogLoad {
            catalog: Self {
                programs,
                index,
                loaded_at: Utc::now(),
            },
            rejected,
        }
    }

    /// Load the two-file CSV export: one row per program, one row per requirement alternative.
    pub fn from_csv_readers<P: Read, Q: Read>(
        programs: P,
        requirements: Q,
        courses: &CourseCatalog,
    ) -> Result<CatalogLoad, CatalogImportError> {
        let program_rows = parser::parse_programs(programs)?;
        let mut rows_by_program: BTreeMap<String, Vec<_>> = BTreeMap::new();
        for row in parser::parse_requirements(requirements)? {
            rows_by_program
                .entry(row.program_id.clone())
                .or_default()
                .push(row.into_row());
        }

        // Every copy of a repeated id is rejected.
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for row in &program_rows {
            let id = row.id.trim();
            if !id.is_empty() {
                *occurrences.entry(id.to_string()).or_default() += 1;
            }
        }

        let mut duplicates = Vec::new();
        let mut drafts = Vec::with_capacity(program_rows.len());
        for row in program_rows {
            let program_id = row.id.trim().to_string();
            if occurrences.get(&program_id).copied().unwrap_or_default() > 1 {
                rows_by_program.remove(&program_id);
                let err = IngestionError::DuplicateProgram {
                    program: ProgramId(program_id),
                };
                error!(error = %err, "rejected catalog program");
                duplicates.push(err);
                continue;
            }
            drafts.push(ProgramDraft {
                rows: rows_by_program.remove(&program_id).unwrap_or_default(),
                id: program_id,
                name: row.name,
                university: row.university,
                country: row.country,
                field_of_study: row.field_of_study,
                degree_level: row.degree_level,
                min_ib_points: row.min_ib_points,
                groups: Vec::new(),
            });
        }

        let mut load = Self::ingest(drafts, courses);
        load.rejected.extend(duplicates);
        for (program, rows) in rows_by_program {
            let err = IngestionError::OrphanRequirements {
                program: ProgramId(program),
                rows: rows.len(),
            };
            error!(error = %err, "rejected requirement rows");
            load.rejected.push(err);
        }

        Ok(load)
    }

    pub fn from_csv_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        programs: P,
        requirements: Q,
        courses: &CourseCatalog,
    ) -> Result<CatalogLoad, CatalogImportError> {
        let programs = std::fs::File::open(programs)?;
        let requirements = std::fs::File::open(requirements)?;
        Self::from_csv_readers(programs, requirements, courses)
    }

    /// Sample catalog shipped with the crate for demos and tests.
    pub fn bundled(courses: &CourseCatalog) -> Result<CatalogLoad, CatalogImportError> {
        Self::from_csv_readers(
            BUNDLED_PROGRAMS_CSV.as_bytes(),
            BUNDLED_REQUIREMENTS_CSV.as_bytes(),
            courses,
        )
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn get(&self, id: &ProgramId) -> Option<&Program> {
        self.index.get(id).map(|position| &self.programs[*position])
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
