use chrono::{DateTime, Utc};
use ib_match::config::CatalogConfig;
use ib_match::error::AppError;
use ib_match::matching::{
    CatalogLoad, CourseCatalog, DegreeLevel, ProgramCatalog, RawCandidateInput,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<CatalogSummary>,
}

/// Where the served catalog was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum CatalogSource {
    Bundled,
    Export {
        programs_csv: PathBuf,
        requirements_csv: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RejectedProgram {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) program: Option<String>,
    pub(crate) reason: String,
}

/// Public view of the catalog load exposed at `/api/v1/catalog`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CatalogSummary {
    pub(crate) source: CatalogSource,
    pub(crate) programs: usize,
    pub(crate) rejected: Vec<RejectedProgram>,
    pub(crate) loaded_at: DateTime<Utc>,
}

impl CatalogSummary {
    pub(crate) fn new(source: CatalogSource, load: &CatalogLoad) -> Self {
        Self {
            source,
            programs: load.catalog.len(),
            rejected: load
                .rejected
                .iter()
                .map(|error| RejectedProgram {
                    program: error.program().map(ToString::to_string),
                    reason: error.to_string(),
                })
                .collect(),
            loaded_at: load.catalog.loaded_at(),
        }
    }
}

/// Load the configured catalog export, or the bundled sample when none is configured.
pub(crate) fn load_catalog(
    config: &CatalogConfig,
    courses: &CourseCatalog,
) -> Result<(CatalogLoad, CatalogSource), AppError> {
    let (load, source) = match &config.sources {
        Some(sources) => {
            let load = ProgramCatalog::from_csv_paths(
                &sources.programs_csv,
                &sources.requirements_csv,
                courses,
            )?;
            let source = CatalogSource::Export {
                programs_csv: sources.programs_csv.clone(),
                requirements_csv: sources.requirements_csv.clone(),
            };
            (load, source)
        }
        None => (ProgramCatalog::bundled(courses)?, CatalogSource::Bundled),
    };

    if load.rejected.is_empty() {
        info!(programs = load.catalog.len(), ?source, "programme catalog loaded");
    } else {
        warn!(
            programs = load.catalog.len(),
            rejected = load.rejected.len(),
            ?source,
            "programme catalog loaded with rejections"
        );
    }

    Ok((load, source))
}

pub(crate) fn read_profile(path: &Path) -> Result<RawCandidateInput, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let profile = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    Ok(profile)
}

pub(crate) fn parse_degree_level(raw: &str) -> Result<DegreeLevel, String> {
    DegreeLevel::parse(raw).ok_or_else(|| {
        format!("unrecognised degree level '{raw}' (expected foundation, bachelor, integrated_master or master)")
    })
}
