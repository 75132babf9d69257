use crate::infra::{load_catalog, parse_degree_level, read_profile};
use clap::Args;
use ib_match::config::{AppConfig, CatalogConfig, CatalogSources};
use ib_match::error::AppError;
use ib_match::matching::{
    CatalogFilter, CourseCatalog, DegreeLevel, MatchResult, MatchingService, RawCandidateInput,
    RawSubjectEntry, SearchOptions, StaticProgramRepository,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogPathArgs {
    /// Programmes CSV export (requires --requirements)
    #[arg(long, requires = "requirements")]
    pub(crate) programs: Option<PathBuf>,
    /// Requirement rows CSV export (requires --programs)
    #[arg(long, requires = "programs")]
    pub(crate) requirements: Option<PathBuf>,
}

impl CatalogPathArgs {
    /// Explicit paths win over the environment; otherwise fall back to `fallback`.
    fn resolve(self, fallback: CatalogConfig) -> CatalogConfig {
        match (self.programs, self.requirements) {
            (Some(programs_csv), Some(requirements_csv)) => CatalogConfig {
                sources: Some(CatalogSources {
                    programs_csv,
                    requirements_csv,
                }),
            },
            _ => fallback,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// JSON file holding `{ "subjects": [{ "code", "level", "grade" }], "total_points" }`
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Restrict to programmes in these countries (repeatable)
    #[arg(long = "country")]
    pub(crate) countries: Vec<String>,
    /// Restrict to these fields of study (repeatable)
    #[arg(long = "field")]
    pub(crate) fields: Vec<String>,
    /// Restrict to these universities (repeatable)
    #[arg(long = "university")]
    pub(crate) universities: Vec<String>,
    /// Restrict to these degree levels (repeatable)
    #[arg(long = "degree-level", value_parser = parse_degree_level)]
    pub(crate) degree_levels: Vec<DegreeLevel>,
    /// Only programmes whose points threshold is at most this value
    #[arg(long)]
    pub(crate) min_points_at_most: Option<u8>,
    /// List near misses after the eligible programmes
    #[arg(long)]
    pub(crate) include_ineligible: bool,
    /// Maximum number of programmes to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Print the raw JSON results instead of a table
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) catalog: CatalogPathArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogValidateArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogPathArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also show near misses for each sample candidate
    #[arg(long)]
    pub(crate) include_ineligible: bool,
    /// Programmes shown per candidate
    #[arg(long, default_value_t = 5)]
    pub(crate) limit: usize,
}

fn matching_service(
    config: &AppConfig,
    catalog: CatalogConfig,
) -> Result<MatchingService<StaticProgramRepository>, AppError> {
    let courses = Arc::new(CourseCatalog::standard());
    let (load, _) = load_catalog(&catalog, &courses)?;
    for rejected in &load.rejected {
        println!("  skipped: {rejected}");
    }
    let repository = Arc::new(StaticProgramRepository::new(load.catalog));
    Ok(MatchingService::new(
        repository,
        courses,
        config.scoring.clone(),
    ))
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let profile = read_profile(&args.profile)?;
    let filter = CatalogFilter {
        countries: args.countries,
        fields: args.fields,
        universities: args.universities,
        degree_levels: args.degree_levels,
        min_points_at_most: args.min_points_at_most,
    };
    let options = SearchOptions {
        include_ineligible: args.include_ineligible,
        limit: args.limit,
    };

    let service = matching_service(&config, args.catalog.resolve(config.catalog.clone()))?;
    let results = service.search(profile, &filter, &options)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&results).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_results(&results);
    }
    Ok(())
}

pub(crate) fn run_catalog_validate(args: CatalogValidateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = args.catalog.resolve(config.catalog);
    let courses = CourseCatalog::standard();
    let (load, source) = load_catalog(&catalog, &courses)?;

    println!("Catalog source: {source:?}");
    println!(
        "- {} programmes admitted, {} rejected",
        load.catalog.len(),
        load.rejected.len()
    );
    for rejected in &load.rejected {
        println!("  - {rejected}");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = matching_service(&config, CatalogConfig::default())?;
    let options = SearchOptions {
        include_ineligible: args.include_ineligible,
        limit: Some(args.limit),
    };

    println!("IB programme matching demo");
    for (label, profile) in sample_candidates() {
        println!(
            "\n{label}: {} points across {} subjects",
            profile.total_points,
            profile.subjects.len()
        );
        match service.search(profile, &CatalogFilter::default(), &options) {
            Ok(results) => render_results(&results),
            Err(err) => println!("  Profile rejected: {err}"),
        }
    }
    Ok(())
}

fn render_results(results: &[MatchResult]) {
    if results.is_empty() {
        println!("  No programmes matched.");
        return;
    }

    for result in results {
        let program = &result.program;
        if result.verdict.eligible {
            println!(
                "  [eligible {:>5.2}] {} - {} ({}, {} pts)",
                result.score,
                program.name(),
                program.university(),
                program.country(),
                program.min_ib_points()
            );
        } else {
            println!(
                "  [near miss   ] {} - {} ({}, {} pts)",
                program.name(),
                program.university(),
                program.country(),
                program.min_ib_points()
            );
            for shortfall in &result.shortfalls {
                println!("      {}", shortfall.summary());
            }
        }
    }
}

fn entry(code: &str, level: &str, grade: i64) -> RawSubjectEntry {
    RawSubjectEntry {
        code: code.to_string(),
        level: level.to_string(),
        grade,
    }
}

fn sample_candidates() -> Vec<(&'static str, RawCandidateInput)> {
    vec![
        (
            "Aspiring medic",
            RawCandidateInput {
                subjects: vec![
                    entry("CHEMISTRY", "HL", 6),
                    entry("BIOLOGY", "HL", 5),
                    entry("MATH_AA", "SL", 6),
                    entry("ENGLISH_A_LIT", "HL", 6),
                    entry("SPANISH_B", "SL", 7),
                    entry("PSYCHOLOGY", "SL", 6),
                ],
                total_points: 38,
            },
        ),
        (
            "Engineer one point short",
            RawCandidateInput {
                subjects: vec![
                    entry("MATH_AA", "HL", 7),
                    entry("PHYSICS", "HL", 6),
                    entry("COMPUTER_SCIENCE", "HL", 6),
                    entry("ENGLISH_A_LANG_LIT", "SL", 5),
                    entry("GERMAN_B", "SL", 6),
                    entry("ECONOMICS", "SL", 6),
                ],
                total_points: 39,
            },
        ),
        (
            "Humanities candidate",
            RawCandidateInput {
                subjects: vec![
                    entry("HISTORY", "HL", 6),
                    entry("ENGLISH_A_LIT", "HL", 6),
                    entry("GLOBAL_POLITICS", "HL", 5),
                    entry("MATH_AI", "SL", 4),
                    entry("FRENCH_B", "SL", 5),
                    entry("BIOLOGY", "SL", 5),
                ],
                total_points: 32,
            },
        ),
    ]
}
