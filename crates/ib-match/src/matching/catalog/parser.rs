use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::ingestion::RequirementRow;

/// Row of the programs export.
#[derive(Debug, Deserialize)]
pub(crate) struct ProgramRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) university: String,
    pub(crate) country: String,
    pub(crate) field_of_study: String,
    pub(crate) degree_level: String,
    #[serde(default, deserialize_with = "empty_as_zero")]
    pub(crate) min_ib_points: i64,
}

/// Row of the requirements export, one alternative per row.
#[derive(Debug, Deserialize)]
pub(crate) struct RequirementCsvRow {
    pub(crate) program_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    group: Option<String>,
    course: String,
    level: String,
    min_grade: i64,
    #[serde(deserialize_with = "flag")]
    critical: bool,
}

impl RequirementCsvRow {
    pub(crate) fn into_row(self) -> RequirementRow {
        RequirementRow {
            group: self.group,
            course: self.course,
            level: self.level,
            min_grade: self.min_grade,
            critical: self.critical,
        }
    }
}

pub(crate) fn parse_programs<R: Read>(reader: R) -> Result<Vec<ProgramRow>, csv::Error> {
    reader_for(reader).deserialize::<ProgramRow>().collect()
}

pub(crate) fn parse_requirements<R: Read>(
    reader: R,
) -> Result<Vec<RequirementCsvRow>, csv::Error> {
    reader_for(reader).deserialize::<RequirementCsvRow>().collect()
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn empty_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value.parse::<i64>().map_err(serde::de::Error::custom),
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("expected true/false, found '{raw}'")))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
