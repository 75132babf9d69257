use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized identifier for a recognised IB subject (e.g. `MATH_AA`, `CHEMISTRY`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SubjectCode(String);

impl SubjectCode {
    pub fn new(raw: &str) -> Self {
        Self(normalize_code(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SubjectCode {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for SubjectCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SubjectCode> for String {
    fn from(value: SubjectCode) -> Self {
        value.0
    }
}

impl fmt::Display for SubjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_code(raw: &str) -> String {
    let cleaned = raw.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase()
}

/// Depth tier at which a subject is studied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "HL", alias = "Higher")]
    Higher,
    #[serde(rename = "SL", alias = "Standard")]
    Standard,
}

impl Level {
    /// Accepts `HL`/`SL`, single letters, and the long names, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hl" | "h" | "higher" | "higher level" => Some(Self::Higher),
            "sl" | "s" | "standard" | "standard level" => Some(Self::Standard),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Level::Higher => "HL",
            Level::Standard => "SL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six IB Diploma subject groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectGroup {
    LanguageAndLiterature,
    LanguageAcquisition,
    IndividualsAndSocieties,
    Sciences,
    Mathematics,
    Arts,
}

impl SubjectGroup {
    pub const fn number(self) -> u8 {
        match self {
            SubjectGroup::LanguageAndLiterature => 1,
            SubjectGroup::LanguageAcquisition => 2,
            SubjectGroup::IndividualsAndSocieties => 3,
            SubjectGroup::Sciences => 4,
            SubjectGroup::Mathematics => 5,
            SubjectGroup::Arts => 6,
        }
    }
}

/// Reference entry in the course catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: SubjectCode,
    pub name: String,
    pub group: SubjectGroup,
    pub levels: Vec<Level>,
}

impl Subject {
    pub fn offers(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }
}

const BOTH: &[Level] = &[Level::Higher, Level::Standard];
const SL_ONLY: &[Level] = &[Level::Standard];

const STANDARD_SUBJECTS: &[(&str, &str, SubjectGroup, &[Level])] = &[
    ("ENGLISH_A_LIT", "English A: Literature", SubjectGroup::LanguageAndLiterature, BOTH),
    ("ENGLISH_A_LANG_LIT", "English A: Language and Literature", SubjectGroup::LanguageAndLiterature, BOTH),
    ("SPANISH_A_LIT", "Spanish A: Literature", SubjectGroup::LanguageAndLiterature, BOTH),
    ("SPANISH_B", "Spanish B", SubjectGroup::LanguageAcquisition, BOTH),
    ("FRENCH_B", "French B", SubjectGroup::LanguageAcquisition, BOTH),
    ("GERMAN_B", "German B", SubjectGroup::LanguageAcquisition, BOTH),
    ("SPANISH_AB_INITIO", "Spanish ab initio", SubjectGroup::LanguageAcquisition, SL_ONLY),
    ("MANDARIN_AB_INITIO", "Mandarin ab initio", SubjectGroup::LanguageAcquisition, SL_ONLY),
    ("HISTORY", "History", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("GEOGRAPHY", "Geography", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("ECONOMICS", "Economics", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("PSYCHOLOGY", "Psychology", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("BUSINESS_MANAGEMENT", "Business Management", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("GLOBAL_POLITICS", "Global Politics", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("PHILOSOPHY", "Philosophy", SubjectGroup::IndividualsAndSocieties, BOTH),
    ("BIOLOGY", "Biology", SubjectGroup::Sciences, BOTH),
    ("CHEMISTRY", "Chemistry", SubjectGroup::Sciences, BOTH),
    ("PHYSICS", "Physics", SubjectGroup::Sciences, BOTH),
    ("COMPUTER_SCIENCE", "Computer Science", SubjectGroup::Sciences, BOTH),
    ("DESIGN_TECHNOLOGY", "Design Technology", SubjectGroup::Sciences, BOTH),
    ("SPORTS_EXERCISE_HEALTH_SCIENCE", "Sports, Exercise and Health Science", SubjectGroup::Sciences, BOTH),
    ("ESS", "Environmental Systems and Societies", SubjectGroup::Sciences, BOTH),
    ("MATH_AA", "Mathematics: Analysis and Approaches", SubjectGroup::Mathematics, BOTH),
    ("MATH_AI", "Mathematics: Applications and Interpretation", SubjectGroup::Mathematics, BOTH),
    ("VISUAL_ARTS", "Visual Arts", SubjectGroup::Arts, BOTH),
    ("MUSIC", "Music", SubjectGroup::Arts, BOTH),
    ("THEATRE", "Theatre", SubjectGroup::Arts, BOTH),
    ("FILM", "Film", SubjectGroup::Arts, BOTH),
];

/// Read-only set of recognised subjects keyed by code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseCatalog {
    subjects: BTreeMap<SubjectCode, Subject>,
}

impl CourseCatalog {
    pub fn new(subjects: impl IntoIterator<Item = Subject>) -> Self {
        let subjects = subjects
            .into_iter()
            .map(|subject| (subject.code.clone(), subject))
            .collect();
        Self { subjects }
    }

    /// Subjects currently examined in the IB Diploma Programme.
    pub fn standard() -> Self {
        Self::new(
            STANDARD_SUBJECTS
                .iter()
                .map(|(code, name, group, levels)| Subject {
                    code: SubjectCode::new(code),
                    name: (*name).to_string(),
                    group: *group,
                    levels: levels.to_vec(),
                }),
        )
    }

    pub fn get(&self, code: &SubjectCode) -> Option<&Subject> {
        self.subjects.get(code)
    }

    pub fn offers(&self, code: &SubjectCode, level: Level) -> bool {
        self.get(code).is_some_and(|subject| subject.offers(level))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
