//! Offline score sheets exported from spreadsheets.

use chrono::Utc;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::audits::{AuditCategory, AuditCategoryInput};
use crate::scoring::{Scorecard, ScoringError, WeightTable};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Scoring(ScoringError),
    DuplicateCategory(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read score sheet: {}", err),
            ImportError::Csv(err) => write!(f, "invalid score sheet CSV data: {}", err),
            ImportError::Scoring(err) => write!(f, "score sheet rejected: {}", err),
            ImportError::DuplicateCategory(key) => {
                write!(f, "category '{}' appears more than once in the sheet", key)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Scoring(err) => Some(err),
            ImportError::DuplicateCategory(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ScoringError> for ImportError {
    fn from(err: ScoringError) -> Self {
        Self::Scoring(err)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    category_key: String,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    comments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuditRow {
    category_key: String,
    category_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    defect_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads `category_key,score,comments` rows into a manager review scorecard.
/// Blank scores leave the category unscored.
pub struct ScoresheetImporter;

impl ScoresheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        table: &WeightTable,
    ) -> Result<Scorecard, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, table)
    }

    pub fn from_reader<R: Read>(reader: R, table: &WeightTable) -> Result<Scorecard, ImportError> {
        let mut scorecard = Scorecard::for_table(table);
        let mut seen = HashSet::new();

        for row in reader_for(reader).deserialize::<ScoreRow>() {
            let row = row?;
            if !seen.insert(row.category_key.clone()) {
                return Err(ImportError::DuplicateCategory(row.category_key));
            }
            scorecard.set(&row.category_key, row.score, row.comments)?;
        }

        Ok(scorecard)
    }
}

/// Reads `category_key,category_name,defect_level,notes` rows into audit
/// categories. A blank defect level means `normal`.
pub struct AuditSheetImporter;

impl AuditSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AuditCategory>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AuditCategory>, ImportError> {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for row in reader_for(reader).deserialize::<AuditRow>() {
            let row = row?;
            if !seen.insert(row.category_key.clone()) {
                return Err(ImportError::DuplicateCategory(row.category_key));
            }

            let input = AuditCategoryInput {
                category_key: row.category_key,
                category_name: row.category_name,
                defect_level: row.defect_level.unwrap_or_else(|| "normal".to_string()),
                notes: row.notes,
                check_performed: None,
                check_name: None,
                image_urls: Vec::new(),
            };
            categories.push(input.into_category(now)?);
        }

        Ok(categories)
    }
}
