use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ScoringError;

/// Points every sanitation audit starts from.
pub const AUDIT_BASELINE: u32 = 100;

/// Severity assigned to an inspected sanitation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectLevel {
    Normal,
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl DefectLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Normal,
            Self::Minor,
            Self::Moderate,
            Self::Serious,
            Self::Critical,
        ]
    }

    pub const fn points(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::Minor => 1,
            Self::Moderate => 5,
            Self::Serious => 7,
            Self::Critical => 10,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Minor => "Minor Defect",
            Self::Moderate => "Moderate Defect",
            Self::Serious => "Serious Defect",
            Self::Critical => "Critical Defect",
        }
    }

    pub fn view(self) -> DefectLevelView {
        DefectLevelView {
            level: self,
            label: self.label(),
            points: self.points(),
        }
    }
}

impl fmt::Display for DefectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DefectLevel {
    type Err = ScoringError;

    /// Accepts either the key (`"moderate"`) or the display label
    /// (`"Moderate Defect"`), ignoring case and surrounding whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|level| {
                level.key().eq_ignore_ascii_case(needle)
                    || level.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ScoringError::InvalidDefectLevel(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DefectLevelView {
    pub level: DefectLevel,
    pub label: &'static str,
    pub points: u32,
}

pub fn points_for_defect_level(level: DefectLevel) -> u32 {
    level.points()
}

pub fn total_deductions<I>(deductions: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    deductions
        .into_iter()
        .fold(0u32, |total, deduction| total.saturating_add(deduction))
}

/// `max(0, 100 - Σ deductions)`.
pub fn compute_audit_score<I>(deductions: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    AUDIT_BASELINE.saturating_sub(total_deductions(deductions))
}
