use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ScoringError;
use super::weights::WeightTable;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Score and evaluator comments for one category. `score == None` means the
/// category has not been evaluated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_key: String,
    pub score: Option<u8>,
    pub comments: Option<String>,
}

/// Incoming score for a category as submitted by a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInput {
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Category score store for one review, keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scorecard {
    entries: BTreeMap<String, CategoryScore>,
}

impl Scorecard {
    /// A blank scorecard with an unscored entry for every category in `table`.
    pub fn for_table(table: &WeightTable) -> Self {
        let entries = table
            .category_keys()
            .map(|key| {
                (
                    key.to_string(),
                    CategoryScore {
                        category_key: key.to_string(),
                        score: None,
                        comments: None,
                    },
                )
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryScore> {
        self.entries.get(key)
    }

    pub fn score(&self, key: &str) -> Option<u8> {
        self.entries.get(key).and_then(|entry| entry.score)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CategoryScore> {
        self.entries.values()
    }

    /// Replaces the score and comments of an existing category.
    pub fn set(
        &mut self,
        key: &str,
        score: Option<i64>,
        comments: Option<String>,
    ) -> Result<(), ScoringError> {
        let validated = score.map(|raw| validate_score(key, raw)).transpose()?;
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| ScoringError::UnknownCategory(key.to_string()))?;

        entry.score = validated;
        entry.comments = comments.filter(|text| !text.trim().is_empty());
        Ok(())
    }

    pub fn apply(&mut self, key: &str, input: &ScoreInput) -> Result<(), ScoringError> {
        self.set(key, input.score, input.comments.clone())
    }

    /// Applies a batch of inputs, failing before any change if one is invalid.
    pub fn apply_all(&mut self, inputs: &BTreeMap<String, ScoreInput>) -> Result<(), ScoringError> {
        let mut staged = self.clone();
        for (key, input) in inputs {
            staged.apply(key, input)?;
        }
        *self = staged;
        Ok(())
    }

    /// Categories referenced by `table` that still lack a score.
    pub fn missing(&self, table: &WeightTable) -> Vec<&'static str> {
        table
            .category_keys()
            .filter(|key| self.score(key).is_none())
            .collect()
    }

    pub fn is_complete(&self, table: &WeightTable) -> bool {
        self.missing(table).is_empty()
    }

    pub fn require_complete(&self, table: &WeightTable) -> Result<(), ScoringError> {
        match self.missing(table).first() {
            Some(key) => Err(ScoringError::MissingCategoryScore {
                category: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

pub fn validate_score(category: &str, raw: i64) -> Result<u8, ScoringError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&raw) {
        Ok(raw as u8)
    } else {
        Err(ScoringError::ScoreOutOfRange {
            category: category.to_string(),
            score: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> WeightTable {
        WeightTable::manager_review().expect("valid table")
    }

    #[test]
    fn new_scorecard_has_every_category_unscored() {
        let table = table();
        let card = Scorecard::for_table(&table);

        assert_eq!(card.entries().count(), 10);
        assert!(card.entries().all(|entry| entry.score.is_none()));
        assert_eq!(card.missing(&table).len(), 10);
    }

    #[test]
    fn set_rejects_unknown_and_out_of_range() {
        let mut card = Scorecard::for_table(&table());

        assert_eq!(
            card.set("parking", Some(50), None),
            Err(ScoringError::UnknownCategory("parking".to_string()))
        );
        assert!(matches!(
            card.set("sales", Some(101), None),
            Err(ScoringError::ScoreOutOfRange { score: 101, .. })
        ));
        assert!(matches!(
            card.set("sales", Some(-1), None),
            Err(ScoringError::ScoreOutOfRange { score: -1, .. })
        ));
        assert_eq!(card.score("sales"), None);
    }

    #[test]
    fn blank_comments_are_dropped() {
        let mut card = Scorecard::for_table(&table());
        card.set("sales", Some(88), Some("   ".to_string()))
            .expect("valid score");

        let entry = card.get("sales").expect("entry present");
        assert_eq!(entry.score, Some(88));
        assert!(entry.comments.is_none());
    }

    #[test]
    fn apply_all_is_all_or_nothing() {
        let mut card = Scorecard::for_table(&table());
        let mut inputs = BTreeMap::new();
        inputs.insert(
            "efficiency".to_string(),
            ScoreInput {
                score: Some(70),
                comments: None,
            },
        );
        inputs.insert(
            "sales".to_string(),
            ScoreInput {
                score: Some(250),
                comments: None,
            },
        );

        assert!(card.apply_all(&inputs).is_err());
        assert_eq!(card.score("efficiency"), None);
    }

    #[test]
    fn require_complete_names_first_missing_category() {
        let table = table();
        let mut card = Scorecard::for_table(&table);
        for key in table.category_keys() {
            if key != "retention" {
                card.set(key, Some(80), None).expect("valid score");
            }
        }

        assert_eq!(
            card.require_complete(&table),
            Err(ScoringError::MissingCategoryScore {
                category: "retention".to_string()
            })
        );

        card.set("retention", Some(75), None).expect("valid score");
        assert!(card.require_complete(&table).is_ok());
    }

    #[test]
    fn missing_keys_outlive_the_table_borrow() {
        let missing: Vec<&'static str> = {
            let table = table();
            let mut card = Scorecard::for_table(&table);
            card.set("sales", Some(90), None).expect("valid score");
            card.missing(&table)
        };

        assert_eq!(missing.len(), 9);
        assert!(!missing.contains(&"sales"));
        assert!(missing.contains(&"leadership"));
    }
}
