use serde::Serialize;
use std::collections::HashSet;

use super::error::WeightTableError;

/// Floating tolerance used when checking that weights add up.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

pub const MANAGER_REVIEW_TABLE_VERSION: &str = "manager-review/v1";

/// A category weight, in absolute percentage points of the overall 100-point scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryWeight {
    pub key: &'static str,
    pub label: &'static str,
    pub weight_pct: f64,
}

/// A top-level group with its declared share and member categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupWeight {
    pub key: &'static str,
    pub label: &'static str,
    pub weight_pct: f64,
    pub categories: Vec<CategoryWeight>,
}

impl GroupWeight {
    pub fn category_total(&self) -> f64 {
        self.categories.iter().map(|category| category.weight_pct).sum()
    }
}

/// Flat view of a single category's placement in the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightEntry {
    pub category_key: &'static str,
    pub group: &'static str,
    pub weight_pct: f64,
}

/// Validated, versioned weight table for one review type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    version: &'static str,
    groups: Vec<GroupWeight>,
}

impl WeightTable {
    /// Builds a table, rejecting it unless every group's categories sum to the
    /// group weight and the group weights sum to 100.
    pub fn new(version: &'static str, groups: Vec<GroupWeight>) -> Result<Self, WeightTableError> {
        let mut seen = HashSet::new();
        let mut total = 0.0;

        for group in &groups {
            check_range(group.key, group.weight_pct)?;
            if group.categories.is_empty() {
                return Err(WeightTableError::EmptyGroup(group.key.to_string()));
            }

            for category in &group.categories {
                check_range(category.key, category.weight_pct)?;
                if !seen.insert(category.key) {
                    return Err(WeightTableError::DuplicateCategory(category.key.to_string()));
                }
            }

            let actual = group.category_total();
            if (actual - group.weight_pct).abs() > WEIGHT_TOLERANCE {
                return Err(WeightTableError::GroupSumMismatch {
                    group: group.key.to_string(),
                    declared: group.weight_pct,
                    actual,
                });
            }

            total += group.weight_pct;
        }

        if (total - 100.0).abs() > WEIGHT_TOLERANCE {
            return Err(WeightTableError::TotalMismatch(total));
        }

        Ok(Self { version, groups })
    }

    /// The quarterly manager review table: operational 35, people 30,
    /// business 25, leadership 10.
    pub fn manager_review() -> Result<Self, WeightTableError> {
        Self::new(
            MANAGER_REVIEW_TABLE_VERSION,
            vec![
                GroupWeight {
                    key: "operational",
                    label: "Operational Management",
                    weight_pct: 35.0,
                    categories: vec![
                        category("sanitation", "Sanitation & Food Safety", 10.0),
                        category("inventory", "Inventory & Cost Control", 10.0),
                        category("quality", "Product & Service Quality", 10.0),
                        category("maintenance", "Maintenance & Order", 5.0),
                    ],
                },
                GroupWeight {
                    key: "people",
                    label: "People Management",
                    weight_pct: 30.0,
                    categories: vec![
                        category("recruitment", "Recruitment & Training", 10.0),
                        category("scheduling", "Shift Scheduling", 10.0),
                        category("retention", "Team Climate & Retention", 10.0),
                    ],
                },
                GroupWeight {
                    key: "business",
                    label: "Business Performance",
                    weight_pct: 25.0,
                    categories: vec![
                        category("sales", "Sales & Profitability", 15.0),
                        category("efficiency", "Operational Efficiency", 10.0),
                    ],
                },
                GroupWeight {
                    key: "leadership",
                    label: "Leadership & Personal Development",
                    weight_pct: 10.0,
                    categories: vec![category(
                        "leadership",
                        "Leadership & Personal Development",
                        10.0,
                    )],
                },
            ],
        )
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn groups(&self) -> &[GroupWeight] {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&GroupWeight> {
        self.groups.iter().find(|group| group.key == key)
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.categories.iter().map(|category| category.key))
    }

    pub fn contains_category(&self, key: &str) -> bool {
        self.category_keys().any(|candidate| candidate == key)
    }

    pub fn entries(&self) -> Vec<WeightEntry> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.categories.iter().map(|category| WeightEntry {
                    category_key: category.key,
                    group: group.key,
                    weight_pct: category.weight_pct,
                })
            })
            .collect()
    }
}

fn category(key: &'static str, label: &'static str, weight_pct: f64) -> CategoryWeight {
    CategoryWeight {
        key,
        label,
        weight_pct,
    }
}

fn check_range(key: &str, weight: f64) -> Result<(), WeightTableError> {
    if (0.0..=100.0).contains(&weight) {
        Ok(())
    } else {
        Err(WeightTableError::WeightOutOfRange {
            key: key.to_string(),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups(first: f64, second: f64) -> Vec<GroupWeight> {
        vec![
            GroupWeight {
                key: "front",
                label: "Front of House",
                weight_pct: first,
                categories: vec![category("service", "Service", first)],
            },
            GroupWeight {
                key: "back",
                label: "Back of House",
                weight_pct: second,
                categories: vec![category("kitchen", "Kitchen", second)],
            },
        ]
    }

    #[test]
    fn manager_review_table_is_consistent() {
        let table = WeightTable::manager_review().expect("builtin table is valid");

        assert_eq!(table.version(), MANAGER_REVIEW_TABLE_VERSION);
        assert_eq!(table.groups().len(), 4);
        assert_eq!(table.category_keys().count(), 10);

        for group in table.groups() {
            assert!((group.category_total() - group.weight_pct).abs() < WEIGHT_TOLERANCE);
        }
        let total: f64 = table.entries().iter().map(|entry| entry.weight_pct).sum();
        assert!((total - 100.0).abs() < WEIGHT_TOLERANCE);
    }

    #[test]
    fn rejects_group_whose_categories_do_not_match() {
        let mut groups = two_groups(60.0, 40.0);
        groups[0].categories[0].weight_pct = 55.0;

        match WeightTable::new("test", groups) {
            Err(WeightTableError::GroupSumMismatch { group, .. }) => assert_eq!(group, "front"),
            other => panic!("expected group mismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_total_other_than_one_hundred() {
        let result = WeightTable::new("test", two_groups(60.0, 30.0));
        assert_eq!(result, Err(WeightTableError::TotalMismatch(90.0)));
    }

    #[test]
    fn rejects_duplicate_category_keys() {
        let mut groups = two_groups(50.0, 50.0);
        groups[1].categories[0].key = "service";

        let result = WeightTable::new("test", groups);
        assert_eq!(
            result,
            Err(WeightTableError::DuplicateCategory("service".to_string()))
        );
    }

    #[test]
    fn rejects_empty_group() {
        let mut groups = two_groups(50.0, 50.0);
        groups[1].categories.clear();

        let result = WeightTable::new("test", groups);
        assert_eq!(result, Err(WeightTableError::EmptyGroup("back".to_string())));
    }

    #[test]
    fn looks_up_groups_and_categories() {
        let table = WeightTable::manager_review().expect("valid table");

        assert_eq!(table.group("business").map(|g| g.weight_pct), Some(25.0));
        assert!(table.contains_category("maintenance"));
        assert!(!table.contains_category("parking"));
    }
}
