use serde::{Deserialize, Serialize};

use super::scorecard::Scorecard;
use super::weights::{GroupWeight, WeightTable};

/// How a group with some unscored categories is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialGroupPolicy {
    /// The group has no subtotal until every category is scored.
    #[default]
    Withhold,
    /// The subtotal is the weighted average over the scored categories.
    Prorate,
}

impl PartialGroupPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "withhold" | "strict" => Some(Self::Withhold),
            "prorate" | "partial" => Some(Self::Prorate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Withhold => "withhold",
            Self::Prorate => "prorate",
        }
    }
}

pub const GROUP_SCORE_PRECISION: i32 = 2;
pub const OVERALL_SCORE_PRECISION: i32 = 1;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `Σ(score·weight) / Σ(weight)` over `(score, weight)` pairs, unrounded.
///
/// Under `Withhold` a single missing score makes the result `None`; under
/// `Prorate` missing scores are skipped. Zero total weight yields `None`.
pub fn weighted_average<I>(pairs: I, policy: PartialGroupPolicy) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (score, weight) in pairs {
        match (score, policy) {
            (Some(score), _) => {
                weighted_sum += score * weight;
                total_weight += weight;
            }
            (None, PartialGroupPolicy::Withhold) => return None,
            (None, PartialGroupPolicy::Prorate) => {}
        }
    }

    if total_weight > 0.0 {
        Some(weighted_sum / total_weight)
    } else {
        None
    }
}

/// Subtotal for one group on the 0-100 scale, rounded to two decimals.
pub fn compute_group_score(
    group: &GroupWeight,
    scorecard: &Scorecard,
    policy: PartialGroupPolicy,
) -> Option<f64> {
    let pairs = group.categories.iter().map(|category| {
        (
            scorecard.score(category.key).map(f64::from),
            category.weight_pct,
        )
    });

    weighted_average(pairs, policy).map(|score| round_to(score, GROUP_SCORE_PRECISION))
}

/// Overall score from `(group score, group weight)` pairs, prorated over the
/// scored groups and rounded to one decimal. `None` when no group is scored.
pub fn compute_overall_score<I>(groups: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    weighted_average(groups, PartialGroupPolicy::Prorate)
        .map(|score| round_to(score, OVERALL_SCORE_PRECISION))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub key: &'static str,
    pub label: &'static str,
    pub weight_pct: f64,
    pub score: Option<u8>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub key: &'static str,
    pub label: &'static str,
    pub weight_pct: f64,
    pub score: Option<f64>,
    pub categories: Vec<CategoryBreakdown>,
}

/// Group subtotals and overall score for one scorecard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub table_version: &'static str,
    pub policy: PartialGroupPolicy,
    pub groups: Vec<GroupBreakdown>,
    pub overall_score: Option<f64>,
    pub missing_categories: Vec<&'static str>,
}

impl ScoreBreakdown {
    pub fn group_score(&self, key: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|group| group.key == key)
            .and_then(|group| group.score)
    }

    pub fn is_complete(&self) -> bool {
        self.missing_categories.is_empty()
    }
}

pub fn aggregate(
    table: &WeightTable,
    scorecard: &Scorecard,
    policy: PartialGroupPolicy,
) -> ScoreBreakdown {
    let groups: Vec<GroupBreakdown> = table
        .groups()
        .iter()
        .map(|group| GroupBreakdown {
            key: group.key,
            label: group.label,
            weight_pct: group.weight_pct,
            score: compute_group_score(group, scorecard, policy),
            categories: group
                .categories
                .iter()
                .map(|category| {
                    let entry = scorecard.get(category.key);
                    CategoryBreakdown {
                        key: category.key,
                        label: category.label,
                        weight_pct: category.weight_pct,
                        score: entry.and_then(|entry| entry.score),
                        comments: entry.and_then(|entry| entry.comments.clone()),
                    }
                })
                .collect(),
        })
        .collect();

    let overall_score =
        compute_overall_score(groups.iter().map(|group| (group.score, group.weight_pct)));

    ScoreBreakdown {
        table_version: table.version(),
        policy,
        groups,
        overall_score,
        missing_categories: scorecard.missing(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> WeightTable {
        WeightTable::manager_review().expect("valid table")
    }

    fn operational_scores(card: &mut Scorecard) {
        card.set("sanitation", Some(90), None).expect("score");
        card.set("inventory", Some(80), None).expect("score");
        card.set("quality", Some(100), None).expect("score");
        card.set("maintenance", Some(70), None).expect("score");
    }

    #[test]
    fn fully_scored_group_is_weighted_average() {
        let table = table();
        let mut card = Scorecard::for_table(&table);
        operational_scores(&mut card);

        let group = table.group("operational").expect("group");
        let score = compute_group_score(group, &card, PartialGroupPolicy::Withhold);

        // (90*10 + 80*10 + 100*10 + 70*5) / 35
        assert_eq!(score, Some(87.14));
    }

    #[test]
    fn withhold_policy_requires_every_category() {
        let table = table();
        let mut card = Scorecard::for_table(&table);
        card.set("sanitation", Some(90), None).expect("score");

        let group = table.group("operational").expect("group");
        assert_eq!(
            compute_group_score(group, &card, PartialGroupPolicy::Withhold),
            None
        );
        assert_eq!(
            compute_group_score(group, &card, PartialGroupPolicy::Prorate),
            Some(90.0)
        );
    }

    #[test]
    fn prorated_group_uses_scored_weights_only() {
        let table = table();
        let mut card = Scorecard::for_table(&table);
        card.set("sanitation", Some(90), None).expect("score");
        card.set("maintenance", Some(60), None).expect("score");

        let group = table.group("operational").expect("group");
        // (90*10 + 60*5) / 15
        assert_eq!(
            compute_group_score(group, &card, PartialGroupPolicy::Prorate),
            Some(80.0)
        );
    }

    #[test]
    fn overall_is_none_without_scored_groups() {
        assert_eq!(compute_overall_score(vec![(None, 35.0), (None, 65.0)]), None);
        assert_eq!(compute_overall_score(Vec::new()), None);
    }

    #[test]
    fn overall_prorates_over_scored_groups() {
        let overall =
            compute_overall_score(vec![(Some(80.0), 35.0), (None, 30.0), (Some(90.0), 25.0)]);
        // (80*35 + 90*25) / 60 = 84.1666...
        assert_eq!(overall, Some(84.2));
    }

    #[test]
    fn aggregate_reports_missing_categories_in_table_order() {
        let table = table();
        let mut card = Scorecard::for_table(&table);
        operational_scores(&mut card);

        let breakdown = aggregate(&table, &card, PartialGroupPolicy::Withhold);

        assert_eq!(breakdown.group_score("operational"), Some(87.14));
        assert_eq!(breakdown.group_score("people"), None);
        assert_eq!(breakdown.overall_score, Some(87.1));
        assert_eq!(
            breakdown.missing_categories,
            vec![
                "recruitment",
                "scheduling",
                "retention",
                "sales",
                "efficiency",
                "leadership"
            ]
        );
        assert!(!breakdown.is_complete());
    }

    #[test]
    fn policy_parses_aliases() {
        assert_eq!(
            PartialGroupPolicy::parse(" Prorate "),
            Some(PartialGroupPolicy::Prorate)
        );
        assert_eq!(
            PartialGroupPolicy::parse("strict"),
            Some(PartialGroupPolicy::Withhold)
        );
        assert_eq!(PartialGroupPolicy::parse("average"), None);
    }
}
