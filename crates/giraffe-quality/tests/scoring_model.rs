//! Aggregation and deduction behaviour exercised through the public scoring API.

use giraffe_quality::scoring::{
    aggregate, compute_audit_score, compute_group_score, compute_overall_score,
    points_for_defect_level, CategoryWeight, DefectLevel, GroupWeight, PartialGroupPolicy,
    Scorecard, WeightTable, WeightTableError,
};

fn group(key: &'static str, weight_pct: f64, categories: &[(&'static str, f64)]) -> GroupWeight {
    GroupWeight {
        key,
        label: key,
        weight_pct,
        categories: categories
            .iter()
            .map(|&(key, weight_pct)| CategoryWeight {
                key,
                label: key,
                weight_pct,
            })
            .collect(),
    }
}

fn scorecard(table: &WeightTable, pairs: &[(&str, i64)]) -> Scorecard {
    let mut card = Scorecard::for_table(table);
    for (key, score) in pairs {
        card.set(key, Some(*score), None).expect("known category");
    }
    card
}

#[test]
fn weight_tables_must_balance() {
    let table = WeightTable::manager_review().expect("shipped table is consistent");
    let total: f64 = table.groups().iter().map(|group| group.weight_pct).sum();
    assert!((total - 100.0).abs() < 1e-9);

    let lopsided = WeightTable::new(
        "test",
        vec![
            group("front", 60.0, &[("service", 30.0), ("hosting", 20.0)]),
            group("back", 40.0, &[("kitchen", 40.0)]),
        ],
    );
    assert!(matches!(
        lopsided,
        Err(WeightTableError::GroupSumMismatch { ref group, .. }) if group == "front"
    ));

    let short = WeightTable::new(
        "test",
        vec![
            group("front", 50.0, &[("service", 50.0)]),
            group("back", 40.0, &[("kitchen", 40.0)]),
        ],
    );
    assert!(matches!(
        short,
        Err(WeightTableError::TotalMismatch(total)) if (total - 90.0).abs() < 1e-9
    ));
}

#[test]
fn audit_score_never_rises_and_stays_in_range() {
    let mut deductions = Vec::new();
    let mut previous = compute_audit_score(deductions.iter().copied());
    assert_eq!(previous, 100);

    for level in DefectLevel::ordered().into_iter().cycle().take(40) {
        deductions.push(points_for_defect_level(level));
        let score = compute_audit_score(deductions.iter().copied());
        assert!(score <= previous);
        assert!(score <= 100);
        previous = score;
    }
    assert_eq!(previous, 0);
}

#[test]
fn defect_levels_carry_fixed_points_and_labels() {
    let points: Vec<u32> = DefectLevel::ordered()
        .into_iter()
        .map(points_for_defect_level)
        .collect();
    assert_eq!(points, vec![0, 1, 5, 7, 10]);

    for level in DefectLevel::ordered() {
        assert_eq!(level.label().parse::<DefectLevel>(), Ok(level));
        assert_eq!(level.key().parse::<DefectLevel>(), Ok(level));
    }
    assert!("spotless".parse::<DefectLevel>().is_err());
}

#[test]
fn fully_scored_group_is_weighted_mean() {
    let table = WeightTable::manager_review().expect("valid table");
    let card = scorecard(
        &table,
        &[
            ("sanitation", 90),
            ("inventory", 80),
            ("quality", 100),
            ("maintenance", 70),
        ],
    );
    let operational = table.group("operational").expect("operational group");

    for policy in [PartialGroupPolicy::Withhold, PartialGroupPolicy::Prorate] {
        assert_eq!(compute_group_score(operational, &card, policy), Some(87.14));
    }
}

#[test]
fn withheld_group_has_no_subtotal_until_complete() {
    let table = WeightTable::manager_review().expect("valid table");
    let card = scorecard(&table, &[("sanitation", 90), ("inventory", 80), ("quality", 100)]);
    let operational = table.group("operational").expect("operational group");

    assert_eq!(
        compute_group_score(operational, &card, PartialGroupPolicy::Withhold),
        None
    );
    assert_eq!(
        compute_group_score(operational, &card, PartialGroupPolicy::Prorate),
        Some(90.0)
    );
}

#[test]
fn overall_score_combines_group_weights() {
    let table = WeightTable::manager_review().expect("valid table");
    let card = scorecard(
        &table,
        &[
            ("sanitation", 90),
            ("inventory", 80),
            ("quality", 100),
            ("maintenance", 70),
            ("recruitment", 80),
            ("scheduling", 85),
            ("retention", 75),
            ("sales", 90),
            ("efficiency", 80),
            ("leadership", 75),
        ],
    );

    let breakdown = aggregate(&table, &card, PartialGroupPolicy::Withhold);
    assert_eq!(breakdown.group_score("people"), Some(80.0));
    assert_eq!(breakdown.group_score("business"), Some(86.0));
    assert_eq!(breakdown.overall_score, Some(83.5));
    assert!(breakdown.is_complete());

    assert_eq!(
        compute_overall_score([(Some(80.0), 50.0), (Some(90.0), 50.0)]),
        Some(85.0)
    );
    assert_eq!(compute_overall_score([(None, 50.0), (None, 50.0)]), None);
}
