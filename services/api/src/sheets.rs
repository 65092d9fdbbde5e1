use clap::Args;
use giraffe_quality::audits::{summarize_deficiencies, AuditCategory, ScoreBand};
use giraffe_quality::config::AppConfig;
use giraffe_quality::error::AppError;
use giraffe_quality::import::{AuditSheetImporter, ScoresheetImporter};
use giraffe_quality::scoring::{
    aggregate, compute_audit_score, total_deductions, PartialGroupPolicy, ScoreBreakdown,
    WeightTable,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReviewScoreArgs {
    /// Score sheet with `category_key,score,comments` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Partial group handling (`withhold` or `prorate`). Defaults to the configured policy.
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: Option<PartialGroupPolicy>,
    /// Print the breakdown as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AuditScoreArgs {
    /// Audit sheet with `category_key,category_name,defect_level,notes` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

fn parse_policy(raw: &str) -> Result<PartialGroupPolicy, String> {
    PartialGroupPolicy::parse(raw).ok_or_else(|| {
        format!("unknown partial group policy '{raw}' (expected withhold or prorate)")
    })
}

pub(crate) fn run_review_score(args: ReviewScoreArgs) -> Result<(), AppError> {
    let ReviewScoreArgs { csv, policy, json } = args;

    let policy = match policy {
        Some(policy) => policy,
        None => AppConfig::load()?.scoring.partial_group_policy,
    };
    let table = WeightTable::manager_review()?;
    let scorecard = ScoresheetImporter::from_path(&csv, &table)?;
    let breakdown = aggregate(&table, &scorecard, policy);

    if json {
        match serde_json::to_string_pretty(&breakdown) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Breakdown unavailable as JSON: {}", err),
        }
    } else {
        render_breakdown(&breakdown);
    }
    Ok(())
}

pub(crate) fn render_breakdown(breakdown: &ScoreBreakdown) {
    println!(
        "Manager review score sheet (weights {}, {} policy)",
        breakdown.table_version,
        breakdown.policy.label()
    );

    for group in &breakdown.groups {
        println!(
            "\n{} ({}%): {}",
            group.label,
            group.weight_pct,
            format_score(group.score)
        );
        for category in &group.categories {
            let score = category
                .score
                .map(|score| score.to_string())
                .unwrap_or_else(|| "-".to_string());
            match category.comments.as_deref() {
                Some(comments) => println!(
                    "- {} ({}%): {} [{}]",
                    category.label, category.weight_pct, score, comments
                ),
                None => println!("- {} ({}%): {}", category.label, category.weight_pct, score),
            }
        }
    }

    println!("\nOverall score: {}", format_score(breakdown.overall_score));
    if !breakdown.missing_categories.is_empty() {
        println!(
            "Unscored categories: {}",
            breakdown.missing_categories.join(", ")
        );
    }
}

pub(crate) fn run_audit_score(args: AuditScoreArgs) -> Result<(), AppError> {
    let categories = AuditSheetImporter::from_path(&args.csv)?;
    render_audit(&categories);
    Ok(())
}

pub(crate) fn render_audit(categories: &[AuditCategory]) {
    let deductions = || categories.iter().map(AuditCategory::deduction);
    let total_score = compute_audit_score(deductions());

    println!("Sanitation audit sheet");
    for category in categories {
        println!(
            "- {}: {} (-{})",
            category.category_name,
            category.defect_level.label(),
            category.deduction()
        );
    }

    println!(
        "\nTotal deductions: {}, score: {}/100 ({})",
        total_deductions(deductions()),
        total_score,
        band_label(ScoreBand::from_score(total_score))
    );
    println!("Deficiencies:\n{}", summarize_deficiencies(categories));
}

pub(crate) fn run_weights() -> Result<(), AppError> {
    let table = WeightTable::manager_review()?;
    println!("Manager review weights ({})", table.version());
    for group in table.groups() {
        println!("\n{} ({}%)", group.label, group.weight_pct);
        for category in &group.categories {
            println!("- {} [{}]: {}%", category.label, category.key, category.weight_pct);
        }
    }
    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|score| format!("{score}"))
        .unwrap_or_else(|| "not available".to_string())
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Good => "good",
        ScoreBand::Warning => "needs attention",
        ScoreBand::Critical => "critical",
    }
}
