use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::domain::SanitationAudit;
use crate::branches::{Branch, BranchId};
use crate::scoring::round_to;

pub const TREND_WINDOW: usize = 3;
pub const TREND_THRESHOLD: f64 = 5.0;
pub const ISSUE_LOOKBACK: usize = 5;
pub const BRANCH_TOP_ISSUES: usize = 5;
pub const NETWORK_BRANCH_TOP_ISSUES: usize = 3;
pub const NETWORK_TOP_ISSUES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
    NoData,
}

/// Compares the mean of the latest window against the window before it.
/// `scores` must be ordered newest first.
pub fn score_trend(scores: &[u32]) -> ScoreTrend {
    if scores.is_empty() {
        return ScoreTrend::NoData;
    }

    let recent = &scores[..scores.len().min(TREND_WINDOW)];
    let older = scores
        .get(TREND_WINDOW..scores.len().min(TREND_WINDOW * 2))
        .unwrap_or_default();
    if older.is_empty() {
        return ScoreTrend::InsufficientData;
    }

    let delta = mean(recent) - mean(older);
    if delta > TREND_THRESHOLD {
        ScoreTrend::Improving
    } else if delta < -TREND_THRESHOLD {
        ScoreTrend::Declining
    } else {
        ScoreTrend::Stable
    }
}

fn mean(scores: &[u32]) -> f64 {
    let total: u32 = scores.iter().sum();
    f64::from(total) / scores.len() as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCount {
    pub category_name: String,
    pub count: usize,
}

/// Most frequently deducted categories, ties broken by name.
pub fn common_issues<'a, I>(audits: I, limit: usize) -> Vec<IssueCount>
where
    I: IntoIterator<Item = &'a SanitationAudit>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for audit in audits {
        for category in audit.deficiencies() {
            *counts.entry(category.category_name.as_str()).or_default() += 1;
        }
    }

    let mut issues: Vec<IssueCount> = counts
        .into_iter()
        .map(|(name, count)| IssueCount {
            category_name: name.to_string(),
            count,
        })
        .collect();
    issues.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    issues.truncate(limit);
    issues
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchAuditStats {
    pub branch_id: BranchId,
    pub branch_name: String,
    pub total_audits: usize,
    pub average_score: Option<f64>,
    pub latest_score: Option<u32>,
    pub latest_audit_date: Option<NaiveDate>,
    pub trend: ScoreTrend,
    pub common_issues: Vec<IssueCount>,
}

/// Statistics for one branch. `audits` must belong to the branch and be
/// ordered newest first.
pub fn branch_stats(
    branch: &Branch,
    audits: &[&SanitationAudit],
    issue_limit: usize,
) -> BranchAuditStats {
    let scores: Vec<u32> = audits.iter().map(|audit| audit.total_score()).collect();

    BranchAuditStats {
        branch_id: branch.id,
        branch_name: branch.name.clone(),
        total_audits: audits.len(),
        average_score: (!scores.is_empty()).then(|| round_to(mean(&scores), 1)),
        latest_score: scores.first().copied(),
        latest_audit_date: audits.first().map(|audit| audit.audit_date),
        trend: score_trend(&scores),
        common_issues: common_issues(audits.iter().take(ISSUE_LOOKBACK).copied(), issue_limit),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchScore {
    pub branch_id: BranchId,
    pub branch_name: String,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkAuditStats {
    pub total_branches: usize,
    pub total_audits: usize,
    pub network_average: Option<f64>,
    pub best_branch: Option<BranchScore>,
    pub worst_branch: Option<BranchScore>,
    pub branches: Vec<BranchAuditStats>,
    pub top_issues: Vec<IssueCount>,
}

/// Network-wide view across every branch. Branch averages feed best/worst,
/// the network average is weighted by audit count.
pub fn network_stats(branches: &[Branch], audits: &[SanitationAudit]) -> NetworkAuditStats {
    let mut ordered: Vec<&SanitationAudit> = audits.iter().collect();
    ordered.sort_by(|a, b| (b.audit_date, b.created_at).cmp(&(a.audit_date, a.created_at)));

    let per_branch: Vec<BranchAuditStats> = branches
        .iter()
        .map(|branch| {
            let own: Vec<&SanitationAudit> = ordered
                .iter()
                .copied()
                .filter(|audit| audit.branch_id == branch.id)
                .collect();
            branch_stats(branch, &own, NETWORK_BRANCH_TOP_ISSUES)
        })
        .collect();

    let ranked: Vec<BranchScore> = per_branch
        .iter()
        .filter_map(|stats| {
            stats.average_score.map(|average_score| BranchScore {
                branch_id: stats.branch_id,
                branch_name: stats.branch_name.clone(),
                average_score,
            })
        })
        .collect();
    let best_branch = ranked
        .iter()
        .fold(None::<&BranchScore>, |best, candidate| match best {
            Some(current) if current.average_score >= candidate.average_score => Some(current),
            _ => Some(candidate),
        })
        .cloned();
    let worst_branch = ranked
        .iter()
        .fold(None::<&BranchScore>, |worst, candidate| match worst {
            Some(current) if current.average_score <= candidate.average_score => Some(current),
            _ => Some(candidate),
        })
        .cloned();

    let total_audits = audits.len();
    let network_average = (total_audits > 0).then(|| {
        let total: u32 = audits.iter().map(SanitationAudit::total_score).sum();
        round_to(f64::from(total) / total_audits as f64, 1)
    });

    NetworkAuditStats {
        total_branches: branches.len(),
        total_audits,
        network_average,
        best_branch,
        worst_branch,
        branches: per_branch,
        top_issues: common_issues(ordered.iter().copied(), NETWORK_TOP_ISSUES),
    }
}
