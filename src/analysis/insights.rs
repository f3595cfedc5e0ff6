//! Dashboard insights over a fetched page of findings.
//!
//! Every function here is a pure transform: no I/O, no shared state, and
//! no failure modes. Missing labels fall back to fixed placeholders instead
//! of erroring.

use crate::models::{
    DomainCount, ExecutiveMetrics, Finding, Insights, SourceCount, Summary, TrendPoint,
};
use chrono::{Days, Local, NaiveDate};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Label for findings without a domain.
pub const OTHER_DOMAIN: &str = "other";

/// Label for findings without a source.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Number of sources kept in the source histogram.
pub const TOP_SOURCES: usize = 8;

/// Length of the trend window in days.
pub const DEFAULT_TREND_DAYS: u32 = 14;

/// Tunables for [`build_insights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightOptions {
    pub trend_days: u32,
    pub top_sources: usize,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            trend_days: DEFAULT_TREND_DAYS,
            top_sources: TOP_SOURCES,
        }
    }
}

fn label_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(label) if !label.is_empty() => label,
        _ => fallback,
    }
}

/// Count labels, ordered by count descending then label ascending.
fn ranked_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();

    for label in labels {
        *totals.entry(label).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = totals
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    // Stable sort keeps the alphabetical order among equal counts
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked
}

/// Histogram of findings per domain.
pub fn count_by_domain(findings: &[Finding]) -> Vec<DomainCount> {
    ranked_counts(
        findings
            .iter()
            .map(|f| label_or(f.domain.as_deref(), OTHER_DOMAIN)),
    )
    .into_iter()
    .map(|(domain, count)| DomainCount { domain, count })
    .collect()
}

/// Histogram of findings per source, limited to the top eight.
#[allow(dead_code)] // Fixed-size form of `top_sources`
pub fn count_by_source(findings: &[Finding]) -> Vec<SourceCount> {
    top_sources(findings, TOP_SOURCES)
}

/// Histogram of findings per source, limited to the `n` largest.
pub fn top_sources(findings: &[Finding], n: usize) -> Vec<SourceCount> {
    let mut ranked = ranked_counts(
        findings
            .iter()
            .map(|f| label_or(f.source.as_deref(), UNKNOWN_SOURCE)),
    );
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect()
}

/// Daily finding counts over the `days` ending today (local date).
pub fn findings_trend(findings: &[Finding], days: u32) -> Vec<TrendPoint> {
    findings_trend_on(findings, days, Local::now().date_naive())
}

/// Daily finding counts over the `days` ending on `today`.
///
/// Always returns exactly `days` points in ascending date order. A finding
/// lands in the bucket for the UTC date of its timestamp; findings outside
/// the window or with unparseable timestamps are skipped.
pub fn findings_trend_on(findings: &[Finding], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let window: Vec<NaiveDate> = (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .collect();

    let mut buckets: HashMap<NaiveDate, usize> =
        window.iter().map(|date| (*date, 0)).collect();

    for finding in findings {
        let Some(timestamp) = finding.timestamp() else {
            continue;
        };
        if let Some(count) = buckets.get_mut(&timestamp.date_naive()) {
            *count += 1;
        }
    }

    window
        .into_iter()
        .map(|date| TrendPoint {
            date: date.format("%Y-%m-%d").to_string(),
            count: buckets.get(&date).copied().unwrap_or_default(),
        })
        .collect()
}

/// Format with one decimal, rounding the exact binary value to nearest.
///
/// `{:.1}` already rounds the exact value, but breaks exact ties to even.
/// Ties only occur at odd multiples of 0.25; those round upward.
fn one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (value * 10.0).ceil() / 10.0);
    }
    format!("{:.1}", value)
}

/// Headline figures for the executive view.
///
/// The critical ratio divides the summary's critical count by the size of
/// `findings`; the two may come from different populations, so the ratio
/// can exceed 100%.
pub fn executive_metrics(summary: &Summary, findings: &[Finding]) -> ExecutiveMetrics {
    let total_findings = findings.len();

    let (critical_ratio, average_risk) = if total_findings == 0 {
        ("0.0%".to_string(), "0.0".to_string())
    } else {
        let total = total_findings as f64;
        let ratio = summary.critical as f64 / total * 100.0;
        let mean = findings.iter().map(|f| f.risk_score).sum::<f64>() / total;
        (format!("{}%", one_decimal(ratio)), one_decimal(mean))
    };

    // No fallback label here: a missing domain is its own distinct value
    let distinct_domains = findings
        .iter()
        .map(|f| f.domain.as_deref())
        .collect::<HashSet<_>>()
        .len();

    ExecutiveMetrics {
        total_findings,
        critical_ratio,
        average_risk,
        distinct_domains,
    }
}

/// Severity counts across the fetched page.
pub fn severity_breakdown(findings: &[Finding]) -> Summary {
    Summary::from_findings(findings)
}

/// Compute every dashboard view for one fetch cycle.
pub fn build_insights(summary: &Summary, findings: &[Finding], options: &InsightOptions) -> Insights {
    Insights {
        metrics: executive_metrics(summary, findings),
        severity_breakdown: severity_breakdown(findings),
        domains: count_by_domain(findings),
        sources: top_sources(findings, options.top_sources),
        trend: findings_trend(findings, options.trend_days),
    }
}
