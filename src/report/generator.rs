//! Markdown and JSON report generation.
//!
//! This module renders the derived dashboard views as a Markdown
//! document or as pretty-printed JSON.

use crate::models::{
    DomainCount, ExecutiveMetrics, Report, ReportMetadata, Severity, SourceCount, Summary,
    TrendPoint,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Security Findings Insights\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_metrics_section(&report.insights.metrics));
    output.push_str(&generate_severity_section(
        &report.summary,
        &report.insights.severity_breakdown,
    ));
    output.push_str(&generate_domains_section(&report.insights.domains));
    output.push_str(&generate_sources_section(&report.insights.sources));
    output.push_str(&generate_trend_section(&report.insights.trend));

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Backend:** {}\n", metadata.api_base_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Findings Limit:** {}\n",
        metadata.findings_limit
    ));
    section.push_str(&format!(
        "- **Trend Window:** {} days\n",
        metadata.trend_days
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_metrics_section(metrics: &ExecutiveMetrics) -> String {
    let mut section = String::new();

    section.push_str("## Executive Metrics\n\n");
    section.push_str("| Findings | Critical Ratio | Average Risk | Domains |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        metrics.total_findings,
        metrics.critical_ratio,
        metrics.average_risk,
        metrics.distinct_domains
    ));

    section
}

/// Backend summary next to the severity counts of the fetched page.
fn generate_severity_section(summary: &Summary, page: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Severity\n\n");
    section.push_str("| Severity | Backend | Fetched |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for severity in Severity::ALL {
        section.push_str(&format!(
            "| {} {} | {} | {} |\n",
            severity.emoji(),
            severity,
            summary.count(severity),
            page.count(severity)
        ));
    }
    section.push_str(&format!(
        "| **Total** | **{}** | **{}** |\n\n",
        summary.total(),
        page.total()
    ));

    section
}

fn generate_domains_section(domains: &[DomainCount]) -> String {
    let mut section = String::new();

    section.push_str("## Findings by Domain\n\n");
    if domains.is_empty() {
        section.push_str("No findings.\n\n");
        return section;
    }

    section.push_str("| Domain | Findings |\n");
    section.push_str("|:---|:---:|\n");
    for entry in domains {
        section.push_str(&format!("| {} | {} |\n", escape_cell(&entry.domain), entry.count));
    }
    section.push('\n');

    section
}

fn generate_sources_section(sources: &[SourceCount]) -> String {
    let mut section = String::new();

    section.push_str("## Top Sources\n\n");
    if sources.is_empty() {
        section.push_str("No findings.\n\n");
        return section;
    }

    section.push_str("| Source | Findings |\n");
    section.push_str("|:---|:---:|\n");
    for entry in sources {
        section.push_str(&format!("| {} | {} |\n", escape_cell(&entry.source), entry.count));
    }
    section.push('\n');

    section
}

fn generate_trend_section(trend: &[TrendPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Daily Trend\n\n");
    section.push_str("| Date | Findings |\n");
    section.push_str("|:---|:---:|\n");
    for point in trend {
        section.push_str(&format!("| {} | {} |\n", point.date, point.count));
    }
    section.push('\n');

    section
}

/// Make a backend-supplied label safe inside a table cell.
fn escape_cell(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Insights;
    use chrono::Utc;

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            api_base_url: "http://localhost:8080".to_string(),
            generated_at: Utc::now(),
            findings_limit: 200,
            trend_days: 2,
            duration_seconds: 0.4,
        };

        Report {
            metadata,
            summary: Summary {
                low: 4,
                medium: 3,
                high: 2,
                critical: 1,
            },
            insights: Insights {
                metrics: ExecutiveMetrics {
                    total_findings: 3,
                    critical_ratio: "33.3%".to_string(),
                    average_risk: "6.7".to_string(),
                    distinct_domains: 2,
                },
                severity_breakdown: Summary {
                    critical: 1,
                    high: 2,
                    ..Summary::default()
                },
                domains: vec![
                    DomainCount {
                        domain: "web".to_string(),
                        count: 2,
                    },
                    DomainCount {
                        domain: "api".to_string(),
                        count: 1,
                    },
                ],
                sources: vec![SourceCount {
                    source: "sast".to_string(),
                    count: 3,
                }],
                trend: vec![
                    TrendPoint {
                        date: "2024-03-13".to_string(),
                        count: 1,
                    },
                    TrendPoint {
                        date: "2024-03-14".to_string(),
                        count: 2,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Security Findings Insights"));
        assert!(markdown.contains("## Executive Metrics"));
        assert!(markdown.contains("| 3 | 33.3% | 6.7 | 2 |"));
        assert!(markdown.contains("| web | 2 |"));
        assert!(markdown.contains("| sast | 3 |"));
        assert!(markdown.contains("| 2024-03-14 | 2 |"));
    }

    #[test]
    fn test_severity_section_compares_backend_and_page() {
        let report = create_test_report();
        let section = generate_severity_section(&report.summary, &report.insights.severity_breakdown);

        assert!(section.contains("Critical | 1 | 1 |"));
        assert!(section.contains("Low | 4 | 0 |"));
        assert!(section.contains("| **Total** | **10** | **3** |"));
    }

    #[test]
    fn test_empty_histograms() {
        assert!(generate_domains_section(&[]).contains("No findings."));
        assert!(generate_sources_section(&[]).contains("No findings."));
    }

    #[test]
    fn test_labels_with_pipes_stay_in_one_cell() {
        let domains = vec![DomainCount {
            domain: "web|api".to_string(),
            count: 2,
        }];
        let sources = vec![SourceCount {
            source: "scan\nner | v2".to_string(),
            count: 1,
        }];

        let section = generate_domains_section(&domains);
        assert!(section.contains("| web\\|api | 2 |"));

        let section = generate_sources_section(&sources);
        assert!(section.contains("| scan ner \\| v2 | 1 |"));
        assert_eq!(section.lines().filter(|l| l.starts_with('|')).count(), 3);
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"api_base_url\""));
        assert!(json.contains("\"criticalRatio\": \"33.3%\""));
        assert!(json.contains("\"trend\""));
    }
}
