//! Data models for findings and dashboard insights.
//!
//! This module contains the records fetched from the findings backend
//! and the derived views computed from them for presentation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity - informational or hygiene findings
    Low,
    /// Medium severity - weaknesses worth scheduling
    Medium,
    /// High severity - exploitable exposure
    High,
    /// Critical severity - active or trivially exploitable risk
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

impl Severity {
    /// All tiers, highest first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Low => "🟢",
            Severity::Medium => "🟡",
            Severity::High => "🟠",
            Severity::Critical => "🔴",
        }
    }

    /// Parse a severity label as written by the backend.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "critical" | "fatal" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" | "informational" | "info" => Some(Severity::Low),
            _ => None,
        }
    }

    /// Map an OCSF `severity_id` onto a tier.
    pub fn from_id(id: i64) -> Self {
        match id {
            i64::MIN..=2 => Severity::Low,
            3 => Severity::Medium,
            4 => Severity::High,
            _ => Severity::Critical,
        }
    }
}

/// Resource affected by a finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingResource {
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub platform: String,
}

/// Cross-reference identifiers attached to a finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingReferences {
    pub cve: Vec<String>,
    pub cwe: Vec<String>,
    pub owasp: Vec<String>,
    pub mitre_attack: Vec<String>,
}

/// A single security finding as served by the backend.
///
/// Fields missing from the payload take their defaults; `domain` and
/// `source` stay `None` so the insights layer can apply its fallback labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    pub finding_uid: String,
    pub standard: String,
    pub schema_version: String,
    pub status: String,
    pub severity_id: i64,
    pub severity: String,
    pub risk_score: f64,
    pub title: String,
    pub description: String,
    pub category_name: String,
    pub class_name: String,
    pub type_name: String,
    pub domain: Option<String>,
    pub activity_name: String,
    /// Detection time, ISO 8601.
    pub time: String,
    pub source: Option<String>,
    pub resource: FindingResource,
    pub references: FindingReferences,
    /// Raw vendor payload, passed through untouched.
    pub raw_data: serde_json::Map<String, serde_json::Value>,
}

impl Finding {
    /// Parse `time` as an instant.
    ///
    /// Accepts RFC 3339 and naive ISO date-times; the latter are read as UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.time.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Severity tier from the label, falling back to `severity_id`.
    pub fn severity_tier(&self) -> Severity {
        Severity::from_label(&self.severity).unwrap_or_else(|| Severity::from_id(self.severity_id))
    }
}

/// Severity-tier counts served by `/api/v1/summary`.
///
/// The counts may cover a different population than any fetched page of
/// findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl Summary {
    /// Count severity tiers across a collection of findings.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();

        for finding in findings {
            match finding.severity_tier() {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }

        summary
    }

    /// Sum of all tiers.
    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high + self.critical
    }

    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    /// Number of findings at `severity` or above.
    pub fn count_at_or_above(&self, severity: Severity) -> u64 {
        Severity::ALL
            .iter()
            .filter(|tier| **tier >= severity)
            .map(|tier| self.count(*tier))
            .sum()
    }
}

/// Backend liveness report from `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// One bar of the domain histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

/// One bar of the source histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

/// One day of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub count: usize,
}

/// Headline figures for the executive view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveMetrics {
    pub total_findings: usize,
    /// Percentage with one decimal and a trailing `%`.
    pub critical_ratio: String,
    /// Mean risk score with one decimal.
    pub average_risk: String,
    pub distinct_domains: usize,
}

/// All derived views for one fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub metrics: ExecutiveMetrics,
    pub severity_breakdown: Summary,
    pub domains: Vec<DomainCount>,
    pub sources: Vec<SourceCount>,
    pub trend: Vec<TrendPoint>,
}

/// Metadata about a generated insights report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Backend base address the data was fetched from.
    pub api_base_url: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Limit passed to the findings endpoint.
    pub findings_limit: u32,
    /// Length of the trend window in days.
    pub trend_days: u32,
    /// Wall time spent fetching and computing, in seconds.
    pub duration_seconds: f64,
}

/// The complete insights report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Severity counts as reported by the backend.
    pub summary: Summary,
    pub insights: Insights,
}
