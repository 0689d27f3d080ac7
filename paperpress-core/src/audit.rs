//! Citation presence audit.
//!
//! Every citation must carry three non-empty fields: the source the
//! research assistant returned, a page locator (or the literal 页码待核
//! placeholder), and the original quote snippet. Violations are collected
//! into a JSON report; the audit never edits the citations themselves.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_PASS: &str = "PASS";
pub const STATUS_FAIL: &str = "FAIL";

pub const ERROR_MISSING_SOURCE: &str = "MISSING_SOURCE";
pub const ERROR_MISSING_SNIPPET: &str = "MISSING_SNIPPET";
pub const ERROR_MISSING_FIELD: &str = "MISSING_FIELD";

/// Placeholder a citation uses when the page number still needs manual
/// confirmation.
pub const UNCONFIRMED_PAGE: &str = "页码待核";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub claim: String,
    #[serde(default)]
    pub notebooklm_source: String,
    #[serde(default)]
    pub page_locator: String,
    #[serde(default)]
    pub quote_snippet: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitationFile {
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub citation_index: usize,
    pub claim_preview: String,
    pub error_type: &'static str,
    pub field: &'static str,
    pub details: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnconfirmedPage {
    pub citation_index: usize,
    pub claim_preview: String,
    pub notebooklm_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub status: &'static str,
    pub generated_at: DateTime<Utc>,
    pub total_citations: usize,
    pub violations_count: usize,
    pub unconfirmed_pages_count: usize,
    pub violations: Vec<Violation>,
    pub unconfirmed_pages: Vec<UnconfirmedPage>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.status == STATUS_PASS
    }
}

fn claim_preview(citation: &Citation, index: usize) -> String {
    if citation.claim.is_empty() {
        format!("Citation #{index}")
    } else {
        citation.claim.chars().take(80).collect()
    }
}

fn validate_citation(citation: &Citation, index: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    let preview = claim_preview(citation, index);

    if citation.notebooklm_source.trim().is_empty() {
        violations.push(Violation {
            citation_index: index,
            claim_preview: preview.clone(),
            error_type: ERROR_MISSING_SOURCE,
            field: "notebooklm_source",
            details: "notebooklm_source 不得为空，必须来自实际检索回答".to_string(),
        });
    }

    if citation.page_locator.trim().is_empty() {
        violations.push(Violation {
            citation_index: index,
            claim_preview: preview.clone(),
            error_type: ERROR_MISSING_FIELD,
            field: "page_locator",
            details: format!("page_locator 不得为空；若未提供页码，填写'{UNCONFIRMED_PAGE}'"),
        });
    }

    if citation.quote_snippet.trim().is_empty() {
        violations.push(Violation {
            citation_index: index,
            claim_preview: preview,
            error_type: ERROR_MISSING_SNIPPET,
            field: "quote_snippet",
            details: "quote_snippet 不得为空，必须是检索返回的原始文字".to_string(),
        });
    }

    violations
}

pub fn audit_citations(citations: &[Citation]) -> AuditReport {
    let mut violations = Vec::new();
    let mut unconfirmed_pages = Vec::new();

    for (index, citation) in citations.iter().enumerate() {
        violations.extend(validate_citation(citation, index));

        if citation.page_locator.trim() == UNCONFIRMED_PAGE {
            unconfirmed_pages.push(UnconfirmedPage {
                citation_index: index,
                claim_preview: claim_preview(citation, index),
                notebooklm_source: citation.notebooklm_source.clone(),
            });
        }
    }

    AuditReport {
        status: if violations.is_empty() {
            STATUS_PASS
        } else {
            STATUS_FAIL
        },
        generated_at: Utc::now(),
        total_citations: citations.len(),
        violations_count: violations.len(),
        unconfirmed_pages_count: unconfirmed_pages.len(),
        violations,
        unconfirmed_pages,
    }
}

/// Load citations from `input`, audit them, and write the JSON report.
pub fn run_audit(input: &Path, report_path: &Path) -> Result<AuditReport> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read citations file: {}", input.display()))?;
    let file: CitationFile = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", input.display()))?;

    if file.citations.is_empty() {
        eprintln!("⚠️  输入文件中未找到 citations 数组");
    }

    let report = audit_citations(&file.citations);

    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(source: &str, page: &str, snippet: &str) -> Citation {
        Citation {
            claim: "白银货币化始于成化年间".to_string(),
            notebooklm_source: source.to_string(),
            page_locator: page.to_string(),
            quote_snippet: snippet.to_string(),
        }
    }

    #[test]
    fn complete_citation_passes() {
        let report = audit_citations(&[citation("《明实录》", "卷三, 页12", "原文片段")]);
        assert!(report.passed());
        assert_eq!(report.violations_count, 0);
    }

    #[test]
    fn each_missing_field_is_a_violation() {
        let report = audit_citations(&[citation("", "", "  ")]);
        assert_eq!(report.status, STATUS_FAIL);
        assert_eq!(report.violations_count, 3);
        let fields: Vec<&str> = report.violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec!["notebooklm_source", "page_locator", "quote_snippet"]
        );
    }

    #[test]
    fn unconfirmed_pages_are_tallied_not_failed() {
        let report = audit_citations(&[citation("《明史》", UNCONFIRMED_PAGE, "片段")]);
        assert!(report.passed());
        assert_eq!(report.unconfirmed_pages_count, 1);
        assert_eq!(report.unconfirmed_pages[0].citation_index, 0);
    }

    #[test]
    fn claim_preview_is_truncated() {
        let mut c = citation("来源", "页1", "片段");
        c.claim = "长".repeat(200);
        let report = audit_citations(&[Citation {
            notebooklm_source: String::new(),
            ..c
        }]);
        assert_eq!(report.violations[0].claim_preview.chars().count(), 80);
    }
}
