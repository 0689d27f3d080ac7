//! Validation results as data.
//!
//! Rule violations are never thrown — every check appends a
//! `(status, rule name, detail)` entry and the caller decides the exit
//! policy at the end. A report is built fresh per run and never merged
//! across runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Fail => write!(f, "FAIL"),
            CheckStatus::Warn => write!(f, "WARN"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub status: CheckStatus,
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub created_at: DateTime<Utc>,
    pub entries: Vec<CheckEntry>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Append a PASS/FAIL entry depending on `ok`.
    pub fn check(&mut self, name: impl Into<String>, ok: bool, detail: impl Into<String>) {
        self.entries.push(CheckEntry {
            status: if ok { CheckStatus::Pass } else { CheckStatus::Fail },
            name: name.into(),
            detail: detail.into(),
        });
    }

    pub fn pass(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(CheckEntry {
            status: CheckStatus::Pass,
            name: name.into(),
            detail: detail.into(),
        });
    }

    pub fn warn(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(CheckEntry {
            status: CheckStatus::Warn,
            name: name.into(),
            detail: detail.into(),
        });
    }

    pub fn pass_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == CheckStatus::Pass)
            .count()
    }

    pub fn fail_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == CheckStatus::Fail)
            .count()
    }

    pub fn warn_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == CheckStatus::Warn)
            .count()
    }

    /// Exit policy: a FAIL always sinks the run; under `strict` a WARN
    /// does too.
    pub fn is_success(&self, strict: bool) -> bool {
        if self.fail_count() > 0 {
            return false;
        }
        if strict && self.warn_count() > 0 {
            return false;
        }
        true
    }
}
