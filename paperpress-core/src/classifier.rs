//! Heuristic paragraph classifier.
//!
//! Maps a paragraph's existing style name and raw text to one of the eight
//! semantic roles via an ordered rule cascade — first match wins, and the
//! cascade is total: every input resolves to exactly one role.

use std::sync::LazyLock;

use regex::Regex;

use crate::docx::Paragraph;
use crate::layout::Role;

// Pre-compiled text-pattern rules, checked in declaration order.
static ABSTRACT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(摘\s*要|关\s*键\s*词)\s*[：:]").unwrap());

static ABSTRACT_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(摘\s*要|关\s*键\s*词)").unwrap());

static SECTION_L2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[（(]?[一二三四五六七八九十]+[）)、]|^\d+[\.、．]\d*\s").unwrap());

static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[?\d+\]?\s").unwrap());

pub struct ParagraphClassifier;

impl Default for ParagraphClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ParagraphClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_paragraph(&self, style_name: Option<&str>, para: &Paragraph) -> Role {
        self.classify(style_name, &para.text())
    }

    /// Resolve a role from an existing style name plus the paragraph text.
    /// Pure function: repeated calls on the same input always agree.
    pub fn classify(&self, style_name: Option<&str>, text: &str) -> Role {
        let existing = style_name.unwrap_or("");

        // 1. A paragraph already carrying a target style keeps it,
        //    regardless of text content.
        if let Some(role) = Role::from_style_name(existing) {
            return role;
        }

        // 2. Generic styles from source formats map directly.
        if existing == "Heading 1" || existing == "Title" {
            return Role::TitleMain;
        }
        if existing == "Heading 2" || existing == "Subtitle" {
            return Role::Subtitle;
        }
        if existing == "Heading 3" || existing == "Heading 4" {
            return Role::SectionL2;
        }
        if existing.contains("Quote") || existing.contains("Block") {
            return Role::Quote;
        }
        if existing.contains("Footnote") {
            return Role::Footnote;
        }

        // 3. Empty text never reaches the pattern rules.
        let text = text.trim();
        if text.is_empty() {
            return Role::Body;
        }

        // 4. Text-pattern battery, first match wins.
        if ABSTRACT_LABEL_RE.is_match(text) {
            return Role::AbstractLabel;
        }
        if ABSTRACT_TEXT_RE.is_match(text) {
            return Role::AbstractText;
        }
        if SECTION_L2_RE.is_match(text) {
            return Role::SectionL2;
        }
        if FOOTNOTE_RE.is_match(text) {
            return Role::Footnote;
        }

        Role::Body
    }
}
