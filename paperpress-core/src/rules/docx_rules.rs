//! Model-based validation: reopen a typeset document and independently
//! re-check it against the layout template.
//!
//! Seven rule groups append entries in a fixed order. Violations are data,
//! not errors — only a missing/unreadable package aborts the run.

use std::path::Path;

use anyhow::{Context, Result};

use crate::docx::{Document, LineRule};
use crate::footnotes::has_footnote_restart_each_page;
use crate::layout::{LayoutSpec, Role};
use crate::report::ValidationReport;

/// Marker token that exempts an italic run from the editorial warning.
pub const NEEDS_REVIEW_MARKER: &str = "NEEDS_REVIEW";

pub fn validate_document(path: &Path, spec: &LayoutSpec) -> Result<ValidationReport> {
    let doc = Document::open(path)
        .with_context(|| format!("cannot open document: {}", path.display()))?;

    let mut report = ValidationReport::new();
    check_margins(&doc, spec, &mut report);
    check_styles_exist(&doc, &mut report);
    check_style_font_size(&doc, spec, &mut report);
    check_style_line_spacing(&doc, spec, &mut report);
    check_style_fonts(&doc, spec, &mut report);
    check_footnote_restart(path, &mut report)?;
    check_needs_review_italic(&doc, &mut report);
    Ok(report)
}

fn approx(actual: i64, expected: i64, tol: i64) -> bool {
    (actual - expected).abs() <= tol
}

fn check_margins(doc: &Document, spec: &LayoutSpec, report: &mut ValidationReport) {
    let Some(sec) = doc.sections.first() else {
        report.check("margins", false, "文档没有节属性");
        return;
    };
    let tol = spec.twip_tolerance;
    let pairs = [
        ("margin_top", sec.margin_top, spec.margin_top()),
        ("margin_bottom", sec.margin_bottom, spec.margin_bottom()),
        ("margin_left", sec.margin_left, spec.margin_left()),
        ("margin_right", sec.margin_right, spec.margin_right()),
    ];
    for (name, actual, expected) in pairs {
        report.check(
            format!("margins/{name}"),
            approx(actual, expected, tol),
            format!("actual={actual} expected={expected} tol={tol}"),
        );
    }
}

fn check_styles_exist(doc: &Document, report: &mut ValidationReport) {
    for role in Role::ALL {
        let name = role.style_name();
        report.check(format!("style_exists/{name}"), doc.styles.contains(name), "");
    }
}

fn check_style_font_size(doc: &Document, spec: &LayoutSpec, report: &mut ValidationReport) {
    let size_map = [
        (Role::Body, spec.body_pt),
        (Role::TitleMain, spec.title_main_pt),
        (Role::Subtitle, spec.subtitle_pt),
        (Role::SectionL2, spec.section_l2_pt),
        (Role::Footnote, spec.footnote_pt),
    ];
    for (role, expected_pt) in size_map {
        let name = role.style_name();
        let rule = format!("font_size/{name}");
        let Some(style) = doc.styles.by_name(name) else {
            report.check(rule, false, "样式不存在");
            continue;
        };
        let Some(half) = style.font_size_half else {
            report.check(rule, false, "font.size=None");
            continue;
        };
        let actual_pt = half as f64 / 2.0;
        report.check(
            rule,
            (actual_pt - expected_pt).abs() < 0.1,
            format!("actual={actual_pt:.1}pt expected={expected_pt}pt"),
        );
    }
}

fn check_style_line_spacing(doc: &Document, spec: &LayoutSpec, report: &mut ValidationReport) {
    let spacing_map = [
        (Role::Body, spec.body_line_pt),
        (Role::Footnote, spec.footnote_line_pt),
    ];
    for (role, expected_pt) in spacing_map {
        let name = role.style_name();
        let rule = format!("line_spacing/{name}");
        let Some(style) = doc.styles.by_name(name) else {
            report.check(rule, false, "样式不存在");
            continue;
        };
        if style.format.line_rule != LineRule::Exact {
            report.check(
                rule,
                false,
                format!("rule={:?} 期望 Exact", style.format.line_rule),
            );
            continue;
        }
        let Some(line) = style.format.line else {
            report.check(rule, false, "line_spacing=None");
            continue;
        };
        let actual_pt = line as f64 / 20.0;
        report.check(
            rule,
            (actual_pt - expected_pt).abs() < 0.2,
            format!("actual={actual_pt:.1}pt expected={expected_pt}pt"),
        );
    }
}

fn check_style_fonts(doc: &Document, spec: &LayoutSpec, report: &mut ValidationReport) {
    let font_map = [
        (Role::Body, spec.east_asian_face(Role::Body)),
        (Role::Footnote, spec.east_asian_face(Role::Footnote)),
    ];
    for (role, expected_east) in font_map {
        let name = role.style_name();
        let Some(style) = doc.styles.by_name(name) else {
            report.check(format!("font/{name}"), false, "样式不存在");
            continue;
        };
        let Some(fonts) = &style.fonts else {
            report.check(format!("font/{name}"), false, "rFonts=None");
            continue;
        };
        let latin = fonts.ascii.as_deref();
        let east = fonts.east_asia.as_deref();
        report.check(
            format!("font/{name}/latin"),
            latin == Some(spec.font_latin.as_str()),
            format!("actual={latin:?} expected={:?}", spec.font_latin),
        );
        report.check(
            format!("font/{name}/eastAsia"),
            east == Some(expected_east),
            format!("actual={east:?} expected={expected_east:?}"),
        );
    }
}

fn check_footnote_restart(path: &Path, report: &mut ValidationReport) -> Result<()> {
    let ok = has_footnote_restart_each_page(path)?;
    report.check("footnote/numRestart_eachPage", ok, "");
    Ok(())
}

/// Editorial heuristic, informational only: italic runs without the review
/// marker need a human decision and never fail the run by themselves.
fn check_needs_review_italic(doc: &Document, report: &mut ValidationReport) {
    let count = doc
        .paragraphs
        .iter()
        .flat_map(|p| p.runs.iter())
        .filter(|r| r.italic && !r.text.contains(NEEDS_REVIEW_MARKER))
        .count();
    if count > 0 {
        report.warn(
            "italic/needs_review",
            format!("{count} 个斜体 run 未标记 NEEDS_REVIEW，请人工核查"),
        );
    } else {
        report.pass("italic/needs_review", "无未标注斜体");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::Document;
    use crate::formatter::DocumentFormatter;
    use crate::report::CheckStatus;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("paperpress_docx_rules_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn formatted_fixture(name: &str) -> std::path::PathBuf {
        let input = temp_path(&format!("in_{name}"));
        let output = temp_path(&format!("out_{name}"));
        let mut doc = Document::new();
        doc.add_paragraph(None, "正文段落。");
        doc.save(&input).unwrap();
        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();
        output
    }

    #[test]
    fn formatted_document_passes_all_rules() {
        let path = formatted_fixture("clean.docx");
        let report = validate_document(&path, &LayoutSpec::default()).unwrap();
        assert_eq!(report.fail_count(), 0, "{:?}", report.entries);
        assert!(report.is_success(true));
    }

    #[test]
    fn margin_within_slack_passes_beyond_fails() {
        let path = formatted_fixture("margins.docx");
        let spec = LayoutSpec::default();

        let mut doc = Document::open(&path).unwrap();
        doc.sections[0].margin_top = spec.margin_top() + spec.twip_tolerance;
        let nudged = temp_path("margins_nudged.docx");
        doc.save(&nudged).unwrap();
        let report = validate_document(&nudged, &spec).unwrap();
        assert!(report
            .entries
            .iter()
            .all(|e| e.name != "margins/margin_top" || e.status == CheckStatus::Pass));

        doc.sections[0].margin_top = spec.margin_top() + spec.twip_tolerance + 1;
        let off = temp_path("margins_off.docx");
        doc.save(&off).unwrap();
        let report = validate_document(&off, &spec).unwrap();
        let entry = report
            .entries
            .iter()
            .find(|e| e.name == "margins/margin_top")
            .unwrap();
        assert_eq!(entry.status, CheckStatus::Fail);
        assert!(entry.detail.contains("actual="));
        assert!(entry.detail.contains("expected="));
    }

    #[test]
    fn unmarked_italic_warns_but_does_not_fail() {
        let path = formatted_fixture("italic.docx");
        let mut doc = Document::open(&path).unwrap();
        doc.paragraphs[0].runs[0].italic = true;
        let with_italic = temp_path("italic_unmarked.docx");
        doc.save(&with_italic).unwrap();

        let report = validate_document(&with_italic, &LayoutSpec::default()).unwrap();
        assert_eq!(report.fail_count(), 0);
        assert_eq!(report.warn_count(), 1);
        assert!(report.is_success(false));
        assert!(!report.is_success(true));
    }

    #[test]
    fn marked_italic_is_clean() {
        let input = temp_path("in_marked.docx");
        let output = temp_path("out_marked.docx");
        let mut doc = Document::new();
        let para = doc.add_paragraph(None, "ibid. NEEDS_REVIEW");
        para.runs[0].italic = true;
        doc.save(&input).unwrap();
        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let report = validate_document(&output, &LayoutSpec::default()).unwrap();
        assert_eq!(report.warn_count(), 0);
    }
}
