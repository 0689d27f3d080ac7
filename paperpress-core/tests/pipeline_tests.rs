//! Pipeline boundary tests — format a manuscript, then re-verify it the
//! way a reviewer would.
//!
//! Fixtures are built through the document model itself (no binary
//! fixtures checked in): each test constructs a small manuscript, runs the
//! formatting pipeline on disk, and asserts properties at the output
//! boundary — the resolved styles, the page geometry, the container patch
//! and the validator verdicts.

use std::path::PathBuf;

use paperpress_core::docx::{Document, Package, PART_SETTINGS};
use paperpress_core::footnotes::{has_footnote_restart_each_page, set_footnote_restart_each_page};
use paperpress_core::layout::Role;
use paperpress_core::report::CheckStatus;
use paperpress_core::rules::run_layout_rules;
use paperpress_core::{validate_document, DocumentFormatter, LayoutSpec, ValidationReport};

// ============================================================================
// Fixture helpers
// ============================================================================

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("paperpress_pipeline_tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

/// A small but representative manuscript: generic heading styles from a
/// source format plus unstyled prose of every pattern family.
fn build_manuscript(path: &PathBuf) {
    let mut doc = Document::new();
    doc.styles.get_or_insert("Heading 1");
    doc.styles.get_or_insert("Heading 3");
    doc.add_paragraph(Some("Heading 1"), "第一章 绪论");
    doc.add_paragraph(None, "摘要：本文考察明代白银货币化的进程。");
    doc.add_paragraph(None, "（一）研究缘起");
    doc.add_paragraph(None, "明代中叶以降，白银在赋役折纳中的地位日益上升。");
    doc.add_paragraph(None, "[1] 参见《明实录》卷三。");
    doc.add_paragraph(Some("Heading 3"), "史料概述");
    doc.save(path).unwrap();
}

fn statuses(report: &ValidationReport) -> Vec<(String, CheckStatus)> {
    report
        .entries
        .iter()
        .map(|e| (e.name.clone(), e.status))
        .collect()
}

// ============================================================================
// Boundary 1: formatted document structure
// ============================================================================

mod formatting_boundary {
    use super::*;

    #[test]
    fn heading_one_resolves_to_title_role() {
        let input = temp_path("fmt_in.docx");
        let output = temp_path("fmt_out.docx");
        build_manuscript(&input);

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let doc = Document::open(&output).unwrap();
        let spec = LayoutSpec::default();

        assert_eq!(
            doc.paragraphs[0].style.as_deref(),
            Some(Role::TitleMain.style_name())
        );
        assert_eq!(
            doc.paragraphs[1].style.as_deref(),
            Some(Role::AbstractLabel.style_name())
        );
        assert_eq!(
            doc.paragraphs[2].style.as_deref(),
            Some(Role::SectionL2.style_name())
        );
        assert_eq!(
            doc.paragraphs[3].style.as_deref(),
            Some(Role::Body.style_name())
        );
        assert_eq!(
            doc.paragraphs[4].style.as_deref(),
            Some(Role::Footnote.style_name())
        );
        assert_eq!(
            doc.paragraphs[5].style.as_deref(),
            Some(Role::SectionL2.style_name())
        );

        // The four configured centimeter margins, in twips.
        assert_eq!(doc.sections[0].margin_top, spec.margin_top());
        assert_eq!(doc.sections[0].margin_bottom, spec.margin_bottom());
        assert_eq!(doc.sections[0].margin_left, spec.margin_left());
        assert_eq!(doc.sections[0].margin_right, spec.margin_right());
    }

    #[test]
    fn every_run_carries_the_typeface_pair() {
        let input = temp_path("fonts_in.docx");
        let output = temp_path("fonts_out.docx");
        build_manuscript(&input);

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let doc = Document::open(&output).unwrap();
        for para in &doc.paragraphs {
            for run in &para.runs {
                let fonts = run.fonts.as_ref().expect("run fonts assigned");
                assert_eq!(fonts.ascii.as_deref(), Some("Times New Roman"));
                assert!(fonts.east_asia.is_some());
            }
        }
        // The footnote paragraph inherits the 楷体 pairing.
        let footnote_fonts = doc.paragraphs[4].runs[0].fonts.as_ref().unwrap();
        assert_eq!(footnote_fonts.east_asia.as_deref(), Some("楷体"));
    }

    #[test]
    fn text_content_is_never_altered() {
        let input = temp_path("text_in.docx");
        let output = temp_path("text_out.docx");
        build_manuscript(&input);

        let before: Vec<String> = Document::open(&input)
            .unwrap()
            .paragraphs
            .iter()
            .map(|p| p.text())
            .collect();

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let after: Vec<String> = Document::open(&output)
            .unwrap()
            .paragraphs
            .iter()
            .map(|p| p.text())
            .collect();
        assert_eq!(before, after);
    }
}

// ============================================================================
// Boundary 2: model-based validation
// ============================================================================

mod validation_boundary {
    use super::*;

    #[test]
    fn formatted_manuscript_passes_margin_and_style_rules() {
        let input = temp_path("val_in.docx");
        let output = temp_path("val_out.docx");
        build_manuscript(&input);

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let report = validate_document(&output, &LayoutSpec::default()).unwrap();
        for entry in &report.entries {
            if entry.name.starts_with("margins/") || entry.name.starts_with("style_exists/") {
                assert_eq!(
                    entry.status,
                    CheckStatus::Pass,
                    "{}: {}",
                    entry.name,
                    entry.detail
                );
            }
        }
        assert_eq!(report.fail_count(), 0, "{:?}", report.entries);
    }

    #[test]
    fn formatting_twice_validates_identically() {
        let input = temp_path("idem_in.docx");
        let once = temp_path("idem_once.docx");
        let twice = temp_path("idem_twice.docx");
        build_manuscript(&input);

        let formatter = DocumentFormatter::default();
        formatter.format_document(&input, &once).unwrap();
        formatter.format_document(&once, &twice).unwrap();

        let spec = LayoutSpec::default();
        let first = validate_document(&once, &spec).unwrap();
        let second = validate_document(&twice, &spec).unwrap();
        assert_eq!(statuses(&first), statuses(&second));
        assert_eq!(second.fail_count(), 0);
    }

    #[test]
    fn unvalidated_source_document_fails() {
        let input = temp_path("raw.docx");
        build_manuscript(&input);

        let report = validate_document(&input, &LayoutSpec::default()).unwrap();
        assert!(report.fail_count() > 0);
        assert!(!report.is_success(false));
    }

    #[test]
    fn strict_policy_flips_warn_only_reports() {
        let input = temp_path("strict_in.docx");
        let output = temp_path("strict_out.docx");

        let mut doc = Document::new();
        let para = doc.add_paragraph(None, "the Mary Rose");
        para.runs[0].italic = true;
        doc.save(&input).unwrap();

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let report = validate_document(&output, &LayoutSpec::default()).unwrap();
        assert_eq!(report.fail_count(), 0);
        assert_eq!(report.warn_count(), 1);
        assert!(report.is_success(false));
        assert!(!report.is_success(true));
    }
}

// ============================================================================
// Boundary 3: container patch round trip
// ============================================================================

mod container_patch {
    use super::*;

    #[test]
    fn patch_sets_flag_and_leaves_other_parts_byte_identical() {
        let path = temp_path("patch.docx");
        build_manuscript(&path);

        let before = Package::read(&path).unwrap();
        assert!(!has_footnote_restart_each_page(&path).unwrap());

        set_footnote_restart_each_page(&path).unwrap();
        assert!(has_footnote_restart_each_page(&path).unwrap());

        let after = Package::read(&path).unwrap();
        let before_names: Vec<&str> = before.part_names().collect();
        let after_names: Vec<&str> = after.part_names().collect();
        assert_eq!(before_names, after_names, "part order must be preserved");

        for name in before_names {
            if name == PART_SETTINGS {
                continue;
            }
            assert_eq!(
                before.part_data(name).unwrap(),
                after.part_data(name).unwrap(),
                "part {name} changed during the settings patch"
            );
        }
    }

    #[test]
    fn pipeline_output_carries_the_patch() {
        let input = temp_path("patch_pipe_in.docx");
        let output = temp_path("patch_pipe_out.docx");
        build_manuscript(&input);

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();
        assert!(has_footnote_restart_each_page(&output).unwrap());
    }
}

// ============================================================================
// Boundary 4: markup validation
// ============================================================================

mod markup_boundary {
    use super::*;

    const PREVIEW_HTML: &str = r#"<html><head><style>
@font-face { font-family: "Latin"; src: local("Times New Roman"); }
@page { margin-top: 3.3cm; margin-bottom: 2.7cm; margin-left: 2.4cm; margin-right: 2.3cm; }
body { font-family: "Latin", SimSun, serif; font-size: 12pt; line-height: 17.9pt; max-width: 16cm; }
h1 { font-size: 26pt; } h2 { font-size: 16pt; }
.footnote { font-size: 10.5pt; line-height: 14.5pt; }
.abstract { font-size: 12pt; }
</style></head><body><h1>标题</h1></body></html>"#;

    #[test]
    fn compliant_preview_passes() {
        let report = run_layout_rules(PREVIEW_HTML);
        assert_eq!(report.fail_count(), 0, "{:?}", report.entries);
        assert!(report.is_success(true));
    }

    #[test]
    fn missing_margin_declaration_fails_with_chinese_detail() {
        let html = PREVIEW_HTML.replace("margin-top: 3.3cm;", "");
        let report = run_layout_rules(&html);
        let entry = report
            .entries
            .iter()
            .find(|e| e.name == "page_margin_top")
            .unwrap();
        assert_eq!(entry.status, CheckStatus::Fail);
        assert_eq!(entry.detail, "未找到 margin-top: 3.3cm");
        assert!(!report.is_success(false));
    }
}
