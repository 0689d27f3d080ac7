//! Two-tier Latin/East-Asian font cascade.
//!
//! The pairing is written twice: once on each named style (the inherited
//! baseline, so even a paragraph with zero runs renders correctly) and
//! once directly on every run (run formatting takes precedence over style
//! inheritance, so stale per-run fonts from the source document must be
//! overwritten, not trusted).

use crate::docx::{Document, NamedStyle, Run, RunFonts};
use crate::layout::{LayoutSpec, Role};

/// Write the Latin + East-Asian pair onto a single run.
pub fn set_run_fonts(run: &mut Run, latin: &str, east_asia: &str) {
    run.fonts = Some(RunFonts {
        ascii: Some(latin.to_string()),
        h_ansi: Some(latin.to_string()),
        east_asia: Some(east_asia.to_string()),
    });
}

/// Write the Latin + East-Asian pair onto a named style.
pub fn set_style_fonts(style: &mut NamedStyle, latin: &str, east_asia: &str) {
    style.fonts = Some(RunFonts {
        ascii: Some(latin.to_string()),
        h_ansi: Some(latin.to_string()),
        east_asia: Some(east_asia.to_string()),
    });
}

/// Style-level pass: assign each role's typeface pair to its named style.
/// Styles the registry has not created yet are skipped.
pub fn apply_style_fonts(doc: &mut Document, spec: &LayoutSpec) {
    for role in Role::ALL {
        let east = spec.east_asian_face(role).to_string();
        if let Some(style) = doc.styles.by_name_mut(role.style_name()) {
            set_style_fonts(style, &spec.font_latin, &east);
        }
    }
}

/// Run-level pass: rewrite the pair on every run of every paragraph, keyed
/// by the paragraph's (already classified) style. Unrecognized styles get
/// the body pair.
pub fn apply_run_fonts(doc: &mut Document, spec: &LayoutSpec) {
    for para in &mut doc.paragraphs {
        let style_name = para.style.as_deref().unwrap_or(Role::Body.style_name());
        let east = spec.east_asian_face_for_style(style_name).to_string();
        for run in &mut para.runs {
            set_run_fonts(run, &spec.font_latin, &east);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::ensure_paragraph_styles;

    #[test]
    fn style_pass_pairs_latin_and_east_asian() {
        let mut doc = Document::new();
        let spec = LayoutSpec::default();
        ensure_paragraph_styles(&mut doc, &spec);
        apply_style_fonts(&mut doc, &spec);

        let quote = doc.styles.by_name("HR-QuoteBlock").unwrap();
        let fonts = quote.fonts.as_ref().unwrap();
        assert_eq!(fonts.ascii.as_deref(), Some("Times New Roman"));
        assert_eq!(fonts.h_ansi.as_deref(), Some("Times New Roman"));
        assert_eq!(fonts.east_asia.as_deref(), Some("楷体"));
    }

    #[test]
    fn run_pass_overwrites_stale_fonts() {
        let mut doc = Document::new();
        let spec = LayoutSpec::default();
        let para = doc.add_paragraph(Some("HR-Body"), "旧字体残留");
        para.runs[0].fonts = Some(RunFonts {
            ascii: Some("Calibri".to_string()),
            h_ansi: Some("Calibri".to_string()),
            east_asia: Some("微软雅黑".to_string()),
        });

        apply_run_fonts(&mut doc, &spec);
        let fonts = doc.paragraphs[0].runs[0].fonts.as_ref().unwrap();
        assert_eq!(fonts.ascii.as_deref(), Some("Times New Roman"));
        assert_eq!(fonts.east_asia.as_deref(), Some("宋体"));
    }

    #[test]
    fn unrecognized_style_gets_body_pair() {
        let mut doc = Document::new();
        let spec = LayoutSpec::default();
        doc.add_paragraph(Some("SomethingElse"), "文字");
        doc.add_paragraph(None, "无样式");

        apply_run_fonts(&mut doc, &spec);
        for para in &doc.paragraphs {
            let fonts = para.runs[0].fonts.as_ref().unwrap();
            assert_eq!(fonts.east_asia.as_deref(), Some("宋体"));
        }
    }
}
