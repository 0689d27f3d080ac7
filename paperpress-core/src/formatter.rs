//! The formatting pipeline: one document transformation composed of the
//! page setup, the style registry, the two-tier font cascade, the
//! paragraph classifier and the footnote container patch, in a fixed
//! order.
//!
//! The pipeline performs no validation — it is a pure "apply the
//! template" pass. The container patch runs after the save because it
//! edits the serialized package directly.

use std::path::Path;

use anyhow::{Context, Result};

use crate::classifier::ParagraphClassifier;
use crate::docx::Document;
use crate::fonts::{apply_run_fonts, apply_style_fonts};
use crate::footnotes::set_footnote_restart_each_page;
use crate::layout::LayoutSpec;
use crate::styles::{apply_base_page_setup, ensure_paragraph_styles};

pub struct DocumentFormatter {
    spec: LayoutSpec,
    classifier: ParagraphClassifier,
}

impl Default for DocumentFormatter {
    fn default() -> Self {
        Self::new(LayoutSpec::default())
    }
}

impl DocumentFormatter {
    pub fn new(spec: LayoutSpec) -> Self {
        Self {
            spec,
            classifier: ParagraphClassifier::new(),
        }
    }

    pub fn spec(&self) -> &LayoutSpec {
        &self.spec
    }

    /// Run the full transformation from `input` to `output`.
    pub fn format_document(&self, input: &Path, output: &Path) -> Result<()> {
        let mut doc = Document::open(input)
            .with_context(|| format!("cannot open document: {}", input.display()))?;
        println!("📄 Formatting {} paragraphs", doc.paragraphs.len());

        // 1. Page margins on every section.
        apply_base_page_setup(&mut doc, &self.spec);

        // 2. The eight named styles with their declared formatting.
        ensure_paragraph_styles(&mut doc, &self.spec);

        // 3. Style-level fonts — the inherited baseline.
        apply_style_fonts(&mut doc, &self.spec);

        // 4. Classify every paragraph and assign the resolved style.
        self.assign_paragraph_styles(&mut doc);

        // 5. Run-level fonts — override whatever the source document left
        //    on individual runs.
        apply_run_fonts(&mut doc, &self.spec);

        // 6. Persist; the only disk write of the primary content.
        doc.save(output)
            .with_context(|| format!("cannot save document: {}", output.display()))?;

        // 7. Footnote numbering patch on the saved package.
        set_footnote_restart_each_page(output)?;

        println!("✅ Typeset output written to {}", output.display());
        Ok(())
    }

    fn assign_paragraph_styles(&self, doc: &mut Document) {
        let assignments: Vec<Option<String>> = doc
            .paragraphs
            .iter()
            .map(|para| {
                let display_name = para
                    .style
                    .as_deref()
                    .map(|id| doc.style_display_name(id).to_string());
                let role = self
                    .classifier
                    .classify(display_name.as_deref(), &para.text());
                // An unrecognized target style is simply not applied;
                // the paragraph keeps its previous assignment.
                doc.styles
                    .by_name(role.style_name())
                    .map(|style| style.style_id.clone())
            })
            .collect();

        for (para, assignment) in doc.paragraphs.iter_mut().zip(assignments) {
            if let Some(style_id) = assignment {
                para.style = Some(style_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Role;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("paperpress_formatter_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn heading_resolves_to_title_style() {
        let input = temp_path("title_in.docx");
        let output = temp_path("title_out.docx");

        let mut doc = Document::new();
        doc.styles.get_or_insert("Heading 1");
        doc.add_paragraph(Some("Heading 1"), "第一章 绪论");
        doc.add_paragraph(None, "正文内容。");
        doc.save(&input).unwrap();

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let formatted = Document::open(&output).unwrap();
        assert_eq!(
            formatted.paragraphs[0].style.as_deref(),
            Some(Role::TitleMain.style_name())
        );
        assert_eq!(
            formatted.paragraphs[1].style.as_deref(),
            Some(Role::Body.style_name())
        );
        assert_eq!(formatted.sections[0].margin_top, 1871);
    }

    #[test]
    fn classification_never_alters_text() {
        let input = temp_path("text_in.docx");
        let output = temp_path("text_out.docx");

        let mut doc = Document::new();
        doc.add_paragraph(None, "摘要：本文研究……");
        doc.add_paragraph(None, "[1] 参见《明实录》。");
        doc.save(&input).unwrap();

        DocumentFormatter::default()
            .format_document(&input, &output)
            .unwrap();

        let formatted = Document::open(&output).unwrap();
        assert_eq!(formatted.paragraphs[0].text(), "摘要：本文研究……");
        assert_eq!(formatted.paragraphs[1].text(), "[1] 参见《明实录》。");
    }
}
