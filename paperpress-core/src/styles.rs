//! Style registry: makes the eight named paragraph styles exist on a
//! document and carries the declared paragraph formatting onto each.
//!
//! Re-running on an already conformant document is a no-op — every write
//! sets the same values the template declares.

use crate::docx::{Alignment, Document, LineRule, NamedStyle};
use crate::layout::{pt_to_half, pt_to_twips, LayoutSpec, Role};

/// Optional parts of a style's paragraph formatting, in points.
#[derive(Debug, Clone, Copy, Default)]
struct FmtOpts {
    first_indent_pt: f64,
    left_indent_pt: f64,
    right_indent_pt: f64,
    space_before_pt: f64,
    space_after_pt: f64,
    alignment: Option<Alignment>,
}

fn set_para_fmt(style: &mut NamedStyle, size_pt: f64, line_pt: f64, opts: FmtOpts) {
    let fmt = &mut style.format;
    fmt.line_rule = LineRule::Exact;
    fmt.line = Some(pt_to_twips(line_pt));
    fmt.space_before = pt_to_twips(opts.space_before_pt);
    fmt.space_after = pt_to_twips(opts.space_after_pt);
    fmt.first_line_indent = (opts.first_indent_pt != 0.0).then(|| pt_to_twips(opts.first_indent_pt));
    fmt.left_indent = (opts.left_indent_pt != 0.0).then(|| pt_to_twips(opts.left_indent_pt));
    fmt.right_indent = (opts.right_indent_pt != 0.0).then(|| pt_to_twips(opts.right_indent_pt));
    if opts.alignment.is_some() {
        fmt.alignment = opts.alignment;
    }
    style.font_size_half = Some(pt_to_half(size_pt));
}

/// Fetch-or-create each of the eight named styles and set its declared
/// formatting: exact leading, spacing, indents and font size.
pub fn ensure_paragraph_styles(doc: &mut Document, spec: &LayoutSpec) {
    let char_pt = spec.body_pt;
    let indent2 = char_pt * spec.body_first_indent_chars;
    let indent1 = char_pt * spec.abstract_indent_chars;
    let footnote_indent = char_pt * spec.footnote_indent_chars;

    set_para_fmt(
        doc.styles.get_or_insert(Role::Body.style_name()),
        spec.body_pt,
        spec.body_line_pt,
        FmtOpts {
            first_indent_pt: indent2,
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::Quote.style_name()),
        spec.body_pt,
        spec.body_line_pt,
        FmtOpts {
            left_indent_pt: indent2,
            right_indent_pt: indent2,
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::Footnote.style_name()),
        spec.footnote_pt,
        spec.footnote_line_pt,
        FmtOpts {
            left_indent_pt: footnote_indent,
            right_indent_pt: footnote_indent,
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::TitleMain.style_name()),
        spec.title_main_pt,
        spec.title_main_pt * 1.5,
        FmtOpts {
            space_before_pt: 6.0,
            space_after_pt: 6.0,
            alignment: Some(Alignment::Center),
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::Subtitle.style_name()),
        spec.subtitle_pt,
        spec.subtitle_pt * 1.5,
        FmtOpts {
            space_before_pt: 3.0,
            space_after_pt: 3.0,
            alignment: Some(Alignment::Center),
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::SectionL2.style_name()),
        spec.section_l2_pt,
        spec.section_l2_pt * 1.5,
        FmtOpts {
            space_before_pt: 6.0,
            space_after_pt: 3.0,
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::AbstractLabel.style_name()),
        spec.abstract_label_pt,
        spec.body_line_pt,
        FmtOpts {
            left_indent_pt: indent1,
            ..FmtOpts::default()
        },
    );

    set_para_fmt(
        doc.styles.get_or_insert(Role::AbstractText.style_name()),
        spec.abstract_text_pt,
        spec.body_line_pt,
        FmtOpts {
            left_indent_pt: indent1,
            right_indent_pt: indent1,
            ..FmtOpts::default()
        },
    );
}

/// Set the four page margins on every section, overwriting prior values.
pub fn apply_base_page_setup(doc: &mut Document, spec: &LayoutSpec) {
    for section in &mut doc.sections {
        section.margin_top = spec.margin_top();
        section.margin_bottom = spec.margin_bottom();
        section.margin_left = spec.margin_left();
        section.margin_right = spec.margin_right();
    }
}
