//! The numeric layout template for the Historical Research journal format.
//!
//! `LayoutSpec` is the single source of truth for every measurement the
//! formatter writes and the validators re-check: page margins, type sizes,
//! exact leading, indents, and the Latin/East-Asian typeface pairing per
//! semantic role. Fields are semantic units (cm, pt, character widths);
//! the accessors convert to the OOXML units the document parts store —
//! twips for lengths (1 pt = 20 twips, 1 cm = 567 twips) and half-points
//! for font sizes.

use serde::{Deserialize, Serialize};

/// Twips per point (OOXML length unit for spacing, indents and margins).
pub const TWIPS_PER_PT: f64 = 20.0;

/// Twips per centimeter (1 inch = 1440 twips, 1 cm = 1440 / 2.54).
pub const TWIPS_PER_CM: f64 = 567.0;

pub fn pt_to_twips(pt: f64) -> i64 {
    (pt * TWIPS_PER_PT).round() as i64
}

pub fn cm_to_twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

/// Font sizes are stored as half-points (`w:sz w:val`).
pub fn pt_to_half(pt: f64) -> u32 {
    (pt * 2.0).round() as u32
}

/// The eight semantic paragraph roles the classifier can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Body,
    Quote,
    Footnote,
    TitleMain,
    Subtitle,
    AbstractLabel,
    AbstractText,
    SectionL2,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Body,
        Role::Quote,
        Role::Footnote,
        Role::TitleMain,
        Role::Subtitle,
        Role::AbstractLabel,
        Role::AbstractText,
        Role::SectionL2,
    ];

    /// Stable external style identifier for this role.
    ///
    /// These strings are shared verbatim between the formatter and both
    /// validators and must never be renamed across runs.
    pub fn style_name(self) -> &'static str {
        match self {
            Role::Body => "HR-Body",
            Role::Quote => "HR-QuoteBlock",
            Role::Footnote => "HR-FootnoteText",
            Role::TitleMain => "HR-TitleMain",
            Role::Subtitle => "HR-Subtitle",
            Role::AbstractLabel => "HR-AbstractLabel",
            Role::AbstractText => "HR-AbstractText",
            Role::SectionL2 => "HR-SectionL2",
        }
    }

    /// Reverse lookup: is this style identifier one of the eight targets?
    pub fn from_style_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.style_name() == name)
    }
}

/// Immutable numeric template. Construct once (usually via `Default` or a
/// YAML config file) and pass by reference; all derived accessors are pure
/// functions of the stored fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSpec {
    pub margin_top_cm: f64,
    pub margin_bottom_cm: f64,
    pub margin_left_cm: f64,
    pub margin_right_cm: f64,

    pub body_pt: f64,
    pub body_line_pt: f64,
    /// First-line indent of body paragraphs, in body-character widths.
    pub body_first_indent_chars: f64,

    pub quote_indent_chars: f64,

    pub footnote_pt: f64,
    pub footnote_line_pt: f64,
    pub footnote_indent_chars: f64,

    pub title_main_pt: f64,
    pub subtitle_pt: f64,
    pub section_l2_pt: f64,
    pub abstract_label_pt: f64,
    pub abstract_text_pt: f64,
    pub abstract_indent_chars: f64,

    pub font_latin: String,
    pub font_body_east: String,
    pub font_quote_east: String,
    pub font_footnote_east: String,
    pub font_title_east: String,
    pub font_subtitle_east: String,
    pub font_abstract_label_east: String,
    pub font_abstract_text_east: String,
    pub font_section_l2_east: String,

    /// Margin comparison slack in twips. cm→twip rounding loses under one
    /// twip, but writers that round through EMU or inches land a few twips
    /// away (≈0.018 cm at 10 twips — invisible on paper).
    pub twip_tolerance: i64,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            margin_top_cm: 3.3,
            margin_bottom_cm: 2.7,
            margin_left_cm: 2.4,
            margin_right_cm: 2.3,

            body_pt: 12.0,
            body_line_pt: 17.9,
            body_first_indent_chars: 2.0,

            quote_indent_chars: 2.0,

            footnote_pt: 10.5,
            footnote_line_pt: 14.5,
            footnote_indent_chars: 1.0,

            title_main_pt: 26.0,
            subtitle_pt: 18.0,
            section_l2_pt: 16.0,
            abstract_label_pt: 12.0,
            abstract_text_pt: 12.0,
            abstract_indent_chars: 1.0,

            font_latin: "Times New Roman".to_string(),
            font_body_east: "宋体".to_string(),
            font_quote_east: "楷体".to_string(),
            font_footnote_east: "楷体".to_string(),
            font_title_east: "宋体".to_string(),
            font_subtitle_east: "仿宋".to_string(),
            font_abstract_label_east: "黑体".to_string(),
            font_abstract_text_east: "仿宋".to_string(),
            font_section_l2_east: "宋体".to_string(),

            twip_tolerance: 10,
        }
    }
}

impl LayoutSpec {
    /// Load a template from a YAML file (functional approach).
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let spec: LayoutSpec = serde_yaml::from_str(&content)?;
        Ok(spec)
    }

    /// Load a template with fallback to the built-in default.
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load layout template from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn margin_top(&self) -> i64 {
        cm_to_twips(self.margin_top_cm)
    }

    pub fn margin_bottom(&self) -> i64 {
        cm_to_twips(self.margin_bottom_cm)
    }

    pub fn margin_left(&self) -> i64 {
        cm_to_twips(self.margin_left_cm)
    }

    pub fn margin_right(&self) -> i64 {
        cm_to_twips(self.margin_right_cm)
    }

    pub fn body_size_half(&self) -> u32 {
        pt_to_half(self.body_pt)
    }

    pub fn body_line(&self) -> i64 {
        pt_to_twips(self.body_line_pt)
    }

    pub fn footnote_size_half(&self) -> u32 {
        pt_to_half(self.footnote_pt)
    }

    pub fn footnote_line(&self) -> i64 {
        pt_to_twips(self.footnote_line_pt)
    }

    /// One "character width" equals the body point size, approximating one
    /// East-Asian character of body text.
    pub fn first_indent(&self) -> i64 {
        pt_to_twips(self.body_pt * self.body_first_indent_chars)
    }

    pub fn quote_indent(&self) -> i64 {
        pt_to_twips(self.body_pt * self.quote_indent_chars)
    }

    pub fn footnote_indent(&self) -> i64 {
        pt_to_twips(self.body_pt * self.footnote_indent_chars)
    }

    pub fn abstract_indent(&self) -> i64 {
        pt_to_twips(self.body_pt * self.abstract_indent_chars)
    }

    /// The East-Asian typeface paired with `font_latin` for a given role.
    pub fn east_asian_face(&self, role: Role) -> &str {
        match role {
            Role::Body => &self.font_body_east,
            Role::Quote => &self.font_quote_east,
            Role::Footnote => &self.font_footnote_east,
            Role::TitleMain => &self.font_title_east,
            Role::Subtitle => &self.font_subtitle_east,
            Role::AbstractLabel => &self.font_abstract_label_east,
            Role::AbstractText => &self.font_abstract_text_east,
            Role::SectionL2 => &self.font_section_l2_east,
        }
    }

    /// East-Asian typeface for a style identifier; unrecognized identifiers
    /// fall back to the body face.
    pub fn east_asian_face_for_style(&self, style_name: &str) -> &str {
        match Role::from_style_name(style_name) {
            Some(role) => self.east_asian_face(role),
            None => &self.font_body_east,
        }
    }
}
