//! A minimal WordprocessingML document model.
//!
//! Scoped to exactly what the formatting pipeline and the model-based
//! validator need: paragraphs with a mutable style assignment, runs with
//! mutable fonts/size/italic/bold, named styles with get-or-create
//! semantics, and section page margins. Body content outside that contract
//! (tables, hyperlinks, drawings) is not round-tripped — inputs are
//! expected to come from a document-model writer, same as the settings
//! part precondition of the footnote patcher.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::package::{Package, PackageError};

pub const PART_DOCUMENT: &str = "word/document.xml";
pub const PART_STYLES: &str = "word/styles.xml";
pub const PART_SETTINGS: &str = "word/settings.xml";
pub const PART_FOOTNOTES: &str = "word/footnotes.xml";

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Latin + East-Asian typeface assignment (`w:rFonts`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFonts {
    pub ascii: Option<String>,
    pub h_ansi: Option<String>,
    pub east_asia: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Run {
    pub text: String,
    pub fonts: Option<RunFonts>,
    /// Font size in half-points (`w:sz`).
    pub size_half: Option<u32>,
    pub italic: bool,
    pub bold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Style identifier (`w:pStyle`), if any.
    pub style: Option<String>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineRule {
    #[default]
    Auto,
    AtLeast,
    /// Fixed line height regardless of font metrics.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Paragraph-level formatting carried by a named style. Lengths in twips.
#[derive(Debug, Clone, Default)]
pub struct ParagraphFormat {
    pub line_rule: LineRule,
    pub line: Option<i64>,
    pub space_before: i64,
    pub space_after: i64,
    pub first_line_indent: Option<i64>,
    pub left_indent: Option<i64>,
    pub right_indent: Option<i64>,
    pub alignment: Option<Alignment>,
}

#[derive(Debug, Clone)]
pub struct NamedStyle {
    pub style_type: String,
    pub style_id: String,
    pub name: String,
    pub format: ParagraphFormat,
    pub font_size_half: Option<u32>,
    pub fonts: Option<RunFonts>,
}

impl NamedStyle {
    fn new_paragraph(name: &str) -> Self {
        Self {
            style_type: "paragraph".to_string(),
            style_id: name.to_string(),
            name: name.to_string(),
            format: ParagraphFormat::default(),
            font_size_half: None,
            fonts: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub styles: Vec<NamedStyle>,
}

impl StyleSheet {
    pub fn by_id(&self, style_id: &str) -> Option<&NamedStyle> {
        self.styles.iter().find(|s| s.style_id == style_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&NamedStyle> {
        self.styles.iter().find(|s| s.name == name)
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut NamedStyle> {
        self.styles.iter_mut().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name(name).is_some()
    }

    /// Fetch-or-create a named paragraph style. Created styles use the
    /// name as their identifier.
    pub fn get_or_insert(&mut self, name: &str) -> &mut NamedStyle {
        if let Some(pos) = self.styles.iter().position(|s| s.name == name) {
            return &mut self.styles[pos];
        }
        self.styles.push(NamedStyle::new_paragraph(name));
        self.styles.last_mut().expect("style just pushed")
    }
}

/// Section page geometry (`w:sectPr`). Lengths in twips.
#[derive(Debug, Clone)]
pub struct SectionProps {
    pub margin_top: i64,
    pub margin_bottom: i64,
    pub margin_left: i64,
    pub margin_right: i64,
    pub header: i64,
    pub footer: i64,
    pub gutter: i64,
    pub page_width: i64,
    pub page_height: i64,
}

impl Default for SectionProps {
    fn default() -> Self {
        // A4 with one-inch margins.
        Self {
            margin_top: 1440,
            margin_bottom: 1440,
            margin_left: 1800,
            margin_right: 1800,
            header: 720,
            footer: 720,
            gutter: 0,
            page_width: 11906,
            page_height: 16838,
        }
    }
}

/// A structured .docx document: the container plus the parsed body,
/// sections and style sheet. `save` re-serializes the document and styles
/// parts and copies every other part through unchanged.
#[derive(Debug, Clone)]
pub struct Document {
    package: Package,
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<SectionProps>,
    pub styles: StyleSheet,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let package = Package::read(path)?;
        let (paragraphs, mut sections) = parse_document_xml(package.part_data(PART_DOCUMENT)?)?;
        if sections.is_empty() {
            sections.push(SectionProps::default());
        }
        let styles = match package.part(PART_STYLES) {
            Some(part) => parse_styles_xml(&part.data)?,
            None => StyleSheet::default(),
        };
        Ok(Self {
            package,
            paragraphs,
            sections,
            styles,
        })
    }

    /// A new single-section document with the minimal part set a .docx
    /// container requires.
    pub fn new() -> Self {
        let mut package = Package::new();
        package.add_part("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes().to_vec());
        package.add_part("_rels/.rels", ROOT_RELS_XML.as_bytes().to_vec());
        package.add_part(
            "word/_rels/document.xml.rels",
            DOCUMENT_RELS_XML.as_bytes().to_vec(),
        );
        package.add_part(PART_DOCUMENT, Vec::new());
        package.add_part(PART_STYLES, Vec::new());
        package.add_part(PART_SETTINGS, SETTINGS_XML.as_bytes().to_vec());

        let mut styles = StyleSheet::default();
        styles.get_or_insert("Normal");

        Self {
            package,
            paragraphs: Vec::new(),
            sections: vec![SectionProps::default()],
            styles,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PackageError> {
        let mut package = self.package.clone();
        package.replace_part(
            PART_DOCUMENT,
            serialize_document_xml(&self.paragraphs, &self.sections)?,
        );
        package.replace_part(PART_STYLES, serialize_styles_xml(&self.styles)?);
        package.write(path)
    }

    /// Append a paragraph with a single plain run (fixture/builder helper).
    pub fn add_paragraph(&mut self, style: Option<&str>, text: &str) -> &mut Paragraph {
        let mut para = Paragraph {
            style: style.map(str::to_string),
            runs: Vec::new(),
        };
        if !text.is_empty() {
            para.runs.push(Run {
                text: text.to_string(),
                ..Run::default()
            });
        }
        self.paragraphs.push(para);
        self.paragraphs.last_mut().expect("paragraph just pushed")
    }

    /// Display name of a paragraph's style, falling back to the raw id.
    pub fn style_display_name<'a>(&'a self, style_id: &'a str) -> &'a str {
        self.styles
            .by_id(style_id)
            .map(|s| s.name.as_str())
            .unwrap_or(style_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Parsing (quick-xml event stream → model)
// ============================================================================

fn attr_val(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            if let Ok(value) = attr.unescape_value() {
                return Some(value.into_owned());
            }
        }
    }
    None
}

fn attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    attr_val(e, key).and_then(|v| v.parse().ok())
}

/// Toggle properties (`w:i`, `w:b`): absent val means on.
fn on_off(e: &BytesStart) -> bool {
    match attr_val(e, b"w:val") {
        Some(v) => !matches!(v.as_str(), "false" | "0" | "none"),
        None => true,
    }
}

fn parse_run_fonts(e: &BytesStart) -> RunFonts {
    RunFonts {
        ascii: attr_val(e, b"w:ascii"),
        h_ansi: attr_val(e, b"w:hAnsi"),
        east_asia: attr_val(e, b"w:eastAsia"),
    }
}

fn parse_document_xml(bytes: &[u8]) -> Result<(Vec<Paragraph>, Vec<SectionProps>), PackageError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut sections = Vec::new();
    let mut para: Option<Paragraph> = None;
    let mut run: Option<Run> = None;
    let mut section: Option<SectionProps> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| PackageError::xml(PART_DOCUMENT, e))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => para = Some(Paragraph::default()),
                b"w:r" if para.is_some() => run = Some(Run::default()),
                b"w:t" if run.is_some() => in_text = true,
                b"w:sectPr" => section = Some(SectionProps::default()),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(Paragraph::default()),
                b"w:pStyle" => {
                    // Only the paragraph-level pStyle; runs carry no style refs here.
                    if let (Some(p), None) = (para.as_mut(), run.as_ref()) {
                        p.style = attr_val(&e, b"w:val");
                    }
                }
                b"w:rFonts" => {
                    if let Some(r) = run.as_mut() {
                        r.fonts = Some(parse_run_fonts(&e));
                    }
                }
                b"w:sz" => {
                    if let Some(r) = run.as_mut() {
                        r.size_half = attr_val(&e, b"w:val").and_then(|v| v.parse().ok());
                    }
                }
                b"w:i" => {
                    if let Some(r) = run.as_mut() {
                        r.italic = on_off(&e);
                    }
                }
                b"w:b" => {
                    if let Some(r) = run.as_mut() {
                        r.bold = on_off(&e);
                    }
                }
                b"w:pgMar" => {
                    if let Some(s) = section.as_mut() {
                        if let Some(v) = attr_i64(&e, b"w:top") {
                            s.margin_top = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:bottom") {
                            s.margin_bottom = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:left") {
                            s.margin_left = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:right") {
                            s.margin_right = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:header") {
                            s.header = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:footer") {
                            s.footer = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:gutter") {
                            s.gutter = v;
                        }
                    }
                }
                b"w:pgSz" => {
                    if let Some(s) = section.as_mut() {
                        if let Some(v) = attr_i64(&e, b"w:w") {
                            s.page_width = v;
                        }
                        if let Some(v) = attr_i64(&e, b"w:h") {
                            s.page_height = v;
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    if let Some(r) = run.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| PackageError::xml(PART_DOCUMENT, e))?;
                        r.text.push_str(&text);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => {
                    if let (Some(p), Some(r)) = (para.as_mut(), run.take()) {
                        p.runs.push(r);
                    }
                }
                b"w:p" => {
                    if let Some(p) = para.take() {
                        paragraphs.push(p);
                    }
                }
                b"w:sectPr" => {
                    if let Some(s) = section.take() {
                        sections.push(s);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((paragraphs, sections))
}

fn parse_styles_xml(bytes: &[u8]) -> Result<StyleSheet, PackageError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut sheet = StyleSheet::default();
    let mut style: Option<NamedStyle> = None;
    let mut in_ppr = false;
    let mut in_rpr = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| PackageError::xml(PART_STYLES, e))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:style" => {
                    let style_type =
                        attr_val(&e, b"w:type").unwrap_or_else(|| "paragraph".to_string());
                    let style_id = attr_val(&e, b"w:styleId").unwrap_or_default();
                    style = Some(NamedStyle {
                        style_type,
                        name: style_id.clone(),
                        style_id,
                        format: ParagraphFormat::default(),
                        font_size_half: None,
                        fonts: None,
                    });
                }
                b"w:pPr" if style.is_some() => in_ppr = true,
                b"w:rPr" if style.is_some() => in_rpr = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:name" => {
                    if let (Some(s), Some(v)) = (style.as_mut(), attr_val(&e, b"w:val")) {
                        s.name = v;
                    }
                }
                b"w:spacing" if in_ppr => {
                    if let Some(s) = style.as_mut() {
                        s.format.line = attr_i64(&e, b"w:line");
                        s.format.line_rule = match attr_val(&e, b"w:lineRule").as_deref() {
                            Some("exact") => LineRule::Exact,
                            Some("atLeast") => LineRule::AtLeast,
                            _ => LineRule::Auto,
                        };
                        s.format.space_before = attr_i64(&e, b"w:before").unwrap_or(0);
                        s.format.space_after = attr_i64(&e, b"w:after").unwrap_or(0);
                    }
                }
                b"w:ind" if in_ppr => {
                    if let Some(s) = style.as_mut() {
                        s.format.first_line_indent = attr_i64(&e, b"w:firstLine");
                        s.format.left_indent = attr_i64(&e, b"w:left");
                        s.format.right_indent = attr_i64(&e, b"w:right");
                    }
                }
                b"w:jc" if in_ppr => {
                    if let Some(s) = style.as_mut() {
                        s.format.alignment = match attr_val(&e, b"w:val").as_deref() {
                            Some("left") => Some(Alignment::Left),
                            Some("center") => Some(Alignment::Center),
                            Some("right") => Some(Alignment::Right),
                            Some("both") => Some(Alignment::Justify),
                            _ => None,
                        };
                    }
                }
                b"w:rFonts" if in_rpr => {
                    if let Some(s) = style.as_mut() {
                        s.fonts = Some(parse_run_fonts(&e));
                    }
                }
                b"w:sz" if in_rpr => {
                    if let Some(s) = style.as_mut() {
                        s.font_size_half = attr_val(&e, b"w:val").and_then(|v| v.parse().ok());
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:pPr" => in_ppr = false,
                b"w:rPr" => in_rpr = false,
                b"w:style" => {
                    if let Some(s) = style.take() {
                        sheet.styles.push(s);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

// ============================================================================
// Serialization (model → quick-xml event stream)
// ============================================================================

type XmlWriter = Writer<Vec<u8>>;

fn wev(writer: &mut XmlWriter, part: &str, event: Event) -> Result<(), PackageError> {
    writer
        .write_event(event)
        .map_err(|e| PackageError::xml(part, e))
}

fn write_run_props(
    writer: &mut XmlWriter,
    part: &str,
    fonts: &Option<RunFonts>,
    size_half: Option<u32>,
    italic: bool,
    bold: bool,
) -> Result<(), PackageError> {
    if fonts.is_none() && size_half.is_none() && !italic && !bold {
        return Ok(());
    }
    wev(writer, part, Event::Start(BytesStart::new("w:rPr")))?;
    if let Some(f) = fonts {
        let mut el = BytesStart::new("w:rFonts");
        if let Some(v) = &f.ascii {
            el.push_attribute(("w:ascii", v.as_str()));
        }
        if let Some(v) = &f.h_ansi {
            el.push_attribute(("w:hAnsi", v.as_str()));
        }
        if let Some(v) = &f.east_asia {
            el.push_attribute(("w:eastAsia", v.as_str()));
        }
        wev(writer, part, Event::Empty(el))?;
    }
    if bold {
        wev(writer, part, Event::Empty(BytesStart::new("w:b")))?;
    }
    if italic {
        wev(writer, part, Event::Empty(BytesStart::new("w:i")))?;
    }
    if let Some(sz) = size_half {
        let mut el = BytesStart::new("w:sz");
        el.push_attribute(("w:val", sz.to_string().as_str()));
        wev(writer, part, Event::Empty(el))?;
        let mut el = BytesStart::new("w:szCs");
        el.push_attribute(("w:val", sz.to_string().as_str()));
        wev(writer, part, Event::Empty(el))?;
    }
    wev(writer, part, Event::End(BytesEnd::new("w:rPr")))
}

fn write_paragraph_format(
    writer: &mut XmlWriter,
    part: &str,
    fmt: &ParagraphFormat,
) -> Result<(), PackageError> {
    let has_spacing = fmt.line.is_some() || fmt.space_before != 0 || fmt.space_after != 0;
    let has_indent = fmt.first_line_indent.is_some()
        || fmt.left_indent.is_some()
        || fmt.right_indent.is_some();
    if !has_spacing && !has_indent && fmt.alignment.is_none() {
        return Ok(());
    }

    wev(writer, part, Event::Start(BytesStart::new("w:pPr")))?;
    if has_spacing {
        let mut el = BytesStart::new("w:spacing");
        el.push_attribute(("w:before", fmt.space_before.to_string().as_str()));
        el.push_attribute(("w:after", fmt.space_after.to_string().as_str()));
        if let Some(line) = fmt.line {
            el.push_attribute(("w:line", line.to_string().as_str()));
            let rule = match fmt.line_rule {
                LineRule::Exact => "exact",
                LineRule::AtLeast => "atLeast",
                LineRule::Auto => "auto",
            };
            el.push_attribute(("w:lineRule", rule));
        }
        wev(writer, part, Event::Empty(el))?;
    }
    if has_indent {
        let mut el = BytesStart::new("w:ind");
        if let Some(v) = fmt.left_indent {
            el.push_attribute(("w:left", v.to_string().as_str()));
        }
        if let Some(v) = fmt.right_indent {
            el.push_attribute(("w:right", v.to_string().as_str()));
        }
        if let Some(v) = fmt.first_line_indent {
            el.push_attribute(("w:firstLine", v.to_string().as_str()));
        }
        wev(writer, part, Event::Empty(el))?;
    }
    if let Some(align) = fmt.alignment {
        let mut el = BytesStart::new("w:jc");
        let val = match align {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        };
        el.push_attribute(("w:val", val));
        wev(writer, part, Event::Empty(el))?;
    }
    wev(writer, part, Event::End(BytesEnd::new("w:pPr")))
}

fn serialize_document_xml(
    paragraphs: &[Paragraph],
    sections: &[SectionProps],
) -> Result<Vec<u8>, PackageError> {
    let part = PART_DOCUMENT;
    let mut writer = Writer::new(Vec::new());
    wev(
        &mut writer,
        part,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", W_NS));
    wev(&mut writer, part, Event::Start(root))?;
    wev(&mut writer, part, Event::Start(BytesStart::new("w:body")))?;

    for para in paragraphs {
        wev(&mut writer, part, Event::Start(BytesStart::new("w:p")))?;
        if let Some(style) = &para.style {
            wev(&mut writer, part, Event::Start(BytesStart::new("w:pPr")))?;
            let mut el = BytesStart::new("w:pStyle");
            el.push_attribute(("w:val", style.as_str()));
            wev(&mut writer, part, Event::Empty(el))?;
            wev(&mut writer, part, Event::End(BytesEnd::new("w:pPr")))?;
        }
        for run in &para.runs {
            wev(&mut writer, part, Event::Start(BytesStart::new("w:r")))?;
            write_run_props(
                &mut writer,
                part,
                &run.fonts,
                run.size_half,
                run.italic,
                run.bold,
            )?;
            let mut t = BytesStart::new("w:t");
            t.push_attribute(("xml:space", "preserve"));
            wev(&mut writer, part, Event::Start(t))?;
            wev(&mut writer, part, Event::Text(BytesText::new(&run.text)))?;
            wev(&mut writer, part, Event::End(BytesEnd::new("w:t")))?;
            wev(&mut writer, part, Event::End(BytesEnd::new("w:r")))?;
        }
        wev(&mut writer, part, Event::End(BytesEnd::new("w:p")))?;
    }

    // The body-level section; the model keeps one set of page geometry.
    let section = sections.first().cloned().unwrap_or_default();
    wev(&mut writer, part, Event::Start(BytesStart::new("w:sectPr")))?;
    let mut el = BytesStart::new("w:pgSz");
    el.push_attribute(("w:w", section.page_width.to_string().as_str()));
    el.push_attribute(("w:h", section.page_height.to_string().as_str()));
    wev(&mut writer, part, Event::Empty(el))?;
    let mut el = BytesStart::new("w:pgMar");
    el.push_attribute(("w:top", section.margin_top.to_string().as_str()));
    el.push_attribute(("w:right", section.margin_right.to_string().as_str()));
    el.push_attribute(("w:bottom", section.margin_bottom.to_string().as_str()));
    el.push_attribute(("w:left", section.margin_left.to_string().as_str()));
    el.push_attribute(("w:header", section.header.to_string().as_str()));
    el.push_attribute(("w:footer", section.footer.to_string().as_str()));
    el.push_attribute(("w:gutter", section.gutter.to_string().as_str()));
    wev(&mut writer, part, Event::Empty(el))?;
    wev(&mut writer, part, Event::End(BytesEnd::new("w:sectPr")))?;

    wev(&mut writer, part, Event::End(BytesEnd::new("w:body")))?;
    wev(&mut writer, part, Event::End(BytesEnd::new("w:document")))?;

    Ok(writer.into_inner())
}

fn serialize_styles_xml(sheet: &StyleSheet) -> Result<Vec<u8>, PackageError> {
    let part = PART_STYLES;
    let mut writer = Writer::new(Vec::new());
    wev(
        &mut writer,
        part,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut root = BytesStart::new("w:styles");
    root.push_attribute(("xmlns:w", W_NS));
    wev(&mut writer, part, Event::Start(root))?;

    for style in &sheet.styles {
        let mut el = BytesStart::new("w:style");
        el.push_attribute(("w:type", style.style_type.as_str()));
        el.push_attribute(("w:styleId", style.style_id.as_str()));
        wev(&mut writer, part, Event::Start(el))?;

        let mut name = BytesStart::new("w:name");
        name.push_attribute(("w:val", style.name.as_str()));
        wev(&mut writer, part, Event::Empty(name))?;

        write_paragraph_format(&mut writer, part, &style.format)?;
        write_run_props(
            &mut writer,
            part,
            &style.fonts,
            style.font_size_half,
            false,
            false,
        )?;

        wev(&mut writer, part, Event::End(BytesEnd::new("w:style")))?;
    }

    wev(&mut writer, part, Event::End(BytesEnd::new("w:styles")))?;
    Ok(writer.into_inner())
}

// ============================================================================
// Fixed parts for documents built from scratch
// ============================================================================

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/></Relationships>"#;

const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom w:percent="100"/></w:settings>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("paperpress_docx_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn document_round_trip() {
        let mut doc = Document::new();
        doc.add_paragraph(Some("Heading 1"), "第一章 绪论");
        doc.add_paragraph(None, "正文段落。");
        doc.sections[0].margin_top = 1871;

        let path = temp_path("roundtrip.docx");
        doc.save(&path).unwrap();

        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.paragraphs.len(), 2);
        assert_eq!(reopened.paragraphs[0].style.as_deref(), Some("Heading 1"));
        assert_eq!(reopened.paragraphs[0].text(), "第一章 绪论");
        assert_eq!(reopened.sections[0].margin_top, 1871);
        assert!(reopened.styles.contains("Normal"));
    }

    #[test]
    fn run_formatting_round_trip() {
        let mut doc = Document::new();
        let para = doc.add_paragraph(None, "ibid.");
        para.runs[0].italic = true;
        para.runs[0].size_half = Some(21);
        para.runs[0].fonts = Some(RunFonts {
            ascii: Some("Times New Roman".to_string()),
            h_ansi: Some("Times New Roman".to_string()),
            east_asia: Some("楷体".to_string()),
        });

        let path = temp_path("run_fmt.docx");
        doc.save(&path).unwrap();

        let reopened = Document::open(&path).unwrap();
        let run = &reopened.paragraphs[0].runs[0];
        assert!(run.italic);
        assert_eq!(run.size_half, Some(21));
        assert_eq!(
            run.fonts.as_ref().unwrap().east_asia.as_deref(),
            Some("楷体")
        );
    }

    #[test]
    fn style_format_round_trip() {
        let mut doc = Document::new();
        {
            let style = doc.styles.get_or_insert("HR-Body");
            style.format.line = Some(358);
            style.format.line_rule = LineRule::Exact;
            style.format.first_line_indent = Some(480);
            style.font_size_half = Some(24);
        }
        {
            let style = doc.styles.get_or_insert("HR-TitleMain");
            style.format.alignment = Some(Alignment::Center);
            style.format.space_before = 120;
            style.format.space_after = 120;
        }

        let path = temp_path("style_fmt.docx");
        doc.save(&path).unwrap();

        let reopened = Document::open(&path).unwrap();
        let body = reopened.styles.by_name("HR-Body").unwrap();
        assert_eq!(body.format.line, Some(358));
        assert_eq!(body.format.line_rule, LineRule::Exact);
        assert_eq!(body.format.first_line_indent, Some(480));
        assert_eq!(body.font_size_half, Some(24));

        let title = reopened.styles.by_name("HR-TitleMain").unwrap();
        assert_eq!(title.format.alignment, Some(Alignment::Center));
        assert_eq!(title.format.space_before, 120);
    }

    #[test]
    fn get_or_insert_is_idempotent() {
        let mut sheet = StyleSheet::default();
        sheet.get_or_insert("HR-Body").font_size_half = Some(24);
        sheet.get_or_insert("HR-Body");
        assert_eq!(sheet.styles.len(), 1);
        assert_eq!(sheet.by_name("HR-Body").unwrap().font_size_half, Some(24));
    }
}
