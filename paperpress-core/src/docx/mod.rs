// Document model collaborator
//
// A .docx is a zip container of XML parts. `package` handles the container
// (ordered parts, preserved compression); `document` is the structured
// model over the document/styles parts.

pub mod document;
pub mod package;

pub use document::{
    Alignment, Document, LineRule, NamedStyle, Paragraph, ParagraphFormat, Run, RunFonts,
    SectionProps, StyleSheet, PART_DOCUMENT, PART_FOOTNOTES, PART_SETTINGS, PART_STYLES, W_NS,
};
pub use package::{Package, PackageError, Part};
