// Rule-based validators
//
// Two independent implementations re-derive template compliance from the
// same numeric source of truth: `docx_rules` checks the live document
// model, `layout_rules` checks a rendered HTML/markup preview.

pub mod docx_rules;
pub mod layout_rules;

pub use docx_rules::validate_document;
pub use layout_rules::{check_mapping, run_layout_rules, LayoutRule, LAYOUT_RULES};
