use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use paperpress_core::audit::run_audit;
use paperpress_core::io_utils::{backup_input, resolve_input, resolve_output};
use paperpress_core::jsonfix::fix_file;
use paperpress_core::pack::pack_directory;
use paperpress_core::report::{CheckStatus, ValidationReport};
use paperpress_core::rules::{check_mapping, run_layout_rules};
use paperpress_core::{validate_document, DocumentFormatter, LayoutSpec};

#[derive(Parser)]
#[command(name = "paperpress")]
#[command(about = "Typeset .docx manuscripts to the Historical Research journal template")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a manuscript: classify paragraphs, apply the layout template,
    /// patch footnote numbering
    Format {
        /// Input .docx file path
        #[arg(short, long)]
        input: String,

        /// Output .docx file path
        #[arg(short, long)]
        output: String,

        /// Skip the .bak.docx backup of the original
        #[arg(long)]
        no_backup: bool,

        /// Path to a custom layout template (YAML)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Re-verify a typeset document against the layout template
    Validate {
        /// The .docx file to check
        docx: String,

        /// Treat WARN entries as failures
        #[arg(long)]
        strict: bool,

        /// Path to a custom layout template (YAML)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Check a rendered HTML preview against the layout template
    ValidateLayout {
        /// The HTML file to check
        html: String,
    },
    /// Check a style-mapping document for the required size mappings
    CheckMapping {
        /// The markdown mapping file
        mapping: String,
    },
    /// Audit citations for the three required fields
    Audit {
        /// Input JSON file with a citations array
        #[arg(long)]
        input: String,

        /// Audit report output path
        #[arg(long)]
        report: String,
    },
    /// Repair unescaped quotes inside JSON string values
    FixJson {
        /// Input JSON file
        input: String,

        /// Output path (defaults to fixing in place)
        output: Option<String>,
    },
    /// Pack an unpacked part directory into a .docx container
    Pack {
        /// Directory of container parts
        dir: String,

        /// Output .docx path
        output: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Format {
            input,
            output,
            no_backup,
            config,
        } => cmd_format(&input, &output, no_backup, config.as_deref()),
        Commands::Validate {
            docx,
            strict,
            config,
        } => cmd_validate(&docx, strict, config.as_deref()),
        Commands::ValidateLayout { html } => cmd_validate_layout(&html),
        Commands::CheckMapping { mapping } => cmd_check_mapping(&mapping),
        Commands::Audit { input, report } => cmd_audit(&input, &report),
        Commands::FixJson { input, output } => cmd_fix_json(&input, output.as_deref()),
        Commands::Pack { dir, output } => cmd_pack(&dir, &output),
    }
}

fn cmd_format(
    input: &str,
    output: &str,
    no_backup: bool,
    config: Option<&str>,
) -> Result<ExitCode> {
    let input_path = resolve_input(input)?;
    let output_path = resolve_output(output)?;
    let spec = LayoutSpec::load_with_fallback(config);

    if !no_backup {
        let backup = backup_input(&input_path)?;
        println!("💾 备份: {}", backup.display());
    }

    println!("📄 开始排版: {} → {}", input_path.display(), output_path.display());
    DocumentFormatter::new(spec).format_document(&input_path, &output_path)?;
    println!("✅ 排版完成: {}", output_path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(docx: &str, strict: bool, config: Option<&str>) -> Result<ExitCode> {
    let path = resolve_input(docx)?;
    let spec = LayoutSpec::load_with_fallback(config);

    println!("🔍 校验: {}\n", path.display());
    let report = validate_document(&path, &spec)?;
    print_report(&report);
    Ok(exit_for(&report, strict))
}

fn cmd_validate_layout(html: &str) -> Result<ExitCode> {
    let path = Path::new(html);
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("无法读取文件 {}: {e}", path.display()))?;

    println!("🔍 校验文件: {}", path.display());
    let report = run_layout_rules(&content);
    print_report(&report);
    Ok(exit_for(&report, false))
}

fn cmd_check_mapping(mapping: &str) -> Result<ExitCode> {
    let path = Path::new(mapping);
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("无法读取文件 {}: {e}", path.display()))?;

    let report = check_mapping(&content);
    if report.fail_count() == 0 {
        println!("✅ 映射文件包含所有必填字段");
    } else {
        println!("❌ 映射文件缺少必填字段:");
    }
    print_report(&report);
    Ok(exit_for(&report, false))
}

fn cmd_audit(input: &str, report_path: &str) -> Result<ExitCode> {
    let report = run_audit(Path::new(input), Path::new(report_path))?;
    println!(
        "📋 审计 {} 条引注: {} 违规, {} 页码待核",
        report.total_citations, report.violations_count, report.unconfirmed_pages_count
    );
    for violation in &report.violations {
        println!(
            "  ❌ 引注 #{}: {} ({})",
            violation.citation_index, violation.field, violation.details
        );
    }
    println!("💾 报告已保存至: {report_path}");
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_fix_json(input: &str, output: Option<&str>) -> Result<ExitCode> {
    let input_path = Path::new(input);
    let output_path = Path::new(output.unwrap_or(input));
    let items = fix_file(input_path, output_path)?;
    println!("✅ JSON 修复完成 ({items} 个顶层条目): {}", output_path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_pack(dir: &str, output: &str) -> Result<ExitCode> {
    pack_directory(Path::new(dir), Path::new(output))?;
    println!("✅ 打包完成: {output}");
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &ValidationReport) {
    let width = report
        .entries
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0)
        + 2;

    for entry in &report.entries {
        let marker = match entry.status {
            CheckStatus::Pass => "✅",
            CheckStatus::Fail => "❌",
            CheckStatus::Warn => "⚠️ ",
        };
        let mut line = format!("  {marker} [{}] {:<width$}", entry.status, entry.name);
        if !entry.detail.is_empty() {
            line.push_str(&format!("  {}", entry.detail));
        }
        println!("{line}");
    }

    println!();
    println!(
        "结果: {}/{} 通过  {} 失败  {} 警告",
        report.pass_count(),
        report.entries.len(),
        report.fail_count(),
        report.warn_count()
    );
}

fn exit_for(report: &ValidationReport, strict: bool) -> ExitCode {
    if report.is_success(strict) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
