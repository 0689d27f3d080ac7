//! Input/output path handling and the pre-mutation backup.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Resolve and precondition-check an input document path: it must exist
/// and carry the .docx extension.
pub fn resolve_input(path: &str) -> Result<PathBuf> {
    let p = PathBuf::from(path);
    if !p.exists() {
        bail!("输入文件不存在: {path}");
    }
    let is_docx = p
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);
    if !is_docx {
        bail!("输入文件必须是 .docx 格式: {path}");
    }
    Ok(p)
}

/// Resolve an output path, creating parent directories as needed.
pub fn resolve_output(path: &str) -> Result<PathBuf> {
    let p = PathBuf::from(path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(p)
}

/// Byte-identical copy of the original to a `.bak.docx` sibling, written
/// before any mutation.
pub fn backup_input(input: &Path) -> Result<PathBuf> {
    let backup = input.with_extension("bak.docx");
    std::fs::copy(input, &backup)?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join("paperpress_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(resolve_input("/no/such/file.docx").is_err());
    }

    #[test]
    fn wrong_extension_is_rejected() {
        let path = temp_dir().join("paper.txt");
        std::fs::write(&path, b"not a docx").unwrap();
        assert!(resolve_input(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn backup_is_byte_identical() {
        let path = temp_dir().join("original.docx");
        std::fs::write(&path, b"original bytes").unwrap();
        let backup = backup_input(&path).unwrap();
        assert_eq!(backup.extension().unwrap(), "docx");
        assert!(backup.to_str().unwrap().ends_with(".bak.docx"));
        assert_eq!(std::fs::read(&backup).unwrap(), b"original bytes");
    }

    #[test]
    fn resolve_output_creates_parents() {
        let path = temp_dir().join("deep/nested/out.docx");
        let resolved = resolve_output(path.to_str().unwrap()).unwrap();
        assert!(resolved.parent().unwrap().exists());
    }
}
