//! Pack an unpacked part directory back into a .docx container.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Recursively zip every file under `dir` into `output`, using
/// forward-slash part names relative to `dir`.
pub fn pack_directory(dir: &Path, output: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("不是目录: {}", dir.display());
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output)
        .with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = ZipWriter::new(file);
    add_dir(&mut writer, dir, dir)?;
    writer.finish()?;
    Ok(())
}

fn add_dir(writer: &mut ZipWriter<File>, base: &Path, dir: &Path) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    // Deterministic part order regardless of directory enumeration.
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_dir(writer, base, &path)?;
        } else {
            let rel = path
                .strip_prefix(base)
                .expect("entry is under the base directory");
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(name, options)?;
            writer.write_all(&std::fs::read(&path)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::Package;

    #[test]
    fn packed_directory_round_trips() {
        let dir = std::env::temp_dir().join("paperpress_pack_test");
        let src = dir.join("unpacked");
        std::fs::create_dir_all(src.join("word")).unwrap();
        std::fs::write(src.join("[Content_Types].xml"), b"<Types/>").unwrap();
        std::fs::write(src.join("word/document.xml"), b"<w:document/>").unwrap();

        let output = dir.join("packed.docx");
        pack_directory(&src, &output).unwrap();

        let pkg = Package::read(&output).unwrap();
        assert_eq!(pkg.part_data("[Content_Types].xml").unwrap(), b"<Types/>");
        assert_eq!(pkg.part_data("word/document.xml").unwrap(), b"<w:document/>");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn non_directory_input_is_rejected() {
        let dir = std::env::temp_dir().join("paperpress_pack_test2");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(pack_directory(&file, &dir.join("out.docx")).is_err());
    }
}
