//! Footnote properties patch, applied at the container level.
//!
//! The document model has no surface for footnote numbering behavior, so
//! this module rewrites `word/settings.xml` inside the saved package
//! directly: restart numbering on each page, circled-decimal number
//! glyphs (①②③). Every other part streams through raw — original bytes,
//! order and compression untouched. The patch reads from a temporary copy
//! of the archive and writes the final path, so the original is only
//! replaced once the new archive is fully constructed.
//!
//! Precondition: the package was produced by a document-model writer and
//! therefore has a settings part. A package without one is rejected, not
//! repaired.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::docx::{PART_FOOTNOTES, PART_SETTINGS};

/// Ensure `w:footnotePr` in the settings part carries
/// `numRestart="eachPage"` and `numFmt="decimalEnclosedCircle"`.
pub fn set_footnote_restart_each_page(path: &Path) -> Result<()> {
    let tmp = path.with_extension("tmp.docx");
    fs::copy(path, &tmp)
        .with_context(|| format!("cannot stage a working copy of {}", path.display()))?;

    let result = rewrite_from_copy(&tmp, path);
    let _ = fs::remove_file(&tmp);
    result
}

fn rewrite_from_copy(src: &Path, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(File::open(src)?)?;
    if !archive.file_names().any(|n| n == PART_SETTINGS) {
        bail!("package has no {} part", PART_SETTINGS);
    }

    let mut writer = ZipWriter::new(File::create(dest)?);
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.name() == PART_SETTINGS {
            let compression = entry.compression();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            let patched = patch_settings_xml(&data)?;
            writer.start_file(
                PART_SETTINGS,
                FileOptions::default().compression_method(compression),
            )?;
            writer.write_all(&patched)?;
        } else {
            // Raw copy: compressed bytes pass through untouched.
            writer.raw_copy_file(entry)?;
        }
    }
    writer.finish()?;
    Ok(())
}

fn write_footnote_props<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    let mut fmt = BytesStart::new("w:numFmt");
    fmt.push_attribute(("w:val", "decimalEnclosedCircle"));
    writer.write_event(Event::Empty(fmt))?;
    let mut restart = BytesStart::new("w:numRestart");
    restart.push_attribute(("w:val", "eachPage"));
    writer.write_event(Event::Empty(restart))?;
    Ok(())
}

fn patch_settings_xml(xml: &[u8]) -> Result<Vec<u8>> {
    // First pass: does a footnotePr element exist at all?
    let mut has_footnote_pr = false;
    {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:footnotePr" => {
                    has_footnote_pr = true;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    // Second pass: stream events through, replacing any existing
    // numRestart/numFmt children and appending footnotePr when absent.
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut in_footnote_pr = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:footnotePr" => {
                writer.write_event(Event::Start(e))?;
                write_footnote_props(&mut writer)?;
                in_footnote_pr = true;
            }
            Event::Empty(e) if e.name().as_ref() == b"w:footnotePr" => {
                writer.write_event(Event::Start(e))?;
                write_footnote_props(&mut writer)?;
                writer.write_event(Event::End(BytesEnd::new("w:footnotePr")))?;
            }
            Event::Empty(e)
                if in_footnote_pr
                    && matches!(e.name().as_ref(), b"w:numRestart" | b"w:numFmt") => {}
            Event::Start(e)
                if in_footnote_pr
                    && matches!(e.name().as_ref(), b"w:numRestart" | b"w:numFmt") =>
            {
                reader.read_to_end_into(e.name(), &mut skip_buf)?;
                skip_buf.clear();
            }
            Event::End(e) if e.name().as_ref() == b"w:footnotePr" => {
                in_footnote_pr = false;
                writer.write_event(Event::End(e))?;
            }
            Event::End(e) if e.name().as_ref() == b"w:settings" => {
                if !has_footnote_pr {
                    writer.write_event(Event::Start(BytesStart::new("w:footnotePr")))?;
                    write_footnote_props(&mut writer)?;
                    writer.write_event(Event::End(BytesEnd::new("w:footnotePr")))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

fn settings_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    if !archive.file_names().any(|n| n == PART_SETTINGS) {
        return Ok(None);
    }
    let mut entry = archive.by_name(PART_SETTINGS)?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Read-only query used by the validator: is the restart-per-page patch in
/// place?
pub fn has_footnote_restart_each_page(path: &Path) -> Result<bool> {
    let Some(data) = settings_bytes(path)? else {
        return Ok(false);
    };

    let mut reader = Reader::from_reader(&data[..]);
    let mut buf = Vec::new();
    let mut in_footnote_pr = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"w:footnotePr" => in_footnote_pr = true,
            Event::End(e) if e.name().as_ref() == b"w:footnotePr" => in_footnote_pr = false,
            Event::Start(e) | Event::Empty(e)
                if in_footnote_pr && e.name().as_ref() == b"w:numRestart" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"w:val" {
                        if let Ok(v) = attr.unescape_value() {
                            return Ok(v == "eachPage");
                        }
                    }
                }
                return Ok(false);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(false)
}

/// Does the package carry a footnotes part at all?
pub fn has_footnotes_part(path: &Path) -> Result<bool> {
    let archive = ZipArchive::new(File::open(path)?)?;
    let has_part = archive.file_names().any(|n| n == PART_FOOTNOTES);
    Ok(has_part)
}
