//! The OOXML container: a zip archive of path-addressed XML parts.
//!
//! `Package` reads every part into memory in archive order, remembers each
//! part's compression method, and writes the whole set back out. Untouched
//! parts round-trip with their original content and compression; callers
//! replace parts by name.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("missing required part: {0}")]
    MissingPart(String),
    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },
}

impl PackageError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        PackageError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
}

#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all parts of an archive, preserving their order.
    pub fn read(path: &Path) -> Result<Self, PackageError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let compression = entry.compression();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push(Part {
                name,
                data,
                compression,
            });
        }

        Ok(Self { parts })
    }

    /// Write a new archive containing every part, in order.
    pub fn write(&self, path: &Path) -> Result<(), PackageError> {
        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);

        for part in &self.parts {
            let options = FileOptions::default().compression_method(part.compression);
            writer.start_file(&part.name, options)?;
            writer.write_all(&part.data)?;
        }

        writer.finish()?;
        Ok(())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn part_data(&self, name: &str) -> Result<&[u8], PackageError> {
        self.part(name)
            .map(|p| p.data.as_slice())
            .ok_or_else(|| PackageError::MissingPart(name.to_string()))
    }

    /// Replace a part's bytes by name, appending a new deflated part if the
    /// name is not present yet.
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    pub fn add_part(&mut self, name: &str, data: Vec<u8>) {
        self.replace_part(name, data);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }
}
