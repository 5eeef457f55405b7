// ZIP packaging for batch output

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PipelineError;

/// Builds a DEFLATE-compressed archive in memory.
///
/// Entry names are unique: a repeated name gets a ` (2)`, ` (3)`, ... suffix
/// before its extension.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    /// Add one entry; returns the name actually used
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<String, PipelineError> {
        let name = self.unique_name(name);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.writer.start_file(name.as_str(), options)?;
        self.writer
            .write_all(bytes)
            .map_err(|e| PipelineError::Archive(format!("{}: {}", name, e)))?;

        self.names.insert(name.clone());
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn finish(self) -> Result<Vec<u8>, PipelineError> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
            _ => (name, ""),
        };
        (2..)
            .map(|n| format!("{} ({}){}", stem, n, ext))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_archive_entries_and_content() {
        let mut builder = ArchiveBuilder::new();
        builder.add("a.xlsx", b"first").unwrap();
        builder.add("b.xlsx", b"second").unwrap();
        assert_eq!(builder.len(), 2);
        let bytes = builder.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_name("b.xlsx").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"second");
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let mut builder = ArchiveBuilder::new();
        assert_eq!(builder.add("data.xlsx", b"1").unwrap(), "data.xlsx");
        assert_eq!(builder.add("data.xlsx", b"2").unwrap(), "data (2).xlsx");
        assert_eq!(builder.add("data.xlsx", b"3").unwrap(), "data (3).xlsx");
        assert_eq!(builder.add("noext", b"4").unwrap(), "noext");
        assert_eq!(builder.add("noext", b"5").unwrap(), "noext (2)");

        let bytes = builder.finish().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 5);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = ArchiveBuilder::new().finish().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
