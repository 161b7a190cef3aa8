//! Session archive builder
//!
//! Bundles every file under a session's output directory into one zip
//! archive, flattened to bare file names.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::domain::errors::DomainError;

/// Deflate level used for session archives
pub const MAX_COMPRESSION_LEVEL: i32 = 9;

/// Builds flattened zip archives from output directories
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    compression_level: i32,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            compression_level: MAX_COMPRESSION_LEVEL,
        }
    }

    /// Archive `source_dir` into `destination`, returning the entry count.
    ///
    /// The archive is written to a temporary file beside `destination` and
    /// renamed over it only once the stream is finished and flushed, so a
    /// previous archive stays intact if this one fails.
    pub async fn build(&self, source_dir: &Path, destination: &Path) -> Result<usize, DomainError> {
        let source = source_dir.to_path_buf();
        let destination = destination.to_path_buf();
        let level = self.compression_level;

        tokio::task::spawn_blocking(move || write_archive(&source, &destination, level))
            .await
            .map_err(|e| DomainError::Archive(format!("Archive task failed: {}", e)))?
    }
}

/// Regular files under `source_dir`, keyed by flattened name
fn collect_entries(source_dir: &Path) -> Result<BTreeMap<String, PathBuf>, DomainError> {
    if !source_dir.is_dir() {
        return Err(DomainError::Archive(format!(
            "Output directory does not exist: {}",
            source_dir.display()
        )));
    }

    let mut entries = BTreeMap::new();
    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = entry
            .map_err(|e| DomainError::Archive(format!("Failed to walk output directory: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if entries.contains_key(&name) {
            warn!(
                name = %name,
                path = %entry.path().display(),
                "Duplicate file name in output directory, keeping the first"
            );
            continue;
        }
        entries.insert(name, entry.into_path());
    }

    Ok(entries)
}

fn write_archive(source_dir: &Path, destination: &Path, level: i32) -> Result<usize, DomainError> {
    let entries = collect_entries(source_dir)?;

    let archive_dir = destination
        .parent()
        .ok_or_else(|| DomainError::Archive("Archive path has no parent directory".to_string()))?;
    std::fs::create_dir_all(archive_dir)
        .map_err(|e| DomainError::Archive(format!("Failed to create archive directory: {}", e)))?;

    let mut temp = tempfile::NamedTempFile::new_in(archive_dir)
        .map_err(|e| DomainError::Archive(format!("Failed to create temporary archive: {}", e)))?;

    {
        let mut zip = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level))
            .unix_permissions(0o644);

        for (name, path) in &entries {
            let mut file = File::open(path)
                .map_err(|e| DomainError::Archive(format!("Failed to open {}: {}", path.display(), e)))?;
            let size = file.metadata().map(|m| m.len()).unwrap_or(0);

            zip.start_file(name.as_str(), options.large_file(size >= u32::MAX as u64))
                .map_err(|e| DomainError::Archive(format!("Failed to add {} to archive: {}", name, e)))?;
            std::io::copy(&mut file, &mut zip)
                .map_err(|e| DomainError::Archive(format!("Failed to write {} to archive: {}", name, e)))?;
            debug!(entry = %name, bytes = size, "Added archive entry");
        }

        let mut writer = zip
            .finish()
            .map_err(|e| DomainError::Archive(format!("Failed to finalize archive: {}", e)))?;
        writer
            .flush()
            .map_err(|e| DomainError::Archive(format!("Failed to flush archive: {}", e)))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| DomainError::Archive(format!("Failed to sync archive: {}", e)))?;
    temp.persist(destination)
        .map_err(|e| DomainError::Archive(format!("Failed to store archive: {}", e.error)))?;

    info!(
        archive = %destination.display(),
        entries = entries.len(),
        "Archive created"
    );
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_archive(path: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            contents.insert(entry.name().to_string(), data);
        }
        contents
    }

    #[tokio::test]
    async fn test_round_trip_has_no_directory_prefix() {
        let temp = TempDir::new().unwrap();
        let outputs = temp.path().join("outputs").join("session");
        std::fs::create_dir_all(&outputs).unwrap();
        std::fs::write(outputs.join("x.mp4"), b"first video bytes").unwrap();
        std::fs::write(outputs.join("y.mp4"), vec![7u8; 64 * 1024]).unwrap();

        let destination = temp.path().join("archives").join("out.zip");
        let entries = ArchiveBuilder::new().build(&outputs, &destination).await.unwrap();
        assert_eq!(entries, 2);

        let contents = read_archive(&destination);
        assert_eq!(
            contents.keys().cloned().collect::<Vec<_>>(),
            vec!["x.mp4".to_string(), "y.mp4".to_string()]
        );
        assert_eq!(contents["x.mp4"], b"first video bytes");
        assert_eq!(contents["y.mp4"], vec![7u8; 64 * 1024]);
    }

    #[tokio::test]
    async fn test_nested_files_are_flattened() {
        let temp = TempDir::new().unwrap();
        let outputs = temp.path().join("outputs");
        std::fs::create_dir_all(outputs.join("nested")).unwrap();
        std::fs::write(outputs.join("nested").join("z.mp4"), b"z").unwrap();

        let destination = temp.path().join("out.zip");
        ArchiveBuilder::new().build(&outputs, &destination).await.unwrap();

        let contents = read_archive(&destination);
        assert_eq!(contents.len(), 1);
        assert!(contents.contains_key("z.mp4"));
    }

    #[tokio::test]
    async fn test_rebuild_overwrites_previous_archive() {
        let temp = TempDir::new().unwrap();
        let outputs = temp.path().join("outputs");
        std::fs::create_dir_all(&outputs).unwrap();
        std::fs::write(outputs.join("a.mp4"), b"a").unwrap();
        let destination = temp.path().join("out.zip");

        let builder = ArchiveBuilder::new();
        builder.build(&outputs, &destination).await.unwrap();
        std::fs::write(outputs.join("b.mp4"), b"b").unwrap();
        assert_eq!(builder.build(&outputs, &destination).await.unwrap(), 2);
        assert_eq!(read_archive(&destination).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_directory_gives_empty_archive() {
        let temp = TempDir::new().unwrap();
        let outputs = temp.path().join("outputs");
        std::fs::create_dir_all(&outputs).unwrap();
        let destination = temp.path().join("out.zip");

        assert_eq!(ArchiveBuilder::new().build(&outputs, &destination).await.unwrap(), 0);
        assert!(read_archive(&destination).is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = ArchiveBuilder::new()
            .build(&temp.path().join("absent"), &temp.path().join("out.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Archive(_)));
        assert!(!temp.path().join("out.zip").exists());
    }
}
