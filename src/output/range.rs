//! Byte-range file serving for in-browser playback scrubbing

use std::io::{ErrorKind, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWrite, Take};
use tracing::debug;

use crate::domain::errors::DomainError;

/// An inclusive byte range already clamped to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered, both ends inclusive
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a single `bytes=` range against a file of `file_size` bytes.
///
/// Supports `a-b`, `a-` and the suffix form `-n`. An end past the last byte
/// is clamped. Everything else, including multiple ranges, yields `None` and
/// the caller serves the whole file.
pub fn parse_range_header(header: &str, file_size: u64) -> Option<ByteRange> {
    if file_size == 0 {
        return None;
    }

    let ranges = header.trim().strip_prefix("bytes=")?;
    if ranges.contains(',') {
        return None;
    }

    let (start, end) = ranges.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    let last = file_size - 1;

    match (start.is_empty(), end.is_empty()) {
        // bytes=-500 (last 500 bytes)
        (true, false) => {
            let suffix_len: u64 = end.parse().ok()?;
            if suffix_len == 0 {
                return None;
            }
            Some(ByteRange {
                start: file_size.saturating_sub(suffix_len),
                end: last,
            })
        }
        // bytes=500- (from 500 to end)
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            (start <= last).then_some(ByteRange { start, end: last })
        }
        // bytes=0-499
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            if start > last || start > end {
                return None;
            }
            Some(ByteRange {
                start,
                end: end.min(last),
            })
        }
        (true, true) => None,
    }
}

/// Content type derived from a file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Transport-neutral response: status, headers and a streamed body
#[derive(Debug)]
pub struct FileResponse {
    /// 200 for the whole file, 206 for a slice
    pub status: u16,
    pub content_length: u64,
    pub content_type: &'static str,
    /// `bytes start-end/total`, only on 206
    pub content_range: Option<String>,
    pub accept_ranges: &'static str,
    /// `attachment; filename="..."`, only on 200
    pub content_disposition: Option<String>,
    /// File positioned at the first byte to send, limited to `content_length`
    pub body: Take<File>,
}

impl FileResponse {
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }

    /// Stream the body into `writer`, returning the bytes written
    pub async fn copy_to<W>(self, writer: &mut W) -> Result<u64, DomainError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut body = self.body;
        tokio::io::copy(&mut body, writer)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to stream file: {}", e)))
    }

    /// Read the whole body into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>, DomainError> {
        let mut body = self.body;
        let mut buf = Vec::with_capacity(usize::try_from(self.content_length).unwrap_or(0));
        body.read_to_end(&mut buf)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to read file: {}", e)))?;
        Ok(buf)
    }
}

/// Serves stored files in full or as a single byte range
pub struct RangeFileServer;

impl RangeFileServer {
    /// Serve `path`, honoring `range` when it names a satisfiable single range
    pub async fn serve(path: &Path, range: Option<&str>) -> Result<FileResponse, DomainError> {
        let (mut file, size) = Self::open(path).await?;

        let Some(range) = range.and_then(|header| parse_range_header(header, size)) else {
            if let Some(header) = range {
                debug!(path = %path.display(), range = header, "Ignoring unusable range header");
            }
            return Ok(Self::full(path, file, size));
        };

        file.seek(SeekFrom::Start(range.start))
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to seek {}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            start = range.start,
            end = range.end,
            total = size,
            "Serving partial content"
        );

        Ok(FileResponse {
            status: 206,
            content_length: range.length(),
            content_type: content_type_for(path),
            content_range: Some(format!("bytes {}-{}/{}", range.start, range.end, size)),
            accept_ranges: "bytes",
            content_disposition: None,
            body: file.take(range.length()),
        })
    }

    /// Serve the whole file; range requests are not honored
    pub async fn serve_full(path: &Path) -> Result<FileResponse, DomainError> {
        let (file, size) = Self::open(path).await?;
        Ok(Self::full(path, file, size))
    }

    fn full(path: &Path, file: File, size: u64) -> FileResponse {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().replace('"', "_"))
            .unwrap_or_default();

        FileResponse {
            status: 200,
            content_length: size,
            content_type: content_type_for(path),
            content_range: None,
            accept_ranges: "bytes",
            content_disposition: Some(format!("attachment; filename=\"{}\"", name)),
            body: file.take(size),
        }
    }

    async fn open(path: &Path) -> Result<(File, u64), DomainError> {
        let not_found = || DomainError::NotFound(format!("File not found: {}", path.display()));

        let file = File::open(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => DomainError::Storage(format!("Failed to open {}: {}", path.display(), e)),
        })?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to inspect {}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok((file, metadata.len()))
    }
}
