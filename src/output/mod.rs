//! Delivery of session outputs: archives and byte-range file serving

pub mod archive;
pub mod range;

pub use archive::ArchiveBuilder;
pub use range::{parse_range_header, ByteRange, FileResponse, RangeFileServer};
