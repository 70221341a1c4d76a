//! Zip bundle writer.
//!
//! Entries are stored uncompressed: PNG data is already deflated, so a
//! second pass only costs time.

use std::io::{Cursor, Seek, Write};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::ExportError;
use crate::archive::ArchiveEntry;

/// Write `entries` as a zip archive into `writer`, in slice order.
///
/// Returns the writer once the central directory is written.
///
/// # Errors
///
/// Returns [`ExportError::Zip`] if the archive cannot be written (for
/// instance two entries share a path) or [`ExportError::Io`] if writing
/// an entry's bytes fails.
pub fn write_zip<W: Write + Seek>(entries: &[ArchiveEntry], writer: W) -> Result<W, ExportError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = zip::ZipWriter::new(writer);
    for entry in entries {
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.bytes)?;
    }
    Ok(zip.finish()?)
}

/// [`write_zip`] into memory.
///
/// # Errors
///
/// Same as [`write_zip`].
pub fn zip_bytes(entries: &[ArchiveEntry]) -> Result<Vec<u8>, ExportError> {
    Ok(write_zip(entries, Cursor::new(Vec::new()))?.into_inner())
}
