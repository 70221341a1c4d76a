//! teemock-export: Pure packaging helpers (sans-IO)
//!
//! Turns rendered mockups into encoded files, archive entry paths and
//! zip bundles. Writing to disk is the caller's job.

pub mod archive;
pub mod bundle;
pub mod png;

pub use archive::{ArchiveEntry, ArchiveLayout, archive_entries, sanitize_component, total_bytes};
pub use bundle::{write_zip, zip_bytes};
pub use png::encode_png;

/// Errors from export serializers.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    /// The zip container could not be written.
    #[error("failed to write zip: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
