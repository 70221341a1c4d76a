//! Archive layout: where each mockup goes inside an output bundle.
//!
//! [`ArchiveLayout::Flat`] puts every file at the top level.
//! [`ArchiveLayout::ByGraphic`] groups each graphic's mockups under a
//! directory named after the graphic. [`ArchiveLayout::ZipPerGraphic`]
//! packs each graphic's mockups into its own `{graphic}.zip`, so the
//! bundle becomes a zip of zips.

use teemock_pipeline::MockupResult;

use crate::ExportError;
use crate::png::encode_png;
use crate::bundle::zip_bytes;

/// How entries are arranged in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveLayout {
    /// `{file_name}`
    #[default]
    Flat,
    /// `{graphic_name}/{file_name}`
    ByGraphic,
    /// `{graphic_name}.zip`, holding that graphic's `{file_name}`s
    ZipPerGraphic,
}

/// One encoded file and its relative path inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/`-separated relative path. Every component is sanitized.
    pub path: String,
    /// Encoded PNG bytes.
    pub bytes: Vec<u8>,
}

/// Encode `results` and assign archive paths, preserving result order.
///
/// With [`ArchiveLayout::ZipPerGraphic`] the returned entries are the
/// per-graphic zips, in order of each graphic's first result.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if any image fails to encode, or
/// [`ExportError::Zip`] if a per-graphic zip cannot be written.
pub fn archive_entries(
    results: &[MockupResult],
    layout: ArchiveLayout,
) -> Result<Vec<ArchiveEntry>, ExportError> {
    let encoded = results.iter().map(|result| {
        let file = sanitize_component(&result.file_name);
        let graphic = sanitize_component(&result.graphic_name);
        Ok((graphic, file, encode_png(&result.image)?))
    });

    match layout {
        ArchiveLayout::Flat => encoded
            .map(|e| e.map(|(_, path, bytes)| ArchiveEntry { path, bytes }))
            .collect(),
        ArchiveLayout::ByGraphic => encoded
            .map(|e| {
                e.map(|(graphic, file, bytes)| ArchiveEntry {
                    path: format!("{graphic}/{file}"),
                    bytes,
                })
            })
            .collect(),
        ArchiveLayout::ZipPerGraphic => {
            let mut groups: Vec<(String, Vec<ArchiveEntry>)> = Vec::new();
            for item in encoded {
                let (graphic, path, bytes) = item?;
                let entry = ArchiveEntry { path, bytes };
                match groups.iter_mut().find(|(name, _)| *name == graphic) {
                    Some((_, members)) => members.push(entry),
                    None => groups.push((graphic, vec![entry])),
                }
            }
            groups
                .into_iter()
                .map(|(graphic, members)| {
                    Ok(ArchiveEntry {
                        path: format!("{graphic}.zip"),
                        bytes: zip_bytes(&members)?,
                    })
                })
                .collect()
        }
    }
}

/// Make `name` safe to use as a single path component.
///
/// Path separators, control characters and characters Windows rejects
/// become `_`. Surrounding whitespace is trimmed. Names that would be
/// empty or refer to a directory (`.`, `..`) become `_`.
#[must_use]
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Sum of all entry sizes in bytes.
#[must_use]
pub fn total_bytes(entries: &[ArchiveEntry]) -> u64 {
    entries.iter().map(|e| e.bytes.len() as u64).sum()
}
