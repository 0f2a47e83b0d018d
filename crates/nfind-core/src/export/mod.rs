//! Result packaging: ZIP archives of matched originals and single-file
//! retrieval.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;
use crate::models::document::RawDocument;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// A single document exposed for individual retrieval.
#[derive(Debug, Clone, Copy)]
pub struct SingleFile<'a> {
    /// Original bytes, verbatim.
    pub bytes: &'a [u8],

    /// Content-type hint derived from the declared kind.
    pub content_type: &'static str,
}

/// Bundle the matched originals into an in-memory deflate ZIP archive.
///
/// Entry names are the matched identities; bytes are copied verbatim and
/// the inputs are never mutated. A matched identity that is not present
/// in `documents` is a hard error rather than a silent omission.
pub fn build_archive(matched: &[String], documents: &[RawDocument]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for identity in matched {
        let document = documents
            .iter()
            .find(|d| &d.identity == identity)
            .ok_or_else(|| ExportError::DocumentMissing(identity.clone()))?;

        writer.start_file(identity.as_str(), options)?;
        writer.write_all(&document.bytes)?;
    }

    let cursor = writer.finish()?;
    debug!(
        "archived {} documents ({} bytes)",
        matched.len(),
        cursor.get_ref().len()
    );
    Ok(cursor.into_inner())
}

/// Re-expose one document's bytes for individual retrieval.
pub fn single_file(document: &RawDocument) -> SingleFile<'_> {
    SingleFile {
        bytes: &document.bytes,
        content_type: document.kind.content_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn batch() -> Vec<RawDocument> {
        vec![
            RawDocument::new("a.pdf", b"%PDF-1.4 fake".to_vec()),
            RawDocument::new("c.xml", b"<NFe/>".to_vec()),
        ]
    }

    #[test]
    fn archive_holds_matched_originals_verbatim() {
        let documents = batch();
        let matched = vec!["a.pdf".to_string(), "c.xml".to_string()];

        let buffer = build_archive(&matched, &documents).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();

        assert_eq!(archive.len(), 2);

        let mut bytes = Vec::new();
        archive.by_name("a.pdf").unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, b"%PDF-1.4 fake");

        bytes.clear();
        archive.by_name("c.xml").unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, b"<NFe/>");
    }

    #[test]
    fn archive_with_subset_match_has_exactly_that_entry() {
        let documents = batch();
        let matched = vec!["c.xml".to_string()];

        let buffer = build_archive(&matched, &documents).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["c.xml"]);
    }

    #[test]
    fn missing_identity_is_a_hard_error() {
        let documents = batch();
        let matched = vec!["ghost.pdf".to_string()];

        let result = build_archive(&matched, &documents);
        assert!(matches!(result, Err(ExportError::DocumentMissing(id)) if id == "ghost.pdf"));
    }

    #[test]
    fn empty_match_set_yields_an_empty_archive() {
        let buffer = build_archive(&[], &batch()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn single_file_carries_a_content_type_hint() {
        let documents = batch();

        let pdf = single_file(&documents[0]);
        assert_eq!(pdf.content_type, "application/pdf");
        assert_eq!(pdf.bytes, b"%PDF-1.4 fake");

        let xml = single_file(&documents[1]);
        assert_eq!(xml.content_type, "application/xml");
    }
}
