//! Batch index construction over raw documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IndexError;
use crate::models::config::NfindConfig;
use crate::models::document::{DocumentKind, ExtractedRecord, RawDocument};
use crate::nfe;
use crate::pdf::PdfTextExtractor;

/// The per-batch table of extracted records.
///
/// Rows keep input order, one per successfully extracted document, with
/// unique identities. A rebuild replaces the table wholesale; it is never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    records: Vec<ExtractedRecord>,
}

impl IndexTable {
    /// The records, in input order.
    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<ExtractedRecord>) -> Self {
        Self { records }
    }
}

/// Why a document produced no index record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Extraction succeeded but produced no text.
    EmptyText,
    /// A document with the same identity was already indexed.
    DuplicateIdentity,
    /// Extraction failed.
    Failed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyText => write!(f, "no text extracted"),
            SkipReason::DuplicateIdentity => write!(f, "duplicate identity"),
            SkipReason::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// A document that was skipped during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub identity: String,
    pub reason: SkipReason,
}

/// Summary of one index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Number of documents in the input batch.
    pub total: usize,

    /// Number of records produced.
    pub indexed: usize,

    /// Documents that produced no record, with reasons.
    pub skipped: Vec<SkippedDocument>,
}

impl BuildReport {
    /// A non-empty batch that produced zero records is a whole-batch
    /// failure, distinct from partial success with some skips.
    pub fn is_total_failure(&self) -> bool {
        self.total > 0 && self.indexed == 0
    }
}

/// Builds index tables from raw document batches.
pub struct DocumentIndexer {
    pdf: PdfTextExtractor,
}

impl DocumentIndexer {
    /// Create an indexer from the pipeline configuration.
    pub fn new(config: &NfindConfig) -> Self {
        Self {
            pdf: PdfTextExtractor::new(config.ocr.clone()),
        }
    }

    /// Build a table from a batch of raw documents.
    ///
    /// Every per-document outcome is explicit: success with text, an
    /// empty-text skip, or a failure with its reason. Failures become
    /// report entries, never a batch abort.
    ///
    /// `progress` is invoked once per document with
    /// `(completed, total, identity)`. `cancelled` is polled between
    /// documents; once it reports true the build stops with
    /// [`IndexError::Cancelled`] and no table is produced.
    pub fn build<P, C>(
        &self,
        documents: &[RawDocument],
        mut progress: P,
        cancelled: C,
    ) -> std::result::Result<(IndexTable, BuildReport), IndexError>
    where
        P: FnMut(usize, usize, &str),
        C: Fn() -> bool,
    {
        let total = documents.len();
        let mut records: Vec<ExtractedRecord> = Vec::with_capacity(total);
        let mut seen: HashSet<&str> = HashSet::with_capacity(total);
        let mut skipped = Vec::new();

        for (i, document) in documents.iter().enumerate() {
            if cancelled() {
                return Err(IndexError::Cancelled);
            }

            progress(i + 1, total, &document.identity);

            if !seen.insert(document.identity.as_str()) {
                warn!("duplicate identity skipped: {}", document.identity);
                skipped.push(SkippedDocument {
                    identity: document.identity.clone(),
                    reason: SkipReason::DuplicateIdentity,
                });
                continue;
            }

            match self.extract(document) {
                Ok(text) if !text.trim().is_empty() => {
                    records.push(ExtractedRecord {
                        identity: document.identity.clone(),
                        kind: document.kind,
                        text,
                    });
                }
                Ok(_) => {
                    warn!("no text extracted from {}", document.identity);
                    skipped.push(SkippedDocument {
                        identity: document.identity.clone(),
                        reason: SkipReason::EmptyText,
                    });
                }
                Err(e) => {
                    warn!("failed to process {}: {}", document.identity, e);
                    skipped.push(SkippedDocument {
                        identity: document.identity.clone(),
                        reason: SkipReason::Failed(e.to_string()),
                    });
                }
            }
        }

        let report = BuildReport {
            total,
            indexed: records.len(),
            skipped,
        };
        debug!("indexed {}/{} documents", report.indexed, report.total);

        Ok((IndexTable { records }, report))
    }

    /// Extract one document's text, dispatching on its declared kind.
    fn extract(&self, document: &RawDocument) -> crate::error::Result<String> {
        match document.kind {
            DocumentKind::Pdf => Ok(self.pdf.extract(&document.bytes)?),
            DocumentKind::Xml => Ok(nfe::extract_text(&document.bytes)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nfe_doc(identity: &str, product: &str) -> RawDocument {
        let xml = format!(
            r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe">
                <infNFe versao="4.00">
                  <emit><CNPJ>12345678000195</CNPJ><xNome>Fornecedor</xNome></emit>
                  <det nItem="1"><prod><xProd>{}</xProd></prod></det>
                </infNFe>
            </NFe>"#,
            product
        );
        RawDocument::new(identity, xml.into_bytes())
    }

    fn never_cancelled() -> impl Fn() -> bool {
        || false
    }

    #[test]
    fn indexes_extractable_documents_in_input_order() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![nfe_doc("b.xml", "Fechadura"), nfe_doc("a.xml", "Parafuso")];

        let (table, report) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.indexed, 2);
        assert!(report.skipped.is_empty());
        let identities: Vec<&str> = table.records().iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(identities, vec!["b.xml", "a.xml"]);
    }

    #[test]
    fn one_corrupt_document_never_aborts_the_batch() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![
            RawDocument::new("broken.pdf", b"not a pdf".to_vec()),
            nfe_doc("ok.xml", "Parafuso"),
        ];

        let (table, report) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.indexed, 1);
        assert_eq!(table.records()[0].identity, "ok.xml");
        assert!(matches!(report.skipped[0].reason, SkipReason::Failed(_)));
    }

    #[test]
    fn empty_extraction_is_excluded_from_the_table() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        // Well-formed XML in a foreign namespace extracts to nothing.
        let docs = vec![
            RawDocument::new("foreign.xml", b"<x xmlns=\"urn:other\"><y>v</y></x>".to_vec()),
            nfe_doc("ok.xml", "Parafuso"),
        ];

        let (table, report) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(
            report.skipped,
            vec![SkippedDocument {
                identity: "foreign.xml".to_string(),
                reason: SkipReason::EmptyText,
            }]
        );
    }

    #[test]
    fn record_count_matches_nonempty_extractions() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![
            nfe_doc("a.xml", "Parafuso"),
            RawDocument::new("broken.xml", b"<NFe><emit></dest></NFe>".to_vec()),
            nfe_doc("c.xml", "Fechadura"),
        ];

        let (table, report) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert!(table.len() <= docs.len());
        assert_eq!(table.len(), report.indexed);
        assert_eq!(report.indexed + report.skipped.len(), report.total);
    }

    #[test]
    fn duplicate_identity_is_skipped() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![nfe_doc("a.xml", "Parafuso"), nfe_doc("a.xml", "Fechadura")];

        let (table, report) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::DuplicateIdentity);
    }

    #[test]
    fn progress_fires_once_per_document() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![nfe_doc("a.xml", "Parafuso"), nfe_doc("b.xml", "Fechadura")];

        let mut calls = Vec::new();
        indexer
            .build(
                &docs,
                |completed, total, identity| calls.push((completed, total, identity.to_string())),
                never_cancelled(),
            )
            .unwrap();

        assert_eq!(
            calls,
            vec![(1, 2, "a.xml".to_string()), (2, 2, "b.xml".to_string())]
        );
    }

    #[test]
    fn rebuilds_are_deterministic() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![nfe_doc("a.xml", "Parafuso"), nfe_doc("b.xml", "Café")];

        let (first, _) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();
        let (second, _) = indexer.build(&docs, |_, _, _| {}, never_cancelled()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn cancellation_stops_the_build() {
        let indexer = DocumentIndexer::new(&NfindConfig::default());
        let docs = vec![nfe_doc("a.xml", "Parafuso")];

        let result = indexer.build(&docs, |_, _, _| {}, || true);
        assert!(matches!(result, Err(IndexError::Cancelled)));
    }

    #[test]
    fn total_failure_is_distinct_from_partial_success() {
        let empty = BuildReport {
            total: 3,
            indexed: 0,
            skipped: Vec::new(),
        };
        assert!(empty.is_total_failure());

        let partial = BuildReport {
            total: 3,
            indexed: 1,
            skipped: Vec::new(),
        };
        assert!(!partial.is_total_failure());

        let empty_batch = BuildReport {
            total: 0,
            indexed: 0,
            skipped: Vec::new(),
        };
        assert!(!empty_batch.is_total_failure());
    }
}
