//! Service object owning the index lifecycle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::{IndexError, Result};
use crate::export::{self, SingleFile};
use crate::index::{BuildReport, DocumentIndexer, IndexTable};
use crate::models::config::NfindConfig;
use crate::models::document::RawDocument;
use crate::search::{SearchEngine, SearchHit};

/// Holds the per-batch index and answers queries against it.
///
/// Replaces ambient session state with an explicit object: create with
/// [`SearchService::new`], pass by reference to search/export calls,
/// [`SearchService::clear`] or drop to tear down. Rebuild and query are
/// mutually exclusive; search and export are read-only and safe to run
/// concurrently with each other.
pub struct SearchService {
    indexer: DocumentIndexer,
    engine: SearchEngine,
    table: RwLock<Option<IndexTable>>,
    cancel: AtomicBool,
}

impl SearchService {
    /// Create a service with no index built yet.
    pub fn new(config: NfindConfig) -> Self {
        Self {
            indexer: DocumentIndexer::new(&config),
            engine: SearchEngine::new(config.search.clone()),
            table: RwLock::new(None),
            cancel: AtomicBool::new(false),
        }
    }

    /// Discard any existing table and recompute it from the batch.
    ///
    /// The write lock is held for the whole build. When every document of
    /// a non-empty batch fails, the table still becomes a valid empty
    /// table (searches degrade to "no results") and the distinct
    /// [`IndexError::NoDocumentsIndexed`] is returned. A cancelled
    /// rebuild keeps the previous table.
    pub fn rebuild<P>(&self, documents: &[RawDocument], progress: P) -> Result<BuildReport>
    where
        P: FnMut(usize, usize, &str),
    {
        self.cancel.store(false, Ordering::Relaxed);

        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        let (built, report) =
            self.indexer
                .build(documents, progress, || self.cancel.load(Ordering::Relaxed))?;

        info!("index rebuilt: {}/{} documents", report.indexed, report.total);
        *table = Some(built);

        if report.is_total_failure() {
            return Err(IndexError::NoDocumentsIndexed {
                total: report.total,
            }
            .into());
        }

        Ok(report)
    }

    /// Request cancellation of an in-progress rebuild.
    ///
    /// Checked cooperatively between documents, never mid-document.
    pub fn cancel_rebuild(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Match a term against the current index, in index order.
    ///
    /// Querying before any build is [`IndexError::NotBuilt`], directing a
    /// rebuild rather than returning a silently empty result.
    pub fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        let table = table.as_ref().ok_or(IndexError::NotBuilt)?;
        Ok(self.engine.search(term, table))
    }

    /// Whether an index (possibly empty) is currently held.
    pub fn is_built(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Tear down the index; subsequent searches require a rebuild.
    pub fn clear(&self) {
        *self.table.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Bundle matched originals into a ZIP archive.
    pub fn export_archive(&self, matched: &[String], documents: &[RawDocument]) -> Result<Vec<u8>> {
        Ok(export::build_archive(matched, documents)?)
    }

    /// Re-expose one document for individual retrieval.
    pub fn export_single<'a>(&self, document: &'a RawDocument) -> SingleFile<'a> {
        export::single_file(document)
    }
}
