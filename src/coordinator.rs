//! Index coordinator: snapshot ownership and publication
//!
//! One coordinator owns the published snapshot for one indexed root.
//! Rebuilds are serialized: a rebuild arriving while another is in flight
//! is rejected with [`ScanError::RebuildInProgress`] rather than queued.
//! Publication swaps a single `Arc` reference, so a reader observes either
//! the entirely-old or entirely-new snapshot, never a partially-built one.
//! Queries already holding a reference to the superseded snapshot finish
//! against it unaffected.

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock, TryLockError};
use std::time::Instant;

use crate::error::ScanError;
use crate::indexer::{Snapshot, SnapshotBuilder};
use crate::models::{RebuildReport, ScanConfig};

pub struct Coordinator {
    builder: SnapshotBuilder,
    published: RwLock<Option<Arc<Snapshot>>>,
    // Held for the duration of a rebuild; try-locked so concurrent
    // rebuild requests fail fast instead of queueing.
    rebuild_guard: Mutex<()>,
}

impl Coordinator {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            builder: SnapshotBuilder::new(config),
            published: RwLock::new(None),
            rebuild_guard: Mutex::new(()),
        }
    }

    /// Scan `root`, build a fresh snapshot, and publish it.
    ///
    /// On failure the previously published snapshot (if any) remains
    /// current: a failed rescan never leaves the system unindexed if it
    /// was indexed before.
    pub fn rebuild(&self, root: &Path) -> Result<RebuildReport, ScanError> {
        self.rebuild_with_progress(root, false)
    }

    pub fn rebuild_with_progress(
        &self,
        root: &Path,
        show_progress: bool,
    ) -> Result<RebuildReport, ScanError> {
        let _guard = match self.rebuild_guard.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(ScanError::RebuildInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let started = Instant::now();
        let snapshot = self.builder.build(root, show_progress)?;
        let report = RebuildReport {
            file_count: snapshot.file_count,
            document_count: snapshot.documents.len(),
            node_count: snapshot.nodes.len(),
            edge_count: snapshot.edges.len(),
            skipped_files: snapshot.skipped_files,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        let mut published = self
            .published
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *published = Some(Arc::new(snapshot));
        log::info!("Published snapshot: {} files", report.file_count);

        Ok(report)
    }

    /// Current published snapshot, or `NotIndexed` before the first
    /// successful rebuild. Readers clone the `Arc` and never block
    /// rebuilds.
    pub fn current(&self) -> Result<Arc<Snapshot>, ScanError> {
        self.published
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(ScanError::NotIndexed)
    }
}
