//! Batch prefetch policy and the background fetcher.
//!
//! The policy keeps the batch ahead of the level cursor so activating the next
//! level never waits on the network. The [`Fetcher`] runs supplier calls on a
//! tokio runtime and hands results back, tagged with the session epoch that
//! requested them.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::error::SupplierError;
use crate::supplier::{FetchRequest, WordSupplier, fallback_hint};
use crate::word::WordEntry;
use crate::{debug_log, info_log};

/// Entries requested per fetch.
pub const BATCH_SIZE: usize = 10;
/// Remaining words below which the next batch is requested.
pub const LOOKAHEAD: usize = 3;
/// Maximum number of words sent as the exclusion list.
pub const MAX_EXCLUDED_WORDS: usize = 100;

/// Whether a fetch should be triggered at `level` with `batch_len` words loaded.
pub fn should_fetch(level: usize, batch_len: usize) -> bool {
    (level == 1 && batch_len == 0) || level + LOOKAHEAD >= batch_len
}

/// Builds the exclusion list: session words first, then the used-words log.
///
/// Case-insensitive duplicates are dropped and the list is capped at
/// [`MAX_EXCLUDED_WORDS`].
pub fn build_exclusions<'a>(
    session_words: impl IntoIterator<Item = &'a str>,
    used_words: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    session_words
        .into_iter()
        .chain(used_words)
        .map(|w| w.trim().to_uppercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .take(MAX_EXCLUDED_WORDS)
        .collect()
}

/// Result of one supplier call, tagged with the epoch that requested it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub epoch: u64,
    pub result: Result<Vec<WordEntry>, SupplierError>,
}

/// Runs supplier calls off the game loop.
pub struct Fetcher {
    runtime: Runtime,
    supplier: Arc<dyn WordSupplier>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    pending: usize,
}

impl Fetcher {
    pub fn new(supplier: Arc<dyn WordSupplier>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("word-fetch")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            supplier,
            tx,
            rx,
            pending: 0,
        })
    }

    /// Number of requests whose outcome has not been collected yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Starts a supplier call in the background.
    pub fn spawn(&mut self, epoch: u64, request: FetchRequest) {
        info_log!(
            "Spawning fetch for epoch {} ({} excluded words)",
            epoch,
            request.exclude_words.len()
        );
        let supplier = Arc::clone(&self.supplier);
        let call = self
            .runtime
            .spawn(async move { supplier.fetch(&request).await });

        // A panicking supplier still reports back instead of leaving the loop waiting.
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = match call.await {
                Ok(result) => result,
                Err(e) => Err(SupplierError::Aborted(e.to_string())),
            };
            let _ = tx.send(FetchOutcome { epoch, result });
        });
        self.pending += 1;
    }

    /// Returns a finished outcome without blocking.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }

    /// Blocks until the next outcome arrives; `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<FetchOutcome> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.runtime.block_on(self.rx.recv())?;
        self.pending -= 1;
        debug_log!("Fetch outcome for epoch {} collected", outcome.epoch);
        Some(outcome)
    }

    /// Asks the supplier for a fresh tricky hint, falling back to a generic one.
    pub fn tricky_hint(&self, entry: &WordEntry) -> String {
        match self.runtime.block_on(self.supplier.tricky_hint(entry)) {
            Ok(hint) => hint,
            Err(e) => {
                log::warn!("Tricky hint failed, using fallback: {e}");
                fallback_hint(entry)
            }
        }
    }
}
