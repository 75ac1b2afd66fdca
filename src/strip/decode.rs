//! Async decode pipeline: off-thread decode + scale of static slides.
//!
//! Requests go to the [`Workers`] pool tagged with the current epoch; results
//! come back over a single-consumer channel that the presentation loop drains
//! once per frame. Only the raw RGBA buffer crosses the thread boundary;
//! textures are built by the presentation side.
//!
//! There is no cancellation. A request whose slot left the window still
//! runs, and the window manager discards its result on arrival. A layout
//! rebuild bumps the epoch so that queued jobs from the old layout are
//! skipped before decoding and late results are recognisable as stale.

use crossbeam_channel::{Receiver, Sender, unbounded};
use image::RgbaImage;
use log::{debug, trace};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::Workers;
use crate::entities::{LoadError, MediaBackend, Size};

/// One decode job: scale `path` to exactly `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest {
    pub index: usize,
    pub path: PathBuf,
    pub target: Size,
}

/// Outcome of a [`DecodeRequest`], tagged with the epoch it was submitted under.
#[derive(Debug)]
pub struct DecodeResult {
    pub index: usize,
    pub epoch: u64,
    pub bitmap: Result<RgbaImage, LoadError>,
}

impl DecodeResult {
    pub fn success(&self) -> bool {
        self.bitmap.is_ok()
    }
}

/// Submission/completion seam used by the window manager and the engine.
///
/// Implemented by [`DecodePipeline`]; tests drive completions by hand.
pub trait DecodeQueue {
    /// Queue a request under the current epoch. Never blocks.
    fn submit(&self, request: DecodeRequest);

    /// Take every result that has arrived since the last call.
    fn drain(&self) -> Vec<DecodeResult>;

    /// Start a new epoch and return it. Jobs of older epochs become stale.
    fn bump_epoch(&self) -> u64;

    fn current_epoch(&self) -> u64;
}

/// Worker-pool backed [`DecodeQueue`].
pub struct DecodePipeline {
    workers: Workers,
    epoch: Arc<AtomicU64>,
    backend: Arc<dyn MediaBackend>,
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
}

impl std::fmt::Debug for DecodePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodePipeline")
            .field("workers", &self.workers)
            .field("pending_results", &self.rx.len())
            .finish()
    }
}

impl DecodePipeline {
    pub fn new(backend: Arc<dyn MediaBackend>, threads: usize) -> Self {
        let epoch = Arc::new(AtomicU64::new(0));
        let workers = Workers::new(threads, Arc::clone(&epoch));
        let (tx, rx) = unbounded();
        debug!("Decode pipeline: {} threads", workers.len());
        Self {
            workers,
            epoch,
            backend,
            tx,
            rx,
        }
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl DecodeQueue for DecodePipeline {
    fn submit(&self, request: DecodeRequest) {
        let epoch = self.current_epoch();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        trace!(
            "Decode submit #{} {} -> {}x{} (epoch {})",
            request.index,
            request.path.display(),
            request.target.width,
            request.target.height,
            epoch
        );
        self.workers.execute_with_epoch(epoch, move || {
            let bitmap = backend.decode_scaled(&request.path, request.target);
            if let Err(e) = &bitmap {
                debug!("Decode failed #{} {}: {}", request.index, request.path.display(), e);
            }
            // Receiver gone means the engine was dropped; nothing to report to.
            let _ = tx.send(DecodeResult {
                index: request.index,
                epoch,
                bitmap,
            });
        });
    }

    fn drain(&self) -> Vec<DecodeResult> {
        self.rx.try_iter().collect()
    }

    fn bump_epoch(&self) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Decode epoch -> {}", epoch);
        epoch
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}
